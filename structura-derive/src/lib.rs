//! Procedural macros for structura
//!
//! This crate provides the `Structure` derive, which describes a struct's member
//! graph to the structure schema builder.

mod attributes;
mod macros;
mod type_conversion;
mod utils;

use proc_macro::TokenStream;

/// Derive macro for `Structure` - implements `structura::StructureType`
///
/// Every named field becomes a member; the member name is the field name in
/// PascalCase unless overridden.
///
/// Struct attributes:
/// - `#[structure_name = "Name"]` - structure name (defaults to the struct name)
///
/// Field attributes:
/// - `#[structure_id]` - the member holding the structure id (not listed as a member)
/// - `#[member_name = "Name"]` - explicit member name
/// - `#[unique]` / `#[unique = "per_query"]` - uniqueness per type / per query
/// - `#[enumeration]` - the field is an enum stored by variant name
/// - `#[skip]` - not described at all
///
/// Fields of types the macro does not recognize are described as nested structures
/// and must implement `StructureType` themselves.
///
/// # Example
///
/// ```ignore
/// use structura::Structure;
///
/// #[derive(Structure)]
/// struct Customer {
///     #[structure_id]
///     id: uuid::Uuid,
///     name: String,
///     #[unique]
///     customer_no: i32,
///     tags: Vec<String>,
///     delivery_address: Option<Address>,
/// }
/// ```
#[proc_macro_derive(
    Structure,
    attributes(structure_name, structure_id, member_name, unique, enumeration, skip)
)]
pub fn derive_structure(input: TokenStream) -> TokenStream {
    macros::derive_structure(input)
}
