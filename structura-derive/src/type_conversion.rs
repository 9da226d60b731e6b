//! Declared type generation
//!
//! Maps a field's Rust type onto the `structura::DeclaredType` expression the
//! generated `describe()` builds:
//!
//! - `Option<T>` → `DeclaredType::nullable(T)`
//! - `Vec<T>`, `VecDeque<T>`, `HashSet<T>`, `BTreeSet<T>`, `[T; N]`, `&[T]` → `DeclaredType::collection(T)`
//! - `HashMap<K, V>`, `BTreeMap<K, V>` → `DeclaredType::dictionary(V)`
//! - `Box<T>`, `Arc<T>`, `Rc<T>`, `&T` → `T`
//! - known scalars (integers, floats, `bool`, `char`, `String`, `str`, `Uuid`,
//!   chrono date types, `Decimal`) → `DeclaredType::scalar("<ident>")`
//! - anything else → `DeclaredType::structure::<T>()`, or `DeclaredType::Enum` when
//!   the field carries `#[enumeration]`

use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, PathArguments, Type, TypePath};

const SCALARS: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
    "f32", "f64", "bool", "char", "String", "str", "Uuid", "NaiveDateTime", "NaiveDate",
    "DateTime", "Decimal",
];

const COLLECTIONS: &[&str] = &["Vec", "VecDeque", "HashSet", "BTreeSet", "LinkedList"];
const DICTIONARIES: &[&str] = &["HashMap", "BTreeMap"];
const POINTERS: &[&str] = &["Box", "Arc", "Rc"];

/// Generic type arguments of the last path segment
fn type_arguments(type_path: &TypePath) -> Vec<&Type> {
    type_path
        .path
        .segments
        .last()
        .map(|segment| match &segment.arguments {
            PathArguments::AngleBracketed(args) => args
                .args
                .iter()
                .filter_map(|arg| match arg {
                    GenericArgument::Type(ty) => Some(ty),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
        .unwrap_or_default()
}

/// Name of a known scalar type, if `ty` is one
pub fn scalar_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => {
            let segment = type_path.path.segments.last()?;
            let name = segment.ident.to_string();
            SCALARS.contains(&name.as_str()).then_some(name)
        }
        Type::Reference(reference) => scalar_name(&reference.elem),
        Type::Group(group) => scalar_name(&group.elem),
        Type::Paren(paren) => scalar_name(&paren.elem),
        _ => None,
    }
}

/// Generate the `DeclaredType` expression for `ty`
pub fn declared_type(ty: &Type, enumeration: bool) -> syn::Result<TokenStream> {
    match ty {
        Type::Reference(reference) => declared_type(&reference.elem, enumeration),
        Type::Group(group) => declared_type(&group.elem, enumeration),
        Type::Paren(paren) => declared_type(&paren.elem, enumeration),
        Type::Array(array) => {
            let element = declared_type(&array.elem, enumeration)?;
            Ok(quote! { ::structura::DeclaredType::collection(#element) })
        }
        Type::Slice(slice) => {
            let element = declared_type(&slice.elem, enumeration)?;
            Ok(quote! { ::structura::DeclaredType::collection(#element) })
        }
        Type::Path(type_path) if type_path.qself.is_none() => {
            let Some(segment) = type_path.path.segments.last() else {
                return Err(syn::Error::new_spanned(ty, "empty type path"));
            };
            let ident = segment.ident.to_string();
            let args = type_arguments(type_path);

            if ident == "Option" && args.len() == 1 {
                let inner = declared_type(args[0], enumeration)?;
                return Ok(quote! { ::structura::DeclaredType::nullable(#inner) });
            }
            if COLLECTIONS.contains(&ident.as_str()) && args.len() == 1 {
                let element = declared_type(args[0], enumeration)?;
                return Ok(quote! { ::structura::DeclaredType::collection(#element) });
            }
            if DICTIONARIES.contains(&ident.as_str()) && args.len() >= 2 {
                let value = declared_type(args[1], enumeration)?;
                return Ok(quote! { ::structura::DeclaredType::dictionary(#value) });
            }
            if POINTERS.contains(&ident.as_str()) && args.len() == 1 {
                return declared_type(args[0], enumeration);
            }
            if let Some(name) = scalar_name(ty) {
                return Ok(quote! { ::structura::DeclaredType::scalar(#name) });
            }
            if enumeration {
                return Ok(quote! { ::structura::DeclaredType::Enum });
            }
            Ok(quote! { ::structura::DeclaredType::structure::<#ty>() })
        }
        _ => Err(syn::Error::new_spanned(
            ty,
            "unsupported member type; mark the field #[skip] to leave it out",
        )),
    }
}
