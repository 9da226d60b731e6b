//! Structure derive macro implementation
//!
//! Generates `impl structura::StructureType` listing every named field as a member.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DataStruct, DeriveInput, Fields};

use crate::attributes::{self, Unique};
use crate::type_conversion;
use crate::utils;

pub fn derive_structure(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let structure_name = attributes::extract_structure_name(&input.attrs)?
        .unwrap_or_else(|| utils::unraw(struct_name));

    let fields = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Structure can only be derived for structs with named fields",
            ))
        }
    };

    let mut id_member = None;
    let mut members = Vec::new();

    for field in fields {
        let attrs = attributes::parse_member_attributes(field)?;
        if attrs.is_skipped {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let member_name = attrs
            .member_name
            .clone()
            .unwrap_or_else(|| utils::pascal_case(&utils::unraw(ident)));

        if attrs.is_structure_id {
            if id_member.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field can be marked #[structure_id]",
                ));
            }
            if attrs.unique.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "#[structure_id] is unique by definition; remove #[unique]",
                ));
            }
            let declared = type_conversion::declared_type(&field.ty, attrs.is_enumeration)?;
            id_member = Some(quote! { .with_id_member(#member_name, #declared) });
            continue;
        }

        let declared = type_conversion::declared_type(&field.ty, attrs.is_enumeration)?;
        let unique = match attrs.unique {
            Some(Unique::PerType) => quote! { .unique(::structura::UniqueMode::PerType) },
            Some(Unique::PerQuery) => quote! { .unique(::structura::UniqueMode::PerQuery) },
            None => quote! {},
        };
        members.push(quote! {
            .member(::structura::MemberDescription::new(#member_name, #declared) #unique)
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::structura::StructureType for #struct_name #ty_generics #where_clause {
            fn describe() -> ::structura::StructureDescription {
                ::structura::StructureDescription::new(#structure_name)
                    #id_member
                    #(#members)*
            }

            fn structure_name() -> ::std::string::String {
                ::std::string::String::from(#structure_name)
            }
        }
    })
}
