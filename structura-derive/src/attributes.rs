//! Attribute parsing utilities

use syn::{Attribute, ExprLit, Field, Lit};

/// String value of a `#[name = "value"]` attribute
fn name_value_str(attr: &Attribute) -> syn::Result<String> {
    let meta = attr.meta.require_name_value()?;
    if let syn::Expr::Lit(ExprLit {
        lit: Lit::Str(s), ..
    }) = &meta.value
    {
        Ok(s.value())
    } else {
        Err(syn::Error::new_spanned(
            &meta.value,
            "expected a string literal",
        ))
    }
}

/// Extract structure name from struct attributes
pub fn extract_structure_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    for attr in attrs {
        if attr.path().is_ident("structure_name") {
            return name_value_str(attr).map(Some);
        }
    }
    Ok(None)
}

/// Uniqueness requested on a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unique {
    PerType,
    PerQuery,
}

/// All member attributes of a field
#[derive(Debug, Default)]
pub struct MemberAttributes {
    pub is_structure_id: bool,
    pub member_name: Option<String>,
    pub unique: Option<Unique>,
    pub is_enumeration: bool,
    pub is_skipped: bool,
}

/// Parse all member attributes from a field
pub fn parse_member_attributes(field: &Field) -> syn::Result<MemberAttributes> {
    let mut attrs = MemberAttributes::default();

    for attr in &field.attrs {
        if attr.path().is_ident("structure_id") {
            attr.meta.require_path_only()?;
            attrs.is_structure_id = true;
        } else if attr.path().is_ident("member_name") {
            attrs.member_name = Some(name_value_str(attr)?);
        } else if attr.path().is_ident("unique") {
            attrs.unique = Some(match &attr.meta {
                syn::Meta::Path(_) => Unique::PerType,
                _ => match name_value_str(attr)?.as_str() {
                    "per_type" => Unique::PerType,
                    "per_query" => Unique::PerQuery,
                    other => {
                        return Err(syn::Error::new_spanned(
                            attr,
                            format!("unknown unique mode `{other}`, expected `per_type` or `per_query`"),
                        ))
                    }
                },
            });
        } else if attr.path().is_ident("enumeration") {
            attr.meta.require_path_only()?;
            attrs.is_enumeration = true;
        } else if attr.path().is_ident("skip") {
            attr.meta.require_path_only()?;
            attrs.is_skipped = true;
        }
    }

    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn field(tokens: syn::FieldsNamed) -> Field {
        tokens.named.into_iter().next().unwrap()
    }

    #[test]
    fn test_unique_modes() {
        let f = field(parse_quote!({ #[unique] code: String }));
        assert_eq!(parse_member_attributes(&f).unwrap().unique, Some(Unique::PerType));

        let f = field(parse_quote!({ #[unique = "per_query"] code: String }));
        assert_eq!(parse_member_attributes(&f).unwrap().unique, Some(Unique::PerQuery));

        let f = field(parse_quote!({ #[unique = "sometimes"] code: String }));
        assert!(parse_member_attributes(&f).is_err());
    }

    #[test]
    fn test_member_name_and_flags() {
        let f = field(parse_quote!({
            #[member_name = "Code"]
            #[enumeration]
            kind: Kind
        }));
        let attrs = parse_member_attributes(&f).unwrap();
        assert_eq!(attrs.member_name.as_deref(), Some("Code"));
        assert!(attrs.is_enumeration);
        assert!(!attrs.is_skipped);
        assert!(!attrs.is_structure_id);
    }

    #[test]
    fn test_structure_name() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[structure_name = "Person"])];
        assert_eq!(extract_structure_name(&attrs).unwrap().as_deref(), Some("Person"));
        assert_eq!(extract_structure_name(&[]).unwrap(), None);
    }
}
