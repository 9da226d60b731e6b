//! Utility functions for code generation

/// Convert string to PascalCase
pub fn pascal_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize = true;
    for c in s.chars() {
        if c == '_' {
            capitalize = true;
        } else if capitalize {
            result.extend(c.to_uppercase());
            capitalize = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// Field identifier as written, without a raw identifier prefix
pub fn unraw(ident: &syn::Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("customer_no"), "CustomerNo");
        assert_eq!(pascal_case("name"), "Name");
        assert_eq!(pascal_case("_hidden_value"), "HiddenValue");
        assert_eq!(pascal_case("int1"), "Int1");
        assert_eq!(pascal_case("AlreadyPascal"), "AlreadyPascal");
    }

    #[test]
    fn test_unraw() {
        let ident: syn::Ident = syn::parse_str("r#type").unwrap();
        assert_eq!(unraw(&ident), "type");
    }
}
