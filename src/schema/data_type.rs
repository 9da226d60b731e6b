//! Data type conversion from declared member types to index data categories.
//!
//! This module provides the mapping that turns a declared type name (e.g. "i32",
//! "String", "Uuid") into the `DataTypeCode` that decides which index storage a
//! member's values land in and which value column predicates compare against.

use crate::error::{StructuraError, StructuraResult};
use serde::{Deserialize, Serialize};

/// Data category of an indexable member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataTypeCode {
    Integer,
    UnsignedInteger,
    Fractal,
    Boolean,
    DateTime,
    Guid,
    /// Short strings, indexed for equality and prefix matching
    String,
    /// Unbounded strings, see [`DataTypeConverter::with_text_suffixes`]
    Text,
    /// Enum values, stored by name alongside strings
    Enum,
}

impl DataTypeCode {
    /// Categories whose values may reference another structure's id
    pub fn can_reference_structure(self) -> bool {
        matches!(
            self,
            DataTypeCode::Integer
                | DataTypeCode::UnsignedInteger
                | DataTypeCode::Guid
                | DataTypeCode::String
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataTypeCode::Integer => "Integer",
            DataTypeCode::UnsignedInteger => "UnsignedInteger",
            DataTypeCode::Fractal => "Fractal",
            DataTypeCode::Boolean => "Boolean",
            DataTypeCode::DateTime => "DateTime",
            DataTypeCode::Guid => "Guid",
            DataTypeCode::String => "String",
            DataTypeCode::Text => "Text",
            DataTypeCode::Enum => "Enum",
        }
    }
}

impl std::fmt::Display for DataTypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default member name suffixes that turn a string member into a text member
pub const DEFAULT_TEXT_SUFFIXES: &[&str] = &["Text", "Content", "Description"];

/// Converts declared member types into [`DataTypeCode`]s
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTypeConverter {
    text_suffixes: Vec<String>,
}

impl Default for DataTypeConverter {
    fn default() -> Self {
        Self::with_text_suffixes(DEFAULT_TEXT_SUFFIXES.iter().copied())
    }
}

impl DataTypeConverter {
    /// Create a converter that treats string members ending with any of `suffixes` as text
    pub fn with_text_suffixes<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text_suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn text_suffixes(&self) -> &[String] {
        &self.text_suffixes
    }

    /// Map a scalar type name to its data category
    ///
    /// # Type Mapping
    ///
    /// - "i8" / "i16" / "i32" / "i64" / "isize" / "int" / "long" → Integer
    /// - "u8" / "u16" / "u32" / "u64" / "usize" → UnsignedInteger
    /// - "f32" / "f64" / "Decimal" / "double" → Fractal
    /// - "bool" / "boolean" → Boolean
    /// - "NaiveDateTime" / "DateTime" / "NaiveDate" / "timestamp" → DateTime
    /// - "Uuid" / "guid" → Guid
    /// - "String" / "str" / "char" → String, or Text when `member_name` ends
    ///   with one of the configured text suffixes
    ///
    /// # Errors
    ///
    /// Returns `StructuraError::SchemaConfig` for any other type name.
    pub fn convert(&self, type_name: &str, member_name: &str) -> StructuraResult<DataTypeCode> {
        let lower = type_name.to_lowercase();
        let code = match lower.as_str() {
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "int" | "integer" | "long" => {
                DataTypeCode::Integer
            }
            "u8" | "u16" | "u32" | "u64" | "u128" | "usize" => DataTypeCode::UnsignedInteger,
            "f32" | "f64" | "decimal" | "double" | "float" | "numeric" => DataTypeCode::Fractal,
            "bool" | "boolean" => DataTypeCode::Boolean,
            "naivedatetime" | "datetime" | "naivedate" | "date" | "timestamp" => {
                DataTypeCode::DateTime
            }
            "uuid" | "guid" => DataTypeCode::Guid,
            "string" | "str" | "char" | "text" => {
                if self.is_text_member(member_name) {
                    DataTypeCode::Text
                } else {
                    DataTypeCode::String
                }
            }
            _ => {
                return Err(StructuraError::SchemaConfig(format!(
                    "member '{member_name}' has type '{type_name}' which has no index data category"
                )))
            }
        };
        Ok(code)
    }

    fn is_text_member(&self, member_name: &str) -> bool {
        self.text_suffixes
            .iter()
            .any(|suffix| !suffix.is_empty() && member_name.ends_with(suffix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_family() {
        let converter = DataTypeConverter::default();
        for name in ["i8", "i16", "i32", "i64", "isize"] {
            assert_eq!(converter.convert(name, "Int1").unwrap(), DataTypeCode::Integer);
        }
        assert_eq!(
            converter.convert("u64", "Count").unwrap(),
            DataTypeCode::UnsignedInteger
        );
    }

    #[test]
    fn test_case_insensitive_names() {
        let converter = DataTypeConverter::default();
        assert_eq!(converter.convert("Uuid", "Id").unwrap(), DataTypeCode::Guid);
        assert_eq!(converter.convert("UUID", "Id").unwrap(), DataTypeCode::Guid);
        assert_eq!(
            converter.convert("NaiveDateTime", "CreatedAt").unwrap(),
            DataTypeCode::DateTime
        );
        assert_eq!(converter.convert("Decimal", "Price").unwrap(), DataTypeCode::Fractal);
    }

    #[test]
    fn test_text_suffixes() {
        let converter = DataTypeConverter::default();
        assert_eq!(converter.convert("String", "Name").unwrap(), DataTypeCode::String);
        assert_eq!(converter.convert("String", "BodyText").unwrap(), DataTypeCode::Text);
        assert_eq!(
            converter.convert("String", "Description").unwrap(),
            DataTypeCode::Text
        );

        let custom = DataTypeConverter::with_text_suffixes(["Body"]);
        assert_eq!(custom.convert("String", "MailBody").unwrap(), DataTypeCode::Text);
        assert_eq!(custom.convert("String", "Description").unwrap(), DataTypeCode::String);
    }

    #[test]
    fn test_text_suffix_ignored_for_non_strings() {
        let converter = DataTypeConverter::default();
        assert_eq!(converter.convert("i32", "ContentText").unwrap(), DataTypeCode::Integer);
    }

    #[test]
    fn test_unknown_type_is_config_error() {
        let converter = DataTypeConverter::default();
        let err = converter.convert("Vec3", "Position").unwrap_err();
        assert!(matches!(err, StructuraError::SchemaConfig(_)));
    }
}
