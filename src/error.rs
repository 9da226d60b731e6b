//! Error types for schema building, expression parsing and SQL generation.
//!
//! Every variant is raised synchronously before any statement reaches a database.
//! They describe a mismatch between the caller, the configuration and the schema,
//! so none of them is worth retrying.

use std::fmt;

/// `structura` error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuraError {
    /// Invalid structure type configuration or member graph
    ///
    /// Raised for whitelist paths that do not exist, two members normalizing to the
    /// same path, member names that are not identifiers, unknown declared types and
    /// nesting deeper than the configured limit.
    SchemaConfig(String),
    /// A query referenced a member path that is not indexed for the structure
    UnknownMemberPath { structure: String, path: String },
    /// An expression construct has no compiled mapping
    UnsupportedExpression(String),
    /// A criteria or string operator has no template mapping for the target dialect
    UnsupportedOperator { dialect: String, operator: String },
    /// Page/Skip requested without any sort order
    PagingRequiresSort { structure: String },
    /// A dialect has no backend for the requested feature
    UnsupportedDialect { dialect: String, feature: String },
}

impl fmt::Display for StructuraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuraError::SchemaConfig(msg) => {
                write!(f, "Schema configuration error: {msg}")
            }
            StructuraError::UnknownMemberPath { structure, path } => {
                write!(
                    f,
                    "Unknown member path '{path}' for structure '{structure}': \
                     the member is not part of the indexed schema"
                )
            }
            StructuraError::UnsupportedExpression(msg) => {
                write!(f, "Unsupported expression: {msg}")
            }
            StructuraError::UnsupportedOperator { dialect, operator } => {
                write!(f, "Operator '{operator}' is not supported by dialect {dialect}")
            }
            StructuraError::PagingRequiresSort { structure } => {
                write!(
                    f,
                    "Paging a query over '{structure}' requires at least one sort member"
                )
            }
            StructuraError::UnsupportedDialect { dialect, feature } => {
                write!(f, "Dialect {dialect} does not support {feature}")
            }
        }
    }
}

impl std::error::Error for StructuraError {}

/// Result alias used across the crate
pub type StructuraResult<T> = Result<T, StructuraError>;

impl StructuraError {
    pub(crate) fn unknown_member(structure: &str, path: &str) -> Self {
        StructuraError::UnknownMemberPath {
            structure: structure.to_string(),
            path: path.to_string(),
        }
    }

    pub(crate) fn unsupported<S: Into<String>>(msg: S) -> Self {
        StructuraError::UnsupportedExpression(msg.into())
    }
}
