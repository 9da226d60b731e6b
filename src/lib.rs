//! # Structura
//!
//! Document persistence core: structures are stored as serialized JSON next to
//! typed index storage, one row per indexed member value. This crate decides which
//! members of a type are indexed and compiles typed predicates into parameterized
//! SQL over that index storage.
//!
//! ```text
//! StructureDescription ──► StructureSchemaBuilder ──► StructureSchema
//!                                                         │
//! QueryBuilder (Expr) ──► Where/Sorting/Include parsers ──┴─► QueryCommand
//!                                                                 │
//!                                   DbQueryGenerator (Dialect) ◄──┘──► SqlQuery
//! ```
//!
//! Executing the SQL, serializing documents and writing index rows belong to the
//! caller; everything here is pure computation.

pub mod config;
pub mod error;
pub mod query;
pub mod schema;
pub mod sql;
pub mod storage;
pub mod value;

pub use config::StructuraConfig;
pub use error::{StructuraError, StructuraResult};
pub use query::{member, val, Expr, QueryBuilder, QueryCommand};
pub use schema::{
    DataTypeCode, DataTypeConverter, DeclaredType, IndexableMember, MemberDescription,
    StructureDescription, StructureSchema, StructureSchemaBuilder, StructureSchemas,
    StructureType, StructureTypeConfig, UniqueMode,
};
pub use sql::{DbQueryGenerator, Dialect, SqlQuery};
pub use storage::IndexStorageLayout;
pub use value::QueryValue;

/// `#[derive(Structure)]` implements [`StructureType`] from a struct's fields
pub use structura_derive::Structure;
