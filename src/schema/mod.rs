//! Structure schemas: which members of a type are indexed, and how.
//!
//! # Architecture
//!
//! - **Data Type**: declared type name → index data category (`DataTypeConverter`)
//! - **Description**: declarative member graph of a type (`StructureType`)
//! - **Type Config**: whitelist/blacklist and nested inclusion per type
//! - **Builder**: description + config → immutable `StructureSchema`
//! - **Cache**: memoized schemas with explicit invalidation

pub mod builder;
pub mod cache;
pub mod data_type;
pub mod description;
pub mod structure_schema;
pub mod type_config;

#[doc(inline)]
pub use builder::{StructureSchemaBuilder, DEFAULT_MAX_NESTING_DEPTH};
#[doc(inline)]
pub use cache::StructureSchemas;
#[doc(inline)]
pub use data_type::{DataTypeCode, DataTypeConverter, DEFAULT_TEXT_SUFFIXES};
#[doc(inline)]
pub use description::{
    DeclaredType, MemberDescription, NestedMembers, StructureDescription, StructureType,
};
#[doc(inline)]
pub use structure_schema::{IndexableMember, StructureSchema, UniqueConstraint, UniqueMode};
#[doc(inline)]
pub use type_config::{StructureTypeConfig, StructureTypeConfigurations};
