//! Query layer: expression DSL, parsers and the parsed query command.
//!
//! # Architecture
//!
//! - **Expr**: host-side predicate/sort/include expressions (`member("Int1").gte(40)`)
//! - **Where parser**: expression → normalized `Criteria`
//! - **Sorting parser**: sort expressions → ordered `SortItem`s
//! - **Include parser**: include expressions → `IncludeSpec`s
//! - **Command**: the parsed query handed to the SQL generator
//! - **Builder**: fluent `QueryBuilder` tying the parsers together

pub mod builder;
pub mod command;
pub mod criteria;
pub mod expr;
pub mod include_parser;
pub mod sorting_parser;
pub mod where_parser;

#[doc(inline)]
pub use builder::QueryBuilder;
#[doc(inline)]
pub use command::{
    Cardinality, IncludeSpec, Paging, QueryCommand, RowLimit, SortDirection, SortItem,
};
#[doc(inline)]
pub use criteria::{
    CaseFunction, ComparisonOp, Criteria, LogicalOp, NullCheckKind, StringOperator,
};
#[doc(inline)]
pub use expr::{captured, list, member, null, val, BinaryOp, Expr, IntoExpr, Method};
#[doc(inline)]
pub use include_parser::{IncludeExpr, IncludeParser};
#[doc(inline)]
pub use sorting_parser::{SortExpr, SortingParser};
#[doc(inline)]
pub use where_parser::WhereParser;
