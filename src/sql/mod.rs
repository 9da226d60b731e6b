//! SQL generation: dialect templates and the Db Query Generator.

pub mod dialect;
pub mod generator;
pub mod sql_query;

#[doc(inline)]
pub use dialect::{Dialect, DialectTemplates, PagingStyle, ParamStyle, TakeStyle};
#[doc(inline)]
pub use generator::DbQueryGenerator;
#[doc(inline)]
pub use sql_query::{SqlParameter, SqlQuery};
