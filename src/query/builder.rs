//! Fluent query builder.
//!
//! `QueryBuilder` collects the caller's expressions unparsed; [`QueryBuilder::build`]
//! runs the where, sorting and include parsers against a schema and produces a
//! [`QueryCommand`].
//!
//! # Example
//!
//! ```
//! use structura::query::{member, QueryBuilder};
//! use structura::{DeclaredType, MemberDescription, StructureDescription, StructureSchemaBuilder};
//!
//! let description = StructureDescription::new("Doc")
//!     .member(MemberDescription::new("Int1", DeclaredType::scalar("i32")))
//!     .member(MemberDescription::new("String1", DeclaredType::scalar("String")));
//! let schema = StructureSchemaBuilder::default().build(&description, None)?;
//!
//! let command = QueryBuilder::new()
//!     .filter(member("Int1").gte(40))
//!     .filter(member("Int1").lte(42))
//!     .order_by_asc(member("Int1"))
//!     .order_by_desc(member("String1"))
//!     .page(1, 7)
//!     .build(&schema)?;
//!
//! assert_eq!(command.sorting().len(), 2);
//! # Ok::<(), structura::StructuraError>(())
//! ```

use super::command::{Cardinality, Paging, QueryCommand, SortDirection};
use super::expr::Expr;
use super::include_parser::{IncludeExpr, IncludeParser};
use super::sorting_parser::{SortExpr, SortingParser};
use super::where_parser::WhereParser;
use crate::error::StructuraResult;
use crate::schema::StructureSchema;

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    filters: Vec<Expr>,
    sorts: Vec<SortExpr>,
    paging: Paging,
    includes: Vec<IncludeExpr>,
    cardinality: Cardinality,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter; repeated filters are AND-ed in call order
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn order_by(mut self, member: Expr, direction: SortDirection) -> Self {
        self.sorts.push(SortExpr { member, direction });
        self
    }

    pub fn order_by_asc(self, member: Expr) -> Self {
        self.order_by(member, SortDirection::Asc)
    }

    pub fn order_by_desc(self, member: Expr) -> Self {
        self.order_by(member, SortDirection::Desc)
    }

    /// Limit the number of rows; combines with a previous `skip`
    pub fn take(mut self, n: u64) -> Self {
        self.paging = match self.paging {
            Paging::SkipTake { skip, .. } => Paging::SkipTake {
                skip,
                take: Some(n),
            },
            _ => Paging::Take(n),
        };
        self
    }

    /// Skip rows; requires a sort order when built into SQL
    pub fn skip(mut self, n: u64) -> Self {
        self.paging = match self.paging {
            Paging::Take(take) => Paging::SkipTake {
                skip: n,
                take: Some(take),
            },
            Paging::SkipTake { take, .. } => Paging::SkipTake { skip: n, take },
            _ => Paging::SkipTake {
                skip: n,
                take: None,
            },
        };
        self
    }

    /// Zero-based page of `size` rows; requires a sort order when built into SQL
    pub fn page(mut self, index: u64, size: u64) -> Self {
        self.paging = Paging::Page { index, size };
        self
    }

    /// First matching row; rows skipped earlier stay skipped
    pub fn first(mut self) -> Self {
        self.paging = self.limit_to(1, Paging::First);
        self.cardinality = Cardinality::First;
        self
    }

    /// Up to two rows so the caller can tell "exactly one" from "more than one"
    pub fn single(mut self) -> Self {
        self.paging = self.limit_to(2, Paging::Single);
        self.cardinality = Cardinality::Single;
        self
    }

    fn limit_to(&self, take: u64, unskipped: Paging) -> Paging {
        let skip = match self.paging {
            Paging::SkipTake { skip, .. } => skip,
            Paging::Page { index, size } => index.saturating_mul(size),
            _ => 0,
        };
        if skip == 0 {
            unskipped
        } else {
            Paging::SkipTake {
                skip,
                take: Some(take),
            }
        }
    }

    pub fn count(mut self) -> Self {
        self.cardinality = Cardinality::Count;
        self
    }

    pub fn any(mut self) -> Self {
        self.cardinality = Cardinality::Any;
        self
    }

    /// Load `included_structure` by the id held in `owner`
    pub fn include(mut self, included_structure: &str, owner: Expr, target_path: &str) -> Self {
        self.includes.push(IncludeExpr {
            included_structure: included_structure.to_string(),
            owner,
            target_path: target_path.to_string(),
        });
        self
    }

    /// Parse everything against `schema`
    pub fn build(&self, schema: &StructureSchema) -> StructuraResult<QueryCommand> {
        let predicate = self
            .filters
            .iter()
            .cloned()
            .reduce(|combined, next| combined.and(next));
        let criteria = predicate
            .map(|p| WhereParser::new(schema).parse(&p))
            .transpose()?;
        let sorting = SortingParser::new(schema).parse(&self.sorts)?;
        let includes = IncludeParser::new(schema).parse(&self.includes)?;

        Ok(QueryCommand::new(
            criteria,
            sorting,
            self.paging,
            includes,
            self.cardinality,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::criteria::{ComparisonOp, Criteria};
    use crate::query::expr::member;
    use crate::schema::{DeclaredType, MemberDescription, StructureDescription, StructureSchemaBuilder};
    use crate::value::QueryValue;

    fn schema() -> StructureSchema {
        let description = StructureDescription::new("Doc")
            .member(MemberDescription::new("Int1", DeclaredType::scalar("i32")))
            .member(MemberDescription::new("String1", DeclaredType::scalar("String")));
        StructureSchemaBuilder::default()
            .build(&description, None)
            .unwrap()
    }

    #[test]
    fn test_repeated_filters_are_anded() {
        let schema = schema();
        let chained = QueryBuilder::new()
            .filter(member("Int1").gte(40))
            .filter(member("Int1").lte(42))
            .build(&schema)
            .unwrap();
        let single = QueryBuilder::new()
            .filter(member("Int1").gte(40).and(member("Int1").lte(42)))
            .build(&schema)
            .unwrap();
        assert_eq!(chained.criteria(), single.criteria());
    }

    #[test]
    fn test_no_filter_has_no_criteria() {
        let command = QueryBuilder::new().build(&schema()).unwrap();
        assert!(!command.has_criteria());
        assert_eq!(command.cardinality(), Cardinality::Enumerate);
        assert_eq!(command.paging(), Paging::None);
    }

    #[test]
    fn test_skip_then_take_merge() {
        let command = QueryBuilder::new().skip(10).take(5).build(&schema()).unwrap();
        assert_eq!(
            command.paging(),
            Paging::SkipTake {
                skip: 10,
                take: Some(5)
            }
        );
        let command = QueryBuilder::new().take(5).skip(10).build(&schema()).unwrap();
        assert_eq!(
            command.paging(),
            Paging::SkipTake {
                skip: 10,
                take: Some(5)
            }
        );
    }

    #[test]
    fn test_single_sets_cardinality_and_paging() {
        let command = QueryBuilder::new()
            .filter(member("Int1").eq(1))
            .single()
            .build(&schema())
            .unwrap();
        assert_eq!(command.cardinality(), Cardinality::Single);
        assert_eq!(command.paging(), Paging::Single);
        assert_eq!(
            command.criteria(),
            Some(&Criteria::Comparison {
                path: "Int1".to_string(),
                op: ComparisonOp::Eq,
                value: QueryValue::from(1),
                case: None,
            })
        );
    }

    #[test]
    fn test_first_and_single_keep_earlier_skip() {
        let schema = schema();
        let first = QueryBuilder::new()
            .order_by_asc(member("Int1"))
            .skip(3)
            .first()
            .build(&schema)
            .unwrap();
        assert_eq!(first.cardinality(), Cardinality::First);
        assert_eq!(
            first.paging(),
            Paging::SkipTake {
                skip: 3,
                take: Some(1)
            }
        );

        let single = QueryBuilder::new()
            .order_by_asc(member("Int1"))
            .page(2, 10)
            .single()
            .build(&schema)
            .unwrap();
        assert_eq!(single.cardinality(), Cardinality::Single);
        assert_eq!(
            single.paging(),
            Paging::SkipTake {
                skip: 20,
                take: Some(2)
            }
        );

        let plain = QueryBuilder::new().take(5).first().build(&schema).unwrap();
        assert_eq!(plain.paging(), Paging::First);
    }
}
