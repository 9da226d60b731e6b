//! Sorting parser: sort expressions → ordered sort items.

use super::command::{SortDirection, SortItem};
use super::expr::Expr;
use crate::error::{StructuraError, StructuraResult};
use crate::schema::StructureSchema;

/// A sort key as written by the caller
#[derive(Debug, Clone)]
pub struct SortExpr {
    pub member: Expr,
    pub direction: SortDirection,
}

impl SortExpr {
    pub fn asc(member: Expr) -> Self {
        Self {
            member,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(member: Expr) -> Self {
        Self {
            member,
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SortingParser<'a> {
    schema: &'a StructureSchema,
}

impl<'a> SortingParser<'a> {
    pub fn new(schema: &'a StructureSchema) -> Self {
        Self { schema }
    }

    /// Sort items in call order
    pub fn parse(&self, sorts: &[SortExpr]) -> StructuraResult<Vec<SortItem>> {
        sorts
            .iter()
            .map(|sort| {
                Ok(SortItem {
                    path: self.member_path(&sort.member)?,
                    direction: sort.direction,
                })
            })
            .collect()
    }

    fn member_path(&self, expr: &Expr) -> StructuraResult<String> {
        match expr {
            Expr::Member(path) => {
                if self.schema.contains(path) {
                    Ok(path.clone())
                } else {
                    Err(StructuraError::unknown_member(self.schema.name(), path))
                }
            }
            Expr::NullableValue(inner) => self.member_path(inner),
            other => Err(StructuraError::unsupported(format!(
                "sort key must be a member, found {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::expr::member;
    use crate::schema::{DeclaredType, MemberDescription, StructureDescription, StructureSchemaBuilder};

    fn schema() -> StructureSchema {
        let description = StructureDescription::new("Doc")
            .member(MemberDescription::new("Int1", DeclaredType::scalar("i32")))
            .member(MemberDescription::new("String1", DeclaredType::scalar("String")));
        StructureSchemaBuilder::default()
            .build(&description, None)
            .unwrap()
    }

    #[test]
    fn test_sort_items_keep_call_order() {
        let schema = schema();
        let items = SortingParser::new(&schema)
            .parse(&[
                SortExpr::desc(member("String1")),
                SortExpr::asc(member("Int1").value()),
            ])
            .unwrap();
        assert_eq!(
            items,
            vec![
                SortItem {
                    path: "String1".to_string(),
                    direction: SortDirection::Desc
                },
                SortItem {
                    path: "Int1".to_string(),
                    direction: SortDirection::Asc
                },
            ]
        );
    }

    #[test]
    fn test_unknown_sort_member() {
        let schema = schema();
        let err = SortingParser::new(&schema)
            .parse(&[SortExpr::asc(member("Nope"))])
            .unwrap_err();
        assert_eq!(err, StructuraError::unknown_member("Doc", "Nope"));
    }

    #[test]
    fn test_computed_sort_key_is_unsupported() {
        let schema = schema();
        let err = SortingParser::new(&schema)
            .parse(&[SortExpr::asc(member("String1").to_lower())])
            .unwrap_err();
        assert!(matches!(err, StructuraError::UnsupportedExpression(_)));
    }
}
