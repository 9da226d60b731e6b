//! Include parser: resolves which member holds the id of an included structure.

use super::command::IncludeSpec;
use super::expr::Expr;
use crate::error::{StructuraError, StructuraResult};
use crate::schema::builder::is_identifier;
use crate::schema::StructureSchema;

/// An include as written by the caller
#[derive(Debug, Clone)]
pub struct IncludeExpr {
    pub included_structure: String,
    /// Member of the queried structure holding the referenced id
    pub owner: Expr,
    pub target_path: String,
}

#[derive(Debug, Clone, Copy)]
pub struct IncludeParser<'a> {
    schema: &'a StructureSchema,
}

impl<'a> IncludeParser<'a> {
    pub fn new(schema: &'a StructureSchema) -> Self {
        Self { schema }
    }

    /// One include spec per include; several includes are independent of each other
    pub fn parse(&self, includes: &[IncludeExpr]) -> StructuraResult<Vec<IncludeSpec>> {
        includes.iter().map(|include| self.parse_one(include)).collect()
    }

    fn parse_one(&self, include: &IncludeExpr) -> StructuraResult<IncludeSpec> {
        if !is_identifier(&include.included_structure) {
            return Err(StructuraError::unsupported(format!(
                "included structure name '{}' is not a valid identifier",
                include.included_structure
            )));
        }

        let owner_path = match &include.owner {
            Expr::Member(path) => path,
            Expr::NullableValue(inner) => match inner.as_ref() {
                Expr::Member(path) => path,
                other => {
                    return Err(StructuraError::unsupported(format!(
                        "include owner must be a member, found {other:?}"
                    )))
                }
            },
            other => {
                return Err(StructuraError::unsupported(format!(
                    "include owner must be a member, found {other:?}"
                )))
            }
        };

        let owner = self
            .schema
            .member(owner_path)
            .ok_or_else(|| StructuraError::unknown_member(self.schema.name(), owner_path))?;
        if !owner.data_type.can_reference_structure() {
            return Err(StructuraError::unsupported(format!(
                "member '{owner_path}' of category {} cannot hold a structure id",
                owner.data_type
            )));
        }

        Ok(IncludeSpec {
            owner_path: owner.path.clone(),
            owner_data_type: owner.data_type,
            included_structure: include.included_structure.clone(),
            target_path: include.target_path.clone(),
        })
    }
}
