//! Schema builder: walks a type description into a [`StructureSchema`].

use super::data_type::{DataTypeCode, DataTypeConverter};
use super::description::{DeclaredType, MemberDescription, StructureDescription, StructureType};
use super::structure_schema::{IndexableMember, StructureSchema, UniqueConstraint, UniqueMode};
use super::type_config::StructureTypeConfig;
use crate::error::{StructuraError, StructuraResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static MEMBER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid member name pattern"));

/// Default limit on nested object depth
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 16;

/// Scalar leaf found while walking the member graph
#[derive(Debug, Clone)]
struct DeclaredLeaf {
    path: String,
    member_name: String,
    element: DeclaredType,
    nullable: bool,
    multi_valued: bool,
    unique: UniqueMode,
}

/// Builds immutable [`StructureSchema`]s from [`StructureDescription`]s
///
/// The builder holds no per-type state; building the same description with the same
/// configuration twice yields equal schemas.
#[derive(Debug, Clone)]
pub struct StructureSchemaBuilder {
    converter: DataTypeConverter,
    max_nesting_depth: usize,
}

impl Default for StructureSchemaBuilder {
    fn default() -> Self {
        Self::new(DataTypeConverter::default())
    }
}

impl StructureSchemaBuilder {
    pub fn new(converter: DataTypeConverter) -> Self {
        Self {
            converter,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn converter(&self) -> &DataTypeConverter {
        &self.converter
    }

    /// Build the schema for a [`StructureType`]
    pub fn build_for<T: StructureType>(
        &self,
        config: Option<&StructureTypeConfig>,
    ) -> StructuraResult<StructureSchema> {
        self.build(&T::describe(), config)
    }

    /// Build the schema for a description under an optional configuration
    ///
    /// # Errors
    ///
    /// Returns `StructuraError::SchemaConfig` when a member name is not an identifier,
    /// a declared type has no data category, two members normalize to the same path,
    /// a whitelist path does not exist on the type, or nesting exceeds the limit.
    pub fn build(
        &self,
        description: &StructureDescription,
        config: Option<&StructureTypeConfig>,
    ) -> StructuraResult<StructureSchema> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("build_schema", structure = description.name()).entered();

        let default_config = StructureTypeConfig::default();
        let config = config.unwrap_or(&default_config);
        let structure = description.name();
        if !is_identifier(structure) {
            return Err(StructuraError::SchemaConfig(format!(
                "structure name '{structure}' is not a valid identifier"
            )));
        }

        let mut leaves = Vec::new();
        self.collect_leaves(
            structure,
            description.members(),
            "",
            false,
            false,
            0,
            config.includes_nested_members(),
            &mut leaves,
        )?;

        let id_leaf = description
            .id_member()
            .map(|id| declared_id_leaf(structure, id))
            .transpose()?;

        check_collisions(structure, id_leaf.as_ref(), &leaves)?;

        let whitelist = config.member_paths_being_indexed();
        let blacklist = config.member_paths_not_being_indexed();

        for entry in whitelist {
            let exists = id_leaf
                .iter()
                .chain(leaves.iter())
                .any(|leaf| path_matches(&leaf.path, entry));
            if !exists {
                return Err(StructuraError::SchemaConfig(format!(
                    "whitelisted member path '{entry}' does not exist on structure '{structure}'"
                )));
            }
        }

        let mut members = Vec::new();
        let mut unique_constraints = Vec::new();
        let mut id_member = None;

        if let Some(leaf) = &id_leaf {
            let member = self.to_indexable(leaf)?;
            id_member = Some(member.clone());
            members.push(member);
        }

        for leaf in &leaves {
            let keep = if !whitelist.is_empty() {
                whitelist.iter().any(|w| path_matches(&leaf.path, w))
            } else {
                !blacklist.iter().any(|b| path_matches(&leaf.path, b))
            };
            if !keep {
                log::trace!("{structure}: not indexing '{}'", leaf.path);
                continue;
            }

            let member = self.to_indexable(leaf)?;
            if member.unique != UniqueMode::None {
                unique_constraints.push(UniqueConstraint {
                    path: member.path.clone(),
                    mode: member.unique,
                    data_type: member.data_type,
                });
            }
            members.push(member);
        }

        log::debug!(
            "Built schema for '{structure}' with {} indexed member(s), {} unique constraint(s)",
            members.len(),
            unique_constraints.len()
        );

        Ok(StructureSchema::new(
            structure.to_string(),
            id_member,
            members,
            unique_constraints,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_leaves(
        &self,
        structure: &str,
        members: &[MemberDescription],
        prefix: &str,
        nullable: bool,
        multi_valued: bool,
        depth: usize,
        include_nested: bool,
        out: &mut Vec<DeclaredLeaf>,
    ) -> StructuraResult<()> {
        for member in members {
            validate_member_name(structure, member.name())?;
            let path = if prefix.is_empty() {
                member.name().to_string()
            } else {
                format!("{prefix}.{}", member.name())
            };
            let declared = member.declared();
            let member_nullable = nullable || declared.is_nullable();
            let member_multi = multi_valued || declared.is_multi_valued();

            match declared.element() {
                DeclaredType::Object(nested) => {
                    if !include_nested {
                        log::trace!("{structure}: skipping nested member '{path}'");
                        continue;
                    }
                    if depth >= self.max_nesting_depth {
                        return Err(StructuraError::SchemaConfig(format!(
                            "member '{path}' of structure '{structure}' nests deeper than {} levels",
                            self.max_nesting_depth
                        )));
                    }
                    self.collect_leaves(
                        structure,
                        &nested.resolve(),
                        &path,
                        member_nullable,
                        member_multi,
                        depth + 1,
                        include_nested,
                        out,
                    )?;
                }
                element => out.push(DeclaredLeaf {
                    path,
                    member_name: member.name().to_string(),
                    element: element.clone(),
                    nullable: member_nullable,
                    multi_valued: member_multi,
                    unique: member.unique_mode(),
                }),
            }
        }
        Ok(())
    }

    fn to_indexable(&self, leaf: &DeclaredLeaf) -> StructuraResult<IndexableMember> {
        let data_type = match &leaf.element {
            DeclaredType::Scalar(type_name) => self.converter.convert(type_name, &leaf.member_name)?,
            DeclaredType::Enum => DataTypeCode::Enum,
            other => {
                return Err(StructuraError::SchemaConfig(format!(
                    "member '{}' has no scalar element type: {other:?}",
                    leaf.path
                )))
            }
        };
        Ok(IndexableMember {
            path: leaf.path.clone(),
            data_type,
            nullable: leaf.nullable,
            multi_valued: leaf.multi_valued,
            unique: leaf.unique,
        })
    }
}

fn declared_id_leaf(structure: &str, id: &MemberDescription) -> StructuraResult<DeclaredLeaf> {
    validate_member_name(structure, id.name())?;
    let declared = id.declared();
    if declared.is_nullable() || declared.is_multi_valued() {
        return Err(StructuraError::SchemaConfig(format!(
            "id member '{}' of structure '{structure}' must be a single non-null scalar",
            id.name()
        )));
    }
    match declared {
        DeclaredType::Scalar(_) => Ok(DeclaredLeaf {
            path: id.name().to_string(),
            member_name: id.name().to_string(),
            element: declared.clone(),
            nullable: false,
            multi_valued: false,
            unique: UniqueMode::None,
        }),
        other => Err(StructuraError::SchemaConfig(format!(
            "id member '{}' of structure '{structure}' must be a scalar, found {other:?}",
            id.name()
        ))),
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    MEMBER_NAME.is_match(name)
}

fn validate_member_name(structure: &str, name: &str) -> StructuraResult<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(StructuraError::SchemaConfig(format!(
            "member name '{name}' of structure '{structure}' is not a valid identifier"
        )))
    }
}

/// Two paths collide when index storage cannot tell them apart (case-insensitive)
fn check_collisions(
    structure: &str,
    id_leaf: Option<&DeclaredLeaf>,
    leaves: &[DeclaredLeaf],
) -> StructuraResult<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for leaf in id_leaf.into_iter().chain(leaves.iter()) {
        let normalized = leaf.path.to_lowercase();
        if let Some(existing) = seen.insert(normalized, &leaf.path) {
            return Err(StructuraError::SchemaConfig(format!(
                "members '{existing}' and '{}' of structure '{structure}' normalize to the same path",
                leaf.path
            )));
        }
    }
    Ok(())
}

/// `entry` selects `path` exactly or as one of its containers
fn path_matches(path: &str, entry: &str) -> bool {
    path == entry
        || (path.len() > entry.len()
            && path.starts_with(entry)
            && path.as_bytes()[entry.len()] == b'.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::description::{DeclaredType, MemberDescription};

    fn scalar(name: &str, type_name: &str) -> MemberDescription {
        MemberDescription::new(name, DeclaredType::scalar(type_name))
    }

    fn doc() -> StructureDescription {
        StructureDescription::new("Doc")
            .with_id_member("StructureId", DeclaredType::scalar("Uuid"))
            .member(scalar("Int1", "i32"))
            .member(scalar("String1", "String"))
            .member(MemberDescription::new(
                "Container",
                DeclaredType::object(vec![
                    scalar("NestedInt", "i64"),
                    MemberDescription::new(
                        "Deeper",
                        DeclaredType::object(vec![scalar("Flag", "bool")]),
                    ),
                ]),
            ))
            .member(MemberDescription::new(
                "Tags",
                DeclaredType::collection(DeclaredType::scalar("String")),
            ))
            .member(MemberDescription::new(
                "Score",
                DeclaredType::nullable(DeclaredType::scalar("f64")),
            ))
    }

    fn paths(schema: &StructureSchema) -> Vec<&str> {
        schema.paths().collect()
    }

    #[test]
    fn test_nested_members_skipped_by_default() {
        let schema = StructureSchemaBuilder::default().build(&doc(), None).unwrap();
        assert_eq!(paths(&schema), vec!["StructureId", "Int1", "String1", "Tags", "Score"]);
    }

    #[test]
    fn test_nested_members_flattened_when_enabled() {
        let mut config = StructureTypeConfig::new();
        config.include_nested_members(true);
        let schema = StructureSchemaBuilder::default().build(&doc(), Some(&config)).unwrap();
        assert_eq!(
            paths(&schema),
            vec![
                "StructureId",
                "Int1",
                "String1",
                "Container.NestedInt",
                "Container.Deeper.Flag",
                "Tags",
                "Score"
            ]
        );
        assert_eq!(
            schema.member("Container.Deeper.Flag").unwrap().data_type,
            DataTypeCode::Boolean
        );
    }

    #[test]
    fn test_collection_is_single_multi_valued_entry() {
        let schema = StructureSchemaBuilder::default().build(&doc(), None).unwrap();
        let tags = schema.member("Tags").unwrap();
        assert!(tags.multi_valued);
        assert_eq!(tags.data_type, DataTypeCode::String);
        assert!(schema.member("Score").unwrap().nullable);
    }

    #[test]
    fn test_whitelist_intersects_declared_paths() {
        let mut config = StructureTypeConfig::new();
        config.only_index_this(["Int1", "Tags"]);
        let schema = StructureSchemaBuilder::default().build(&doc(), Some(&config)).unwrap();
        assert_eq!(paths(&schema), vec!["StructureId", "Int1", "Tags"]);
    }

    #[test]
    fn test_whitelist_container_prefix() {
        let mut config = StructureTypeConfig::new();
        config.include_nested_members(true).only_index_this(["Container"]);
        let schema = StructureSchemaBuilder::default().build(&doc(), Some(&config)).unwrap();
        assert_eq!(
            paths(&schema),
            vec!["StructureId", "Container.NestedInt", "Container.Deeper.Flag"]
        );
    }

    #[test]
    fn test_blacklist_removes_paths() {
        let mut config = StructureTypeConfig::new();
        config.include_nested_members(true).do_not_index_this(["String1", "Container.Deeper", "Nope"]);
        let schema = StructureSchemaBuilder::default().build(&doc(), Some(&config)).unwrap();
        assert_eq!(
            paths(&schema),
            vec!["StructureId", "Int1", "Container.NestedInt", "Tags", "Score"]
        );
    }

    #[test]
    fn test_blacklist_does_not_remove_id() {
        let mut config = StructureTypeConfig::new();
        config.do_not_index_this(["StructureId"]);
        let schema = StructureSchemaBuilder::default().build(&doc(), Some(&config)).unwrap();
        assert_eq!(schema.id_member().unwrap().path, "StructureId");
        assert!(schema.contains("StructureId"));
    }

    #[test]
    fn test_unknown_whitelist_path_fails() {
        let mut config = StructureTypeConfig::new();
        config.only_index_this(["Container.NestedInt"]);
        // Nested inclusion is off, so the nested path is not declared.
        let err = StructureSchemaBuilder::default()
            .build(&doc(), Some(&config))
            .unwrap_err();
        assert!(matches!(err, StructuraError::SchemaConfig(msg) if msg.contains("Container.NestedInt")));
    }

    #[test]
    fn test_case_insensitive_collision_fails() {
        let description = StructureDescription::new("Doc")
            .member(scalar("Name", "String"))
            .member(scalar("name", "String"));
        let err = StructureSchemaBuilder::default().build(&description, None).unwrap_err();
        assert!(matches!(err, StructuraError::SchemaConfig(msg) if msg.contains("normalize")));
    }

    #[test]
    fn test_nested_collision_fails() {
        let description = StructureDescription::new("Doc")
            .member(scalar("A_B", "i32"))
            .member(MemberDescription::new(
                "A",
                DeclaredType::object(vec![scalar("B", "i32"), scalar("b", "i32")]),
            ));
        let mut config = StructureTypeConfig::new();
        config.include_nested_members(true);
        let err = StructureSchemaBuilder::default()
            .build(&description, Some(&config))
            .unwrap_err();
        assert!(matches!(err, StructuraError::SchemaConfig(_)));
    }

    #[test]
    fn test_invalid_member_name_fails() {
        let description = StructureDescription::new("Doc").member(scalar("Bad Name", "i32"));
        let err = StructureSchemaBuilder::default().build(&description, None).unwrap_err();
        assert!(matches!(err, StructuraError::SchemaConfig(msg) if msg.contains("identifier")));
    }

    #[test]
    fn test_unique_members_recorded_as_constraints() {
        let description = StructureDescription::new("Account")
            .member(scalar("Email", "String").unique(UniqueMode::PerType))
            .member(scalar("Batch", "i32").unique(UniqueMode::PerQuery))
            .member(scalar("Name", "String"));
        let schema = StructureSchemaBuilder::default().build(&description, None).unwrap();

        assert_eq!(paths(&schema), vec!["Email", "Batch", "Name"]);
        let constraints = schema.unique_constraints();
        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints[0].path, "Email");
        assert_eq!(constraints[0].mode, UniqueMode::PerType);
        assert_eq!(constraints[1].mode, UniqueMode::PerQuery);
    }

    #[test]
    fn test_nesting_depth_limit() {
        fn looped() -> StructureDescription {
            StructureDescription::new("Node").member(MemberDescription::new(
                "Next",
                DeclaredType::Object(crate::schema::description::NestedMembers::Deferred(looped)),
            ))
        }
        let mut config = StructureTypeConfig::new();
        config.include_nested_members(true);
        let err = StructureSchemaBuilder::default()
            .with_max_nesting_depth(3)
            .build(&looped(), Some(&config))
            .unwrap_err();
        assert!(matches!(err, StructuraError::SchemaConfig(msg) if msg.contains("deeper")));
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut config = StructureTypeConfig::new();
        config.include_nested_members(true).do_not_index_this(["Score"]);
        let builder = StructureSchemaBuilder::default();
        let first = builder.build(&doc(), Some(&config)).unwrap();
        let second = builder.build(&doc(), Some(&config)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn test_path_matches() {
        assert!(path_matches("A.B", "A"));
        assert!(path_matches("A", "A"));
        assert!(!path_matches("AB", "A"));
        assert!(!path_matches("A", "A.B"));
    }
}
