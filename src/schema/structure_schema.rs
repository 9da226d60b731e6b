//! The immutable schema produced for a structure type.

use super::data_type::DataTypeCode;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Uniqueness scope of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UniqueMode {
    #[default]
    None,
    /// Unique across every stored structure of the type
    PerType,
    /// Unique within the structures written by one operation
    PerQuery,
}

/// A member path projected into index storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexableMember {
    pub path: String,
    pub data_type: DataTypeCode,
    pub nullable: bool,
    /// Set when a collection or dictionary contributes one index row per element
    pub multi_valued: bool,
    pub unique: UniqueMode,
}

/// Uniqueness constraint handed to the uniqueness-enforcement collaborator
///
/// Recorded next to the indexable member of the same path; it is not a
/// queryable member in its own right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    pub path: String,
    pub mode: UniqueMode,
    pub data_type: DataTypeCode,
}

/// Ordered, deduplicated set of indexable members for one structure type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSchema {
    name: String,
    id_member: Option<IndexableMember>,
    members: Vec<IndexableMember>,
    unique_constraints: Vec<UniqueConstraint>,
}

impl StructureSchema {
    pub(crate) fn new(
        name: String,
        id_member: Option<IndexableMember>,
        members: Vec<IndexableMember>,
        unique_constraints: Vec<UniqueConstraint>,
    ) -> Self {
        Self {
            name,
            id_member,
            members,
            unique_constraints,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member holding the structure id, if the type declares one
    pub fn id_member(&self) -> Option<&IndexableMember> {
        self.id_member.as_ref()
    }

    /// Indexed members in declaration order (the id member first when present)
    pub fn members(&self) -> &[IndexableMember] {
        &self.members
    }

    pub fn unique_constraints(&self) -> &[UniqueConstraint] {
        &self.unique_constraints
    }

    pub fn member(&self, path: &str) -> Option<&IndexableMember> {
        self.members.iter().find(|m| m.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.member(path).is_some()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.path.as_str())
    }

    /// SHA-256 over the ordered member set, hex encoded
    ///
    /// Two schemas with the same fingerprint index the same paths with the same
    /// categories, so a cached schema whose fingerprint differs from a freshly
    /// built one is stale.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        for member in &self.members {
            hasher.update(b"\n");
            hasher.update(member.path.as_bytes());
            hasher.update(b":");
            hasher.update(member.data_type.as_str().as_bytes());
            hasher.update(if member.nullable { b"?" } else { b"!" });
            hasher.update(format!("{:?}", member.unique).as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}
