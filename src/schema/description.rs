//! Declarative type descriptions consumed by the schema builder.
//!
//! A `StructureDescription` lists a type's members with their declared types. It is
//! usually generated by `#[derive(Structure)]`, but can be written by hand for types
//! the derive cannot see (foreign types, dynamic documents).

use super::structure_schema::UniqueMode;
use std::fmt;

/// Types that can describe their member graph to the schema builder
///
/// # Example
///
/// ```
/// use structura::{DeclaredType, MemberDescription, StructureDescription, StructureType};
///
/// struct Customer;
///
/// impl StructureType for Customer {
///     fn describe() -> StructureDescription {
///         StructureDescription::new("Customer")
///             .with_id_member("StructureId", DeclaredType::scalar("Uuid"))
///             .member(MemberDescription::new("Name", DeclaredType::scalar("String")))
///     }
/// }
///
/// assert_eq!(Customer::describe().name(), "Customer");
/// ```
pub trait StructureType {
    fn describe() -> StructureDescription;

    fn structure_name() -> String {
        Self::describe().name().to_string()
    }
}

/// Members of a nested object, either listed inline or produced on demand
///
/// The deferred form lets self-referential types describe themselves without
/// recursing until the builder actually descends.
#[derive(Clone)]
pub enum NestedMembers {
    Inline(Vec<MemberDescription>),
    Deferred(fn() -> StructureDescription),
}

impl NestedMembers {
    pub fn resolve(&self) -> Vec<MemberDescription> {
        match self {
            NestedMembers::Inline(members) => members.clone(),
            NestedMembers::Deferred(describe) => describe().members,
        }
    }
}

impl fmt::Debug for NestedMembers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NestedMembers::Inline(members) => f.debug_tuple("Inline").field(members).finish(),
            NestedMembers::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Declared type of a member, as reported by the host type system
#[derive(Debug, Clone)]
pub enum DeclaredType {
    /// A scalar, named the way the host spells it (e.g. "i32", "String", "Uuid")
    Scalar(String),
    /// An enum stored by variant name
    Enum,
    Nullable(Box<DeclaredType>),
    /// Sequence or set; every element is indexed under the member's own path
    Collection(Box<DeclaredType>),
    /// Map; the values are indexed under the member's own path
    Dictionary(Box<DeclaredType>),
    /// A nested object whose members may be flattened into the owner
    Object(NestedMembers),
}

impl DeclaredType {
    pub fn scalar<S: Into<String>>(type_name: S) -> Self {
        DeclaredType::Scalar(type_name.into())
    }

    pub fn nullable(inner: DeclaredType) -> Self {
        DeclaredType::Nullable(Box::new(inner))
    }

    pub fn collection(element: DeclaredType) -> Self {
        DeclaredType::Collection(Box::new(element))
    }

    pub fn dictionary(value: DeclaredType) -> Self {
        DeclaredType::Dictionary(Box::new(value))
    }

    pub fn object(members: Vec<MemberDescription>) -> Self {
        DeclaredType::Object(NestedMembers::Inline(members))
    }

    /// Nested object described by another [`StructureType`]
    pub fn structure<T: StructureType>() -> Self {
        DeclaredType::Object(NestedMembers::Deferred(T::describe))
    }

    /// Whether values of this type may be absent
    pub fn is_nullable(&self) -> bool {
        match self {
            DeclaredType::Nullable(_) => true,
            DeclaredType::Collection(inner) | DeclaredType::Dictionary(inner) => {
                inner.is_nullable()
            }
            _ => false,
        }
    }

    /// Whether the member produces several index values per structure
    pub fn is_multi_valued(&self) -> bool {
        match self {
            DeclaredType::Collection(_) | DeclaredType::Dictionary(_) => true,
            DeclaredType::Nullable(inner) => inner.is_multi_valued(),
            _ => false,
        }
    }

    /// Strip nullable and container wrappers
    pub fn element(&self) -> &DeclaredType {
        match self {
            DeclaredType::Nullable(inner)
            | DeclaredType::Collection(inner)
            | DeclaredType::Dictionary(inner) => inner.element(),
            other => other,
        }
    }
}

/// One member of a described type
#[derive(Debug, Clone)]
pub struct MemberDescription {
    pub(crate) name: String,
    pub(crate) declared: DeclaredType,
    pub(crate) unique: UniqueMode,
}

impl MemberDescription {
    pub fn new<S: Into<String>>(name: S, declared: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared,
            unique: UniqueMode::None,
        }
    }

    /// Flag the member as unique within the given scope
    pub fn unique(mut self, mode: UniqueMode) -> Self {
        self.unique = mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared(&self) -> &DeclaredType {
        &self.declared
    }

    pub fn unique_mode(&self) -> UniqueMode {
        self.unique
    }
}

/// Member graph of a structure type
#[derive(Debug, Clone)]
pub struct StructureDescription {
    pub(crate) name: String,
    pub(crate) id_member: Option<MemberDescription>,
    pub(crate) members: Vec<MemberDescription>,
}

impl StructureDescription {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            id_member: None,
            members: Vec::new(),
        }
    }

    /// Declare the member holding the structure id
    ///
    /// The id member is always indexed, whatever the type configuration says.
    pub fn with_id_member<S: Into<String>>(mut self, name: S, declared: DeclaredType) -> Self {
        self.id_member = Some(MemberDescription::new(name, declared));
        self
    }

    pub fn member(mut self, member: MemberDescription) -> Self {
        self.members.push(member);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_member(&self) -> Option<&MemberDescription> {
        self.id_member.as_ref()
    }

    pub fn members(&self) -> &[MemberDescription] {
        &self.members
    }

    pub fn into_members(self) -> Vec<MemberDescription> {
        self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_and_multi_valued() {
        let tags = DeclaredType::collection(DeclaredType::scalar("String"));
        assert!(tags.is_multi_valued());
        assert!(!tags.is_nullable());

        let maybe = DeclaredType::nullable(DeclaredType::scalar("i32"));
        assert!(maybe.is_nullable());
        assert!(!maybe.is_multi_valued());

        let maybe_list = DeclaredType::nullable(DeclaredType::collection(DeclaredType::scalar("i32")));
        assert!(maybe_list.is_multi_valued());
    }

    #[test]
    fn test_element_strips_wrappers() {
        let declared = DeclaredType::collection(DeclaredType::nullable(DeclaredType::scalar("u8")));
        assert!(matches!(declared.element(), DeclaredType::Scalar(name) if name == "u8"));
    }

    #[test]
    fn test_deferred_members_resolve_lazily() {
        struct Address;
        impl StructureType for Address {
            fn describe() -> StructureDescription {
                StructureDescription::new("Address")
                    .member(MemberDescription::new("Street", DeclaredType::scalar("String")))
            }
        }

        let declared = DeclaredType::structure::<Address>();
        match declared {
            DeclaredType::Object(nested) => {
                let members = nested.resolve();
                assert_eq!(members.len(), 1);
                assert_eq!(members[0].name(), "Street");
            }
            other => panic!("expected object, got {other:?}"),
        }
        assert_eq!(Address::structure_name(), "Address");
    }
}
