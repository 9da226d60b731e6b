//! Per-type indexing configuration.
//!
//! A `StructureTypeConfig` is plain data: which member paths to index and whether
//! nested objects are flattened. It must be settled before the first schema is built
//! for a type; changing it afterwards only takes effect once the caller invalidates
//! the cached schema.

use super::description::StructureType;
use std::collections::{BTreeSet, HashMap};

/// Include/exclude lists and nesting flag for one structure type
///
/// The whitelist and blacklist are mutually exclusive: setting one clears the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureTypeConfig {
    member_paths_being_indexed: BTreeSet<String>,
    member_paths_not_being_indexed: BTreeSet<String>,
    include_nested_members: bool,
}

impl StructureTypeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index only the given paths (whitelist); clears any blacklist
    pub fn only_index_this<I, S>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.member_paths_not_being_indexed.clear();
        self.member_paths_being_indexed
            .extend(paths.into_iter().map(Into::into));
        self
    }

    /// Index everything except the given paths (blacklist); clears any whitelist
    pub fn do_not_index_this<I, S>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.member_paths_being_indexed.clear();
        self.member_paths_not_being_indexed
            .extend(paths.into_iter().map(Into::into));
        self
    }

    /// Flatten members of nested objects into the owner's schema
    pub fn include_nested_members(&mut self, include: bool) -> &mut Self {
        self.include_nested_members = include;
        self
    }

    pub fn member_paths_being_indexed(&self) -> &BTreeSet<String> {
        &self.member_paths_being_indexed
    }

    pub fn member_paths_not_being_indexed(&self) -> &BTreeSet<String> {
        &self.member_paths_not_being_indexed
    }

    pub fn includes_nested_members(&self) -> bool {
        self.include_nested_members
    }

    pub fn is_empty(&self) -> bool {
        self.member_paths_being_indexed.is_empty()
            && self.member_paths_not_being_indexed.is_empty()
            && !self.include_nested_members
    }
}

/// Registry of configurations keyed by structure name
#[derive(Debug, Clone, Default)]
pub struct StructureTypeConfigurations {
    configs: HashMap<String, StructureTypeConfig>,
}

impl StructureTypeConfigurations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the configuration for `structure_name`, creating an empty one if needed
    pub fn configure(&mut self, structure_name: &str) -> &mut StructureTypeConfig {
        self.configs.entry(structure_name.to_string()).or_default()
    }

    pub fn configure_for<T: StructureType>(&mut self) -> &mut StructureTypeConfig {
        let name = T::structure_name();
        self.configure(&name)
    }

    pub fn get(&self, structure_name: &str) -> Option<&StructureTypeConfig> {
        self.configs.get(structure_name)
    }

    pub fn remove(&mut self, structure_name: &str) -> Option<StructureTypeConfig> {
        self.configs.remove(structure_name)
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
