//! Process-wide memoization of built schemas.
//!
//! `StructureSchemas` builds a schema the first time a structure is requested and
//! hands out shared `Arc`s afterwards. Reads take a shared lock; only the first build
//! and explicit invalidation take the exclusive one. Configuration changes are never
//! picked up implicitly: call [`StructureSchemas::invalidate`] after reconfiguring.
//!
//! Every invalidation bumps a generation counter. A build that started before the
//! bump is not cached, so a schema built from a superseded configuration never
//! outlives the `invalidate` call that retired it.

use super::builder::StructureSchemaBuilder;
use super::description::{StructureDescription, StructureType};
use super::structure_schema::StructureSchema;
use super::type_config::{StructureTypeConfig, StructureTypeConfigurations};
use crate::error::StructuraResult;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Schema cache keyed by structure name
#[derive(Debug, Default)]
pub struct StructureSchemas {
    builder: StructureSchemaBuilder,
    configurations: RwLock<StructureTypeConfigurations>,
    schemas: RwLock<HashMap<String, Arc<StructureSchema>>>,
    generation: AtomicU64,
}

impl StructureSchemas {
    pub fn new(builder: StructureSchemaBuilder) -> Self {
        Self {
            builder,
            configurations: RwLock::new(StructureTypeConfigurations::new()),
            schemas: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn builder(&self) -> &StructureSchemaBuilder {
        &self.builder
    }

    /// Mutate the configuration for a structure
    ///
    /// Does not touch an already cached schema for that structure.
    pub fn configure<F>(&self, structure_name: &str, f: F)
    where
        F: FnOnce(&mut StructureTypeConfig),
    {
        let mut configurations = self
            .configurations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(configurations.configure(structure_name));
    }

    /// Cached schema for `structure_name`, if one has been built
    pub fn get(&self, structure_name: &str) -> Option<Arc<StructureSchema>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(structure_name)
            .cloned()
    }

    /// Cached schema for `T`, building it on first use
    pub fn get_schema<T: StructureType>(&self) -> StructuraResult<Arc<StructureSchema>> {
        let name = T::structure_name();
        if let Some(schema) = self.get(&name) {
            return Ok(schema);
        }
        self.get_or_build(&T::describe())
    }

    /// Cached schema for the described structure, building it on first use
    pub fn get_or_build(
        &self,
        description: &StructureDescription,
    ) -> StructuraResult<Arc<StructureSchema>> {
        let name = description.name();
        loop {
            if let Some(schema) = self.get(name) {
                return Ok(schema);
            }

            // Read before the configuration so a later invalidation is always seen
            let generation = self.generation.load(Ordering::Acquire);
            let config = self
                .configurations
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(name)
                .cloned();
            let built = Arc::new(self.builder.build(description, config.as_ref())?);

            if let Some(schema) = self.store(name, generation, built) {
                return Ok(schema);
            }
            log::debug!("Schema for '{name}' was invalidated while building; rebuilding");
        }
    }

    /// Cache `built` unless an invalidation happened after `generation` was read
    fn store(
        &self,
        name: &str,
        generation: u64,
        built: Arc<StructureSchema>,
    ) -> Option<Arc<StructureSchema>> {
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::Acquire) != generation {
            return None;
        }
        // Another thread may have won the race; keep the first schema stored.
        Some(schemas.entry(name.to_string()).or_insert(built).clone())
    }

    /// Drop the cached schema for `structure_name`; the next request rebuilds it
    ///
    /// Also retires builds still in flight, even when nothing was cached yet.
    pub fn invalidate(&self, structure_name: &str) -> bool {
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::AcqRel);
        let removed = schemas.remove(structure_name).is_some();
        drop(schemas);
        if removed {
            log::debug!("Invalidated cached schema for '{structure_name}'");
        }
        removed
    }

    pub fn clear(&self) {
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::AcqRel);
        schemas.clear();
    }
}
