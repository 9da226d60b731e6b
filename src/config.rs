//! Generator defaults loaded from `config/config.toml` or environment variables.
//!
//! ```toml
//! [structura]
//! dialect = "postgres"
//! index_layout = "shared"
//! text_member_suffixes = ["Text", "Body"]
//! max_nesting_depth = 8
//! ```
//!
//! Environment variables use the prefix `STRUCTURA` and the separator `__`,
//! e.g. `STRUCTURA__STRUCTURA__DIALECT=sqlite`.

use crate::schema::{
    DataTypeConverter, StructureSchemaBuilder, DEFAULT_MAX_NESTING_DEPTH, DEFAULT_TEXT_SUFFIXES,
};
use crate::sql::{DbQueryGenerator, Dialect};
use crate::storage::IndexStorageLayout;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "STRUCTURA";
const SECTION: &str = "structura";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StructuraConfig {
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub index_layout: IndexStorageLayout,
    #[serde(default = "default_text_member_suffixes")]
    pub text_member_suffixes: Vec<String>,
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
}

fn default_text_member_suffixes() -> Vec<String> {
    DEFAULT_TEXT_SUFFIXES.iter().map(|s| s.to_string()).collect()
}

fn default_max_nesting_depth() -> usize {
    DEFAULT_MAX_NESTING_DEPTH
}

impl Default for StructuraConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            index_layout: IndexStorageLayout::default(),
            text_member_suffixes: default_text_member_suffixes(),
            max_nesting_depth: default_max_nesting_depth(),
        }
    }
}

impl StructuraConfig {
    /// Load from `config/config.toml`, overridden by env vars
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from the given TOML file, overridden by env vars
    ///
    /// A missing file or a missing `[structura]` section yields the defaults. A file
    /// that exists but cannot be read is logged and skipped.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let builder = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if path.exists() {
                    log::warn!(
                        "Failed to load config file {}, falling back to env: {err}",
                        path.display()
                    );
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {err}, then env-only error: {env_err}"
                        ))
                    })?
            }
        };

        match settings.get::<StructuraConfig>(SECTION) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Structura configuration could not be loaded from file or environment: {e}"
            ))),
        }
    }

    pub fn converter(&self) -> DataTypeConverter {
        DataTypeConverter::with_text_suffixes(self.text_member_suffixes.iter().cloned())
    }

    pub fn schema_builder(&self) -> StructureSchemaBuilder {
        StructureSchemaBuilder::new(self.converter()).with_max_nesting_depth(self.max_nesting_depth)
    }

    pub fn generator(&self) -> DbQueryGenerator {
        DbQueryGenerator::new(self.dialect, self.index_layout)
    }
}
