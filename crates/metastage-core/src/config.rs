//! Per-environment mutation configuration and the read-only sources it
//! comes from.
//!
//! The engine never looks configuration up on its own. Callers hand it a
//! [`ConfigSource`], and a staging run takes one snapshot from it up front.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StagingError, StagingResult};
use crate::taxonomy::EntityCategory;

// ============================================================================
// MutationConfig
// ============================================================================

/// Mutation settings for one environment.
///
/// A missing config behaves exactly like `MutationConfig::disabled(env)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMutationConfig")]
pub struct MutationConfig {
    pub environment_name: String,
    pub enabled_categories: BTreeSet<EntityCategory>,
    /// Source platform instance → target platform instance.
    pub platform_instance_map: BTreeMap<String, String>,
    /// Carried for the admin UI; the engine does not read it.
    pub custom_properties: BTreeMap<String, String>,
}

impl MutationConfig {
    pub fn disabled(environment_name: impl Into<String>) -> Self {
        Self {
            environment_name: environment_name.into(),
            enabled_categories: BTreeSet::new(),
            platform_instance_map: BTreeMap::new(),
            custom_properties: BTreeMap::new(),
        }
    }

    pub fn with_categories(
        environment_name: impl Into<String>,
        categories: impl IntoIterator<Item = EntityCategory>,
    ) -> Self {
        let mut config = Self::disabled(environment_name);
        config.enabled_categories.extend(categories);
        config
    }

    pub fn with_instance(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.platform_instance_map.insert(from.into(), to.into());
        self
    }

    pub fn is_enabled(&self, category: EntityCategory) -> bool {
        self.enabled_categories.contains(&category)
    }
}

/// Wire form accepted on input: either an explicit `enabled_categories` list
/// or the per-category boolean flags the admin UI stores (`mutate_tags`, ...).
#[derive(Deserialize)]
struct RawMutationConfig {
    environment_name: String,
    #[serde(default)]
    enabled_categories: BTreeSet<EntityCategory>,
    #[serde(default)]
    platform_instance_map: BTreeMap<String, String>,
    #[serde(default)]
    custom_properties: BTreeMap<String, String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl From<RawMutationConfig> for MutationConfig {
    fn from(raw: RawMutationConfig) -> Self {
        let mut enabled_categories = raw.enabled_categories;
        for (key, value) in &raw.extra {
            match (EntityCategory::from_mutation_flag(key), value) {
                (Some(category), serde_json::Value::Bool(true)) => {
                    enabled_categories.insert(category);
                }
                (Some(_), serde_json::Value::Bool(false)) => {}
                _ => {
                    tracing::warn!(
                        environment = %raw.environment_name,
                        key = %key,
                        "ignoring unrecognised mutation config field"
                    );
                }
            }
        }
        Self {
            environment_name: raw.environment_name,
            enabled_categories,
            platform_instance_map: raw.platform_instance_map,
            custom_properties: raw.custom_properties,
        }
    }
}

/// On-disk collection of per-environment configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationConfigFile {
    #[serde(default)]
    pub environments: Vec<MutationConfig>,
}

impl MutationConfigFile {
    pub fn into_map(self) -> StagingResult<BTreeMap<String, MutationConfig>> {
        let mut out = BTreeMap::new();
        for config in self.environments {
            let name = config.environment_name.clone();
            if out.insert(name.clone(), config).is_some() {
                return Err(StagingError::DuplicateEnvironment(name));
            }
        }
        Ok(out)
    }
}

// ============================================================================
// Config sources
// ============================================================================

/// Read-only accessor for the current configuration of an environment.
pub trait ConfigSource {
    fn get_config(&self, environment_name: &str) -> StagingResult<Option<MutationConfig>>;
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn get_config(&self, environment_name: &str) -> StagingResult<Option<MutationConfig>> {
        (**self).get_config(environment_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigSource {
    configs: BTreeMap<String, MutationConfig>,
}

impl InMemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, config: MutationConfig) -> Option<MutationConfig> {
        self.configs.insert(config.environment_name.clone(), config)
    }

    pub fn remove(&mut self, environment_name: &str) -> Option<MutationConfig> {
        self.configs.remove(environment_name)
    }
}

impl FromIterator<MutationConfig> for InMemoryConfigSource {
    fn from_iter<I: IntoIterator<Item = MutationConfig>>(iter: I) -> Self {
        let mut source = Self::new();
        for config in iter {
            source.insert(config);
        }
        source
    }
}

impl ConfigSource for InMemoryConfigSource {
    fn get_config(&self, environment_name: &str) -> StagingResult<Option<MutationConfig>> {
        Ok(self.configs.get(environment_name).cloned())
    }
}

/// Reads a [`MutationConfigFile`] from disk on every lookup, so edits made
/// between runs are always picked up. A missing file configures nothing.
#[derive(Debug, Clone)]
pub struct JsonFileConfigSource {
    path: PathBuf,
}

impl JsonFileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> StagingResult<BTreeMap<String, MutationConfig>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no mutation config file");
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(StagingError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let file: MutationConfigFile =
            serde_json::from_str(&text).map_err(|source| StagingError::Decode {
                path: self.path.clone(),
                source,
            })?;
        file.into_map()
    }
}

impl ConfigSource for JsonFileConfigSource {
    fn get_config(&self, environment_name: &str) -> StagingResult<Option<MutationConfig>> {
        Ok(self.load()?.remove(environment_name))
    }
}

// ============================================================================
// Staging options
// ============================================================================

pub const DEFAULT_STAGING_ROOT: &str = "metadata-manager";
pub const DEFAULT_BATCH_FILE_NAME: &str = "mcp_file.json";

/// Where staged batches are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingOptions {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_root() -> PathBuf {
    PathBuf::from(DEFAULT_STAGING_ROOT)
}

fn default_file_name() -> String {
    DEFAULT_BATCH_FILE_NAME.to_string()
}

impl Default for StagingOptions {
    fn default() -> Self {
        Self {
            root: default_root(),
            file_name: default_file_name(),
        }
    }
}

impl StagingOptions {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_admin_flag_form() {
        let config: MutationConfig = serde_json::from_str(
            r#"{
                "environment_name": "dev",
                "mutate_tags": true,
                "mutate_domains": false,
                "mutate_glossary_terms": true
            }"#,
        )
        .unwrap();
        assert!(config.is_enabled(EntityCategory::Tag));
        assert!(config.is_enabled(EntityCategory::GlossaryTerm));
        assert!(!config.is_enabled(EntityCategory::Domain));
        assert!(config.platform_instance_map.is_empty());
    }

    #[test]
    fn accepts_category_list_form() {
        let config: MutationConfig = serde_json::from_str(
            r#"{
                "environment_name": "staging",
                "enabled_categories": ["dataProduct"],
                "platform_instance_map": {"prod_sf": "stg_sf"},
                "custom_properties": {"team": "platform"}
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.enabled_categories,
            BTreeSet::from([EntityCategory::DataProduct])
        );
        assert_eq!(config.platform_instance_map["prod_sf"], "stg_sf");
        assert_eq!(config.custom_properties["team"], "platform");
    }

    #[test]
    fn duplicate_environments_are_rejected() {
        let file = MutationConfigFile {
            environments: vec![MutationConfig::disabled("dev"), MutationConfig::disabled("dev")],
        };
        assert!(matches!(
            file.into_map(),
            Err(StagingError::DuplicateEnvironment(name)) if name == "dev"
        ));
    }

    #[test]
    fn missing_config_file_configures_nothing() {
        let source = JsonFileConfigSource::new("/nonexistent/metastage/mutations.json");
        assert_eq!(source.get_config("dev").unwrap(), None);
    }

    #[test]
    fn in_memory_source_returns_current_snapshot() {
        let mut source: InMemoryConfigSource =
            [MutationConfig::with_categories("dev", [EntityCategory::Tag])]
                .into_iter()
                .collect();
        assert!(source.get_config("dev").unwrap().is_some());
        source.remove("dev");
        assert_eq!(source.get_config("dev").unwrap(), None);
    }
}
