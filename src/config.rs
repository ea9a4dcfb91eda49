//! Per-type merge configuration.
//!
//! Only types present in a [`MergeConfig`] are ever written to or deleted
//! from a store. Everything else is inert.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::merge::{DeepMerge, MergeStrategy, Preprocess, ShallowMerge};
use crate::resource::Resource;

/// Configuration for a single resource type.
#[derive(Clone)]
pub struct ResourceConfig {
    target: Option<String>,
    merge: Arc<dyn MergeStrategy>,
    preprocess: Option<Arc<dyn Preprocess>>,
}

impl ResourceConfig {
    /// Shallow merge into a bucket named after the type, no preprocessing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store resources of this type in `bucket` instead of the type name.
    #[must_use]
    pub fn target(mut self, bucket: impl Into<String>) -> Self {
        self.target = Some(bucket.into());
        self
    }

    /// Set the merge strategy (default: [`ShallowMerge`]).
    #[must_use]
    pub fn merge_with(mut self, strategy: impl MergeStrategy + 'static) -> Self {
        self.merge = Arc::new(strategy);
        self
    }

    /// Set a hook applied to every incoming resource before merging.
    #[must_use]
    pub fn preprocess_with(mut self, hook: impl Preprocess + 'static) -> Self {
        self.preprocess = Some(Arc::new(hook));
        self
    }

    /// Bucket name for `resource_type` under this configuration.
    #[must_use]
    pub fn bucket_for<'a>(&'a self, resource_type: &'a str) -> &'a str {
        self.target.as_deref().unwrap_or(resource_type)
    }

    /// Run the preprocess hook, then merge with the stored version.
    #[must_use]
    pub fn merge(&self, existing: Option<&Resource>, incoming: Resource) -> Resource {
        let incoming = match &self.preprocess {
            Some(hook) => hook.preprocess(incoming),
            None => incoming,
        };
        self.merge.merge(existing, incoming)
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            target: None,
            merge: Arc::new(ShallowMerge),
            preprocess: None,
        }
    }
}

impl fmt::Debug for ResourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceConfig")
            .field("target", &self.target)
            .field("preprocess", &self.preprocess.is_some())
            .finish_non_exhaustive()
    }
}

/// Merge configuration for every handled resource type.
///
/// # Examples
///
/// ```
/// use jsonapi_normalizer::{DeepMerge, MergeConfig, ResourceConfig};
///
/// let config = MergeConfig::new()
///     .with_type("user", ResourceConfig::new())
///     .with_type("people", ResourceConfig::new().target("user").merge_with(DeepMerge));
///
/// assert!(config.is_configured("people"));
/// assert!(!config.is_configured("post"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MergeConfig {
    types: HashMap<String, ResourceConfig>,
}

impl MergeConfig {
    /// Create an empty configuration. Every type is inert.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type.
    #[must_use]
    pub fn with_type(mut self, resource_type: impl Into<String>, config: ResourceConfig) -> Self {
        self.types.insert(resource_type.into(), config);
        self
    }

    /// Resolve the configuration for a resource type.
    #[must_use]
    pub fn resolve(&self, resource_type: &str) -> Option<&ResourceConfig> {
        self.types.get(resource_type)
    }

    #[must_use]
    pub fn is_configured(&self, resource_type: &str) -> bool {
        self.types.contains_key(resource_type)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Built-in merge strategies selectable from declarative configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeKind {
    #[default]
    Shallow,
    Deep,
}

/// Declarative settings for one type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeSpec {
    /// Bucket override.
    pub target: Option<String>,
    /// Merge strategy.
    pub merge: MergeKind,
}

/// Serializable form of a [`MergeConfig`].
///
/// Preprocess hooks and custom strategies cannot be expressed here. Attach
/// them to the result of [`MergeConfigSpec::into_config`] instead.
///
/// ```json
/// { "types": { "user": {}, "people": { "target": "user", "merge": "deep" } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfigSpec {
    pub types: BTreeMap<String, TypeSpec>,
}

impl MergeConfigSpec {
    /// Parse a spec from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate and build the runtime configuration.
    pub fn into_config(self) -> Result<MergeConfig, ConfigError> {
        let mut config = MergeConfig::new();
        for (resource_type, spec) in self.types {
            let mut entry = ResourceConfig::new();
            if let Some(target) = spec.target {
                let target = target.trim().to_string();
                if target.is_empty() {
                    return Err(ConfigError::EmptyTarget { resource_type });
                }
                entry = entry.target(target);
            }
            if spec.merge == MergeKind::Deep {
                entry = entry.merge_with(DeepMerge);
            }
            config = config.with_type(resource_type, entry);
        }
        Ok(config)
    }
}
