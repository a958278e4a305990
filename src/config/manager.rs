//! # Configuration Manager
//!
//! Hierarchical configuration with dotted-path access, deep-merge updates and
//! derived feature flags.
//!
//! ## Architecture
//!
//! The live configuration is a JSON tree generated from the typed
//! [`AccessifyConfig`] defaults. The dotted-path API (`get`, `set`, `update`)
//! works directly on that tree so callers can address any node by string;
//! [`ConfigurationManager::typed`] reads the tree back into the typed schema.
//!
//! Feature flags are derived from the tree through the static
//! [`FEATURE_FLAGS`] table and recomputed after every mutation, so flag
//! membership always matches the mapped `enabled` booleans.
//!
//! ## Usage
//!
//! ```rust
//! use accessify_core::config::ConfigurationManager;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigurationManager::new();
//!
//! config.set("motor.targets.minSize", json!(48))?;
//! assert_eq!(config.get("motor.targets.minSize"), Some(json!(48)));
//! assert_eq!(config.get_or("motor.targets.padding", json!(8)), json!(8));
//!
//! config.update(json!({ "visual": { "textSize": { "enabled": false } } }))?;
//! assert!(!config.is_feature_enabled("textSizeAdjustment"));
//! # Ok(())
//! # }
//! ```

use super::error::ConfigurationError;
use super::flags::{self, FEATURE_FLAGS};
use super::loader;
use super::merge::{deep_merge, get_path, set_path};
use super::types::AccessifyConfig;
use super::validation::{validate_tree, ValidationReport};
use crate::error::{AccessifyError, Result};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, error, info, instrument};

struct ConfigInner {
    tree: Value,
    flags: BTreeSet<&'static str>,
}

impl ConfigInner {
    fn new(tree: Value) -> Self {
        let mut inner = Self {
            tree,
            flags: BTreeSet::new(),
        };
        inner.recompute_flags();
        inner
    }

    fn recompute_flags(&mut self) {
        self.flags = FEATURE_FLAGS
            .iter()
            .filter(|flag| {
                get_path(&self.tree, &flag.enabled_path()) == Some(&Value::Bool(true))
            })
            .map(|flag| flag.name)
            .collect();
    }
}

/// Built-in default tree
pub fn default_tree() -> Value {
    serde_json::to_value(AccessifyConfig::default()).unwrap_or_else(|err| {
        error!(error = %err, "Failed to serialise default configuration");
        Value::Object(Map::new())
    })
}

/// Hierarchical configuration and feature flags
pub struct ConfigurationManager {
    inner: RwLock<ConfigInner>,
}

impl ConfigurationManager {
    /// Manager holding the built-in defaults
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ConfigInner::new(default_tree())),
        }
    }

    /// Manager holding the defaults with `overrides` deep-merged on top
    pub fn with_overrides(overrides: Value) -> Result<Self> {
        let manager = Self::new();
        manager.update(overrides)?;
        Ok(manager)
    }

    /// Manager holding the defaults with a YAML/JSON overlay file on top
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let overrides = loader::load_overrides(path.as_ref())?;
        info!(file = %path.as_ref().display(), "Loaded configuration overlay");
        Self::with_overrides(overrides)
    }

    /// Value at a dotted path
    pub fn get(&self, path: &str) -> Option<Value> {
        get_path(&self.inner.read().tree, path).cloned()
    }

    /// Value at a dotted path, or `default` when missing
    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).unwrap_or(default)
    }

    /// Write a value at a dotted path, creating intermediate objects
    #[instrument(skip(self, value))]
    pub fn set(&self, path: &str, value: Value) -> Result<()> {
        let mut inner = self.inner.write();
        if !set_path(&mut inner.tree, path, value) {
            return Err(ConfigurationError::invalid_path(path).into());
        }
        inner.recompute_flags();
        debug!("Configuration value set");
        Ok(())
    }

    /// Deep-merge `partial` into the tree and recompute every flag
    pub fn update(&self, partial: Value) -> Result<()> {
        if !partial.is_object() {
            return Err(AccessifyError::invalid_argument(
                "configuration update expects a mapping",
            ));
        }
        let mut inner = self.inner.write();
        deep_merge(&mut inner.tree, partial);
        inner.recompute_flags();
        debug!(enabled_features = inner.flags.len(), "Configuration updated");
        Ok(())
    }

    /// Copy of the whole tree
    pub fn get_all(&self) -> Value {
        self.inner.read().tree.clone()
    }

    /// The live tree read back into the typed schema
    pub fn typed(&self) -> std::result::Result<AccessifyConfig, ConfigurationError> {
        serde_json::from_value(self.get_all()).map_err(|e| ConfigurationError::Schema {
            error: e.to_string(),
        })
    }

    pub fn is_feature_enabled(&self, name: &str) -> bool {
        self.inner.read().flags.contains(name)
    }

    /// Turn a flag on and write `true` back to its section; unknown names are ignored
    pub fn enable_feature(&self, name: &str) -> bool {
        self.set_feature(name, true)
    }

    /// Turn a flag off and write `false` back to its section; unknown names are ignored
    pub fn disable_feature(&self, name: &str) -> bool {
        self.set_feature(name, false)
    }

    /// Flip a flag; returns the new state, or `None` for an unknown name
    pub fn toggle_feature(&self, name: &str) -> Option<bool> {
        flags::find(name)?;
        let enabled = !self.is_feature_enabled(name);
        self.set_feature(name, enabled);
        Some(enabled)
    }

    /// Enabled flags, in table order
    pub fn get_enabled_features(&self) -> Vec<String> {
        let inner = self.inner.read();
        FEATURE_FLAGS
            .iter()
            .filter(|flag| inner.flags.contains(flag.name))
            .map(|flag| flag.name.to_string())
            .collect()
    }

    /// Disabled flags, in table order
    pub fn get_disabled_features(&self) -> Vec<String> {
        let inner = self.inner.read();
        FEATURE_FLAGS
            .iter()
            .filter(|flag| !inner.flags.contains(flag.name))
            .map(|flag| flag.name.to_string())
            .collect()
    }

    /// Discard every change and restore the built-in defaults
    pub fn reset(&self) {
        *self.inner.write() = ConfigInner::new(default_tree());
        info!("Configuration reset to defaults");
    }

    /// Advisory validation; never fails
    pub fn validate(&self) -> ValidationReport {
        validate_tree(&self.inner.read().tree)
    }

    /// Whole tree for persistence
    pub fn export(&self) -> Value {
        self.get_all()
    }

    /// Restore an exported tree over the defaults
    pub fn import(&self, exported: Value) -> Result<()> {
        if !exported.is_object() {
            return Err(AccessifyError::invalid_argument(
                "configuration import expects a mapping",
            ));
        }
        let mut tree = default_tree();
        deep_merge(&mut tree, exported);
        *self.inner.write() = ConfigInner::new(tree);
        Ok(())
    }

    fn set_feature(&self, name: &str, enabled: bool) -> bool {
        let Some(flag) = flags::find(name) else {
            debug!(feature = %name, "Ignoring unknown feature flag");
            return false;
        };

        let mut inner = self.inner.write();
        set_path(&mut inner.tree, &flag.enabled_path(), Value::Bool(enabled));
        if enabled {
            inner.flags.insert(flag.name);
        } else {
            inner.flags.remove(flag.name);
        }
        debug!(feature = %name, enabled, "Feature flag set");
        true
    }
}

impl Default for ConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigurationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ConfigurationManager")
            .field("enabled_features", &inner.flags)
            .finish()
    }
}
