//! Plugin contract and factory type.

use super::api::PluginApi;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// A live plugin instance
///
/// Every hook is optional. `init` and `destroy` are awaited by the registry;
/// `update_config` receives the merged configuration whenever
/// [`PluginRegistry::update_plugin_config`](super::PluginRegistry::update_plugin_config)
/// is called on an initialized plugin.
#[async_trait]
pub trait Plugin: Send + Sync {
    async fn init(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn destroy(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn update_config(&self, _config: &Value) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Builds a plugin instance from its scoped API and stored configuration
pub type PluginFactory =
    Arc<dyn Fn(PluginApi, Value) -> anyhow::Result<Arc<dyn Plugin>> + Send + Sync>;

/// Wrap a closure as a [`PluginFactory`]
pub fn plugin_factory<F>(f: F) -> PluginFactory
where
    F: Fn(PluginApi, Value) -> anyhow::Result<Arc<dyn Plugin>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Plugin lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    Registered,
    /// Factory or `init` hook in flight
    Initializing,
    Initialized,
    /// Torn down; can be initialized again from the retained factory
    Destroyed,
}

impl PluginState {
    pub fn is_active(&self) -> bool {
        matches!(self, PluginState::Initializing | PluginState::Initialized)
    }
}

/// Statistics about registered plugins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginStats {
    pub total_plugins: usize,
    pub registered_plugins: usize,
    pub initializing_plugins: usize,
    pub initialized_plugins: usize,
    pub destroyed_plugins: usize,
}
