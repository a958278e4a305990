//! Capability-scoped API handed to plugins.
//!
//! A plugin only sees events, state and configuration through [`PluginApi`];
//! it never receives the registry, other plugins or the orchestrator.

use crate::error::Result;
use crate::events::Listener;
use crate::orchestration::CoreContext;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct PluginApi {
    plugin: String,
    context: CoreContext,
    logger: PluginLogger,
}

impl PluginApi {
    pub(crate) fn new(plugin: &str, context: CoreContext) -> Self {
        Self {
            plugin: plugin.to_string(),
            context,
            logger: PluginLogger::new(plugin),
        }
    }

    /// Name the API was created for
    pub fn plugin_name(&self) -> &str {
        &self.plugin
    }

    pub fn on(&self, event: &str, callback: Listener) -> &Self {
        self.context.events().on(event, callback);
        self
    }

    pub fn off(&self, event: &str, callback: &Listener) -> &Self {
        self.context.events().off(event, callback);
        self
    }

    pub fn emit(&self, event: &str, payload: &Value) {
        self.context.events().emit(event, payload);
    }

    /// Snapshot of the shared state store
    pub fn get_state(&self) -> Value {
        self.context.state().get_state()
    }

    /// Bulk update of the shared state store
    pub fn set_state(&self, partial: Value) -> Result<()> {
        self.context.state().set_state(partial)
    }

    pub fn get_config(&self, path: &str) -> Option<Value> {
        self.context.config().get(path)
    }

    pub fn set_config(&self, path: &str, value: Value) -> Result<()> {
        self.context.set_config(path, value)
    }

    pub fn logger(&self) -> &PluginLogger {
        &self.logger
    }
}

/// Logger that tags every line with the plugin name
#[derive(Debug, Clone)]
pub struct PluginLogger {
    plugin: String,
}

impl PluginLogger {
    pub fn new(plugin: &str) -> Self {
        Self {
            plugin: plugin.to_string(),
        }
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(plugin = %self.plugin, "{message}");
    }

    pub fn info(&self, message: &str) {
        tracing::info!(plugin = %self.plugin, "{message}");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(plugin = %self.plugin, "{message}");
    }

    pub fn error(&self, message: &str) {
        tracing::error!(plugin = %self.plugin, "{message}");
    }
}
