//! Construction of an [`Accessify`] instance.

use super::accessify::Accessify;
use super::context::CoreContext;
use super::module::{FeatureModule, ModuleFactory};
use crate::config::ConfigurationManager;
use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::error::{AccessifyError, Result};
use crate::error_handling::{ErrorHandler, ErrorHandlerConfig};
use crate::events::{EventBus, EventEmitter};
use crate::registry::{PluginFactory, PluginRegistry, PluginSource};
use crate::state::StateStore;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use tracing::info;

/// Collects options, feature modules and plugins for [`Accessify`]
pub struct AccessifyBuilder {
    overrides: Option<Value>,
    config_file: Option<PathBuf>,
    error_config: ErrorHandlerConfig,
    history_limit: usize,
    modules: Vec<(String, ModuleFactory)>,
    plugins: Vec<(String, PluginFactory, Option<Value>)>,
    plugin_source: Option<Arc<dyn PluginSource>>,
}

impl AccessifyBuilder {
    pub fn new() -> Self {
        Self {
            overrides: None,
            config_file: None,
            error_config: ErrorHandlerConfig::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            modules: Vec::new(),
            plugins: Vec::new(),
            plugin_source: None,
        }
    }

    /// Options deep-merged over the defaults (and over the file, if any)
    pub fn config(mut self, overrides: Value) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// YAML/JSON overlay file applied before [`config`](Self::config)
    pub fn config_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn error_handler_config(mut self, config: ErrorHandlerConfig) -> Self {
        self.error_config = config;
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Add a feature module; modules initialize in the order they are added
    pub fn module(mut self, name: &str, factory: ModuleFactory) -> Self {
        self.modules.push((name.to_string(), factory));
        self
    }

    pub fn plugin(mut self, name: &str, factory: PluginFactory, config: Option<Value>) -> Self {
        self.plugins.push((name.to_string(), factory, config));
        self
    }

    pub fn plugin_source(mut self, source: Arc<dyn PluginSource>) -> Self {
        self.plugin_source = Some(source);
        self
    }

    pub fn build(self) -> Result<Accessify> {
        let config = match &self.config_file {
            Some(path) => ConfigurationManager::from_file(path)?,
            None => ConfigurationManager::new(),
        };
        if let Some(overrides) = self.overrides {
            config.update(overrides)?;
        }

        let events = Arc::new(EventBus::new());
        let emitter: Weak<dyn EventEmitter> = Arc::downgrade(&events) as Weak<dyn EventEmitter>;
        let error_handler = Arc::new(ErrorHandler::with_emitter(self.error_config, emitter));
        events.attach_error_handler(Arc::clone(&error_handler));

        let context = CoreContext::new(
            events,
            Arc::new(StateStore::with_history_limit(self.history_limit)),
            Arc::new(config),
            error_handler,
        );

        let plugins = Arc::new(PluginRegistry::new(context.clone()));
        if let Some(source) = self.plugin_source {
            plugins.set_source(source);
        }
        for (name, factory, config) in self.plugins {
            plugins.register(&name, factory, config);
        }

        let mut modules: Vec<(String, Arc<dyn FeatureModule>)> =
            Vec::with_capacity(self.modules.len());
        for (name, factory) in self.modules {
            if modules.iter().any(|(existing, _)| *existing == name) {
                return Err(AccessifyError::invalid_argument(format!(
                    "feature module '{name}' added twice"
                )));
            }
            let module = factory(context.clone())
                .map_err(|err| AccessifyError::module(&name, format!("{err:#}")))?;
            modules.push((name, module));
        }

        info!(
            modules = modules.len(),
            plugins = plugins.registered_plugins().len(),
            "Accessify instance built"
        );
        Ok(Accessify::from_parts(context, plugins, modules))
    }
}

impl Default for AccessifyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
