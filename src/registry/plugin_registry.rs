//! # Plugin Registry
//!
//! Registration and lifecycle management for optional toolkit plugins
//! (text-to-speech, voice commands, switch navigation, ...).
//!
//! ## Overview
//!
//! A plugin is registered under a name with a [`PluginFactory`] and a stored
//! configuration. Initialization builds an instance from the factory, hands it a
//! capability-scoped [`PluginApi`] and awaits its `init` hook. At most one
//! instance per name is ever active; destroying a plugin keeps its
//! registration, so it can be initialized again later.
//!
//! ```text
//! unregistered ──register──▶ registered ──init_plugin──▶ initializing ──▶ initialized
//!                                  ▲                                          │
//!                                  └──────── destroyed ◀──destroy_plugin──────┘
//! ```
//!
//! ## Failure Policy
//!
//! - Factory and `init` failures are recorded (kind `plugin`) and returned to
//!   the caller, who decides whether they are fatal
//! - `destroy` failures are recorded and swallowed so teardown always completes
//!
//! ## Usage
//!
//! ```rust
//! use accessify_core::registry::{plugin_factory, Plugin};
//! use accessify_core::Accessify;
//! use std::sync::Arc;
//!
//! struct Narrator;
//! impl Plugin for Narrator {}
//!
//! # async fn example() -> accessify_core::Result<()> {
//! let accessify = Accessify::builder().build()?;
//! let registry = accessify.plugins();
//!
//! registry.register(
//!     "narrator",
//!     plugin_factory(|_api, _config| Ok(Arc::new(Narrator) as Arc<dyn Plugin>)),
//!     None,
//! );
//! registry.init_plugin("narrator").await?;
//! assert!(registry.is_initialized("narrator"));
//! # Ok(())
//! # }
//! ```

use super::api::PluginApi;
use super::plugin::{Plugin, PluginFactory, PluginState, PluginStats};
use super::source::PluginSource;
use crate::config::merge::deep_merge;
use crate::constants::events;
use crate::error::{AccessifyError, Result};
use crate::error_handling::ErrorKind;
use crate::logging::log_plugin_operation;
use crate::orchestration::CoreContext;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

struct PluginEntry {
    /// Distinguishes successive registrations under the same name
    registration: u64,
    factory: PluginFactory,
    config: Value,
    state: PluginState,
    instance: Option<Arc<dyn Plugin>>,
    registered_at: DateTime<Utc>,
    initialized_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct PluginTable {
    entries: HashMap<String, PluginEntry>,
    /// Registration order
    order: Vec<String>,
    next_registration: u64,
}

/// Registry for managing plugins
pub struct PluginRegistry {
    plugins: RwLock<PluginTable>,
    context: CoreContext,
    source: RwLock<Option<Arc<dyn PluginSource>>>,
}

impl PluginRegistry {
    pub fn new(context: CoreContext) -> Self {
        Self {
            plugins: RwLock::new(PluginTable::default()),
            context,
            source: RwLock::new(None),
        }
    }

    /// Loader used by [`load_external_plugin`](Self::load_external_plugin)
    pub fn set_source(&self, source: Arc<dyn PluginSource>) {
        *self.source.write() = Some(source);
    }

    /// Register a plugin factory; an existing registration is never replaced
    ///
    /// Returns `false` when `name` was already registered.
    pub fn register(&self, name: &str, factory: PluginFactory, config: Option<Value>) -> bool {
        {
            let mut plugins = self.plugins.write();
            if plugins.entries.contains_key(name) {
                warn!(plugin = %name, "Plugin already registered; keeping existing registration");
                return false;
            }
            plugins.next_registration += 1;
            let registration = plugins.next_registration;
            plugins.entries.insert(
                name.to_string(),
                PluginEntry {
                    registration,
                    factory,
                    config: config.unwrap_or_else(|| Value::Object(Map::new())),
                    state: PluginState::Registered,
                    instance: None,
                    registered_at: Utc::now(),
                    initialized_at: None,
                },
            );
            plugins.order.push(name.to_string());
        }

        log_plugin_operation("register", name, "registered", None);
        self.context
            .events()
            .emit(events::PLUGIN_REGISTERED, &json!({ "name": name }));
        true
    }

    /// Destroy (if active) and forget a plugin; returns `false` if it was unknown
    ///
    /// A plugin whose `init` is still in flight is destroyed by that pending
    /// `init_plugin` call once its hook returns.
    pub async fn unregister(&self, name: &str) -> bool {
        if !self.is_registered(name) {
            return false;
        }
        self.destroy_plugin(name).await;

        let removed = {
            let mut plugins = self.plugins.write();
            plugins.order.retain(|registered| registered != name);
            plugins.entries.remove(name).is_some()
        };
        if removed {
            log_plugin_operation("unregister", name, "unregistered", None);
            self.context
                .events()
                .emit(events::PLUGIN_UNREGISTERED, &json!({ "name": name }));
        }
        removed
    }

    /// Initialize every registered plugin listed in `plugins.builtIn`, in list order
    ///
    /// Names that are not registered, and entries that are not strings, are
    /// skipped. The first failure stops the sequence and is returned.
    pub async fn init(&self) -> Result<()> {
        let enabled = self.built_in_plugins();

        for name in enabled {
            if self.is_registered(&name) {
                self.init_plugin(&name).await?;
            } else {
                debug!(plugin = %name, "Skipping built-in plugin that is not registered");
            }
        }
        Ok(())
    }

    /// Build, initialize and activate one plugin
    ///
    /// If the plugin is unregistered while its `init` hook is in flight, the
    /// fresh instance is destroyed instead of being activated and an error is
    /// returned; a registration made under the same name in the meantime is
    /// left untouched.
    pub async fn init_plugin(&self, name: &str) -> Result<()> {
        let (registration, factory, config, previous) = {
            let mut plugins = self.plugins.write();
            let entry = plugins
                .entries
                .get_mut(name)
                .ok_or_else(|| AccessifyError::not_found(format!("plugin '{name}'")))?;
            if entry.state.is_active() {
                warn!(plugin = %name, state = ?entry.state, "Plugin already initialized");
                return Ok(());
            }
            let previous = entry.state;
            entry.state = PluginState::Initializing;
            (
                entry.registration,
                entry.factory.clone(),
                entry.config.clone(),
                previous,
            )
        };

        let api = self.create_plugin_api(name);
        let instance = match factory(api, config) {
            Ok(instance) => instance,
            Err(err) => return Err(self.fail_init(name, registration, previous, err)),
        };
        if let Err(err) = instance.init().await {
            return Err(self.fail_init(name, registration, previous, err));
        }

        let activated = {
            let mut plugins = self.plugins.write();
            let current = match plugins.entries.get_mut(name) {
                Some(entry) if entry.registration == registration => {
                    entry.state = PluginState::Initialized;
                    entry.instance = Some(Arc::clone(&instance));
                    entry.initialized_at = Some(Utc::now());
                    true
                }
                _ => false,
            };
            current
        };

        if !activated {
            warn!(
                plugin = %name,
                "Plugin was unregistered while initializing; destroying orphaned instance"
            );
            if let Err(err) = instance.destroy().await {
                self.context.error_handler().handle(
                    &*err,
                    &format!("PluginRegistry.initPlugin({name})"),
                    ErrorKind::Plugin,
                );
            }
            log_plugin_operation("init", name, "abandoned", None);
            return Err(AccessifyError::plugin(name, "unregistered while initializing"));
        }

        log_plugin_operation("init", name, "initialized", None);
        self.context
            .events()
            .emit(events::PLUGIN_INITIALIZED, &json!({ "name": name }));
        Ok(())
    }

    /// Tear down one plugin; a no-op unless it is initialized
    pub async fn destroy_plugin(&self, name: &str) {
        let instance = {
            let mut plugins = self.plugins.write();
            let Some(entry) = plugins.entries.get_mut(name) else {
                return;
            };
            if entry.state != PluginState::Initialized {
                return;
            }
            entry.state = PluginState::Destroyed;
            entry.initialized_at = None;
            entry.instance.take()
        };

        if let Some(instance) = instance {
            if let Err(err) = instance.destroy().await {
                self.context.error_handler().handle(
                    &*err,
                    &format!("PluginRegistry.destroyPlugin({name})"),
                    ErrorKind::Plugin,
                );
            }
        }

        log_plugin_operation("destroy", name, "destroyed", None);
        self.context
            .events()
            .emit(events::PLUGIN_DESTROYED, &json!({ "name": name }));
    }

    /// Destroy every initialized plugin, in registration order
    pub async fn destroy(&self) {
        for name in self.initialized_plugins() {
            self.destroy_plugin(&name).await;
        }
    }

    /// Merge `partial` into a plugin's stored config and forward it to the live instance
    pub async fn update_plugin_config(&self, name: &str, partial: Value) -> Result<()> {
        if !partial.is_object() {
            return Err(AccessifyError::invalid_argument(
                "plugin configuration update expects a mapping",
            ));
        }

        let (merged, instance) = {
            let mut plugins = self.plugins.write();
            let entry = plugins
                .entries
                .get_mut(name)
                .ok_or_else(|| AccessifyError::not_found(format!("plugin '{name}'")))?;
            deep_merge(&mut entry.config, partial);
            let instance = match entry.state {
                PluginState::Initialized => entry.instance.clone(),
                _ => None,
            };
            (entry.config.clone(), instance)
        };

        if let Some(instance) = instance {
            if let Err(err) = instance.update_config(&merged) {
                self.context.error_handler().handle(
                    &*err,
                    &format!("PluginRegistry.updatePluginConfig({name})"),
                    ErrorKind::Plugin,
                );
                return Err(AccessifyError::plugin(name, format!("{err:#}")));
            }
        }

        self.context.events().emit(
            events::PLUGIN_CONFIG_UPDATED,
            &json!({ "name": name, "config": merged }),
        );
        Ok(())
    }

    /// Capability-scoped API for `name`
    pub fn create_plugin_api(&self, name: &str) -> PluginApi {
        PluginApi::new(name, self.context.clone())
    }

    /// Resolve a factory through the configured source, register it and initialize it
    pub async fn load_external_plugin(
        &self,
        reference: &str,
        name: &str,
        config: Option<Value>,
    ) -> Result<()> {
        let context = format!("PluginRegistry.loadExternalPlugin({reference})");
        let source = self.source.read().clone();
        let Some(source) = source else {
            self.context.error_handler().handle_message(
                "no plugin source configured",
                &context,
                ErrorKind::Plugin,
            );
            return Err(AccessifyError::plugin(name, "no plugin source configured"));
        };

        let factory = match source.resolve(reference).await {
            Ok(factory) => factory,
            Err(err) => {
                self.context
                    .error_handler()
                    .handle(&*err, &context, ErrorKind::Plugin);
                return Err(AccessifyError::plugin(name, format!("{err:#}")));
            }
        };

        self.register(name, factory, config);
        self.init_plugin(name).await
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.plugins.read().entries.contains_key(name)
    }

    pub fn is_initialized(&self, name: &str) -> bool {
        self.plugin_state(name) == Some(PluginState::Initialized)
    }

    pub fn plugin_state(&self, name: &str) -> Option<PluginState> {
        self.plugins.read().entries.get(name).map(|entry| entry.state)
    }

    /// Live instance of an initialized plugin
    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins
            .read()
            .entries
            .get(name)
            .and_then(|entry| entry.instance.clone())
    }

    pub fn plugin_config(&self, name: &str) -> Option<Value> {
        self.plugins
            .read()
            .entries
            .get(name)
            .map(|entry| entry.config.clone())
    }

    pub fn registered_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.plugins
            .read()
            .entries
            .get(name)
            .map(|entry| entry.registered_at)
    }

    pub fn initialized_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.plugins
            .read()
            .entries
            .get(name)
            .and_then(|entry| entry.initialized_at)
    }

    /// Registered names, in registration order
    pub fn registered_plugins(&self) -> Vec<String> {
        self.plugins.read().order.clone()
    }

    /// Initialized names, in registration order
    pub fn initialized_plugins(&self) -> Vec<String> {
        let plugins = self.plugins.read();
        plugins
            .order
            .iter()
            .filter(|name| {
                plugins
                    .entries
                    .get(name.as_str())
                    .is_some_and(|entry| entry.state == PluginState::Initialized)
            })
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> PluginStats {
        let plugins = self.plugins.read();
        let mut stats = PluginStats::default();

        for entry in plugins.entries.values() {
            stats.total_plugins += 1;
            match entry.state {
                PluginState::Registered => stats.registered_plugins += 1,
                PluginState::Initializing => stats.initializing_plugins += 1,
                PluginState::Initialized => stats.initialized_plugins += 1,
                PluginState::Destroyed => stats.destroyed_plugins += 1,
            }
        }

        stats
    }

    /// Names listed in `plugins.builtIn`, in list order
    fn built_in_plugins(&self) -> Vec<String> {
        let Some(listed) = self.context.config().get("plugins.builtIn") else {
            return Vec::new();
        };
        let Value::Array(entries) = &listed else {
            warn!(
                value = %listed,
                "Ignoring plugins.builtIn: expected a list of plugin names"
            );
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| match entry.as_str() {
                Some(name) => Some(name.to_string()),
                None => {
                    warn!(entry = %entry, "Skipping non-string entry in plugins.builtIn");
                    None
                }
            })
            .collect()
    }

    fn fail_init(
        &self,
        name: &str,
        registration: u64,
        previous: PluginState,
        err: anyhow::Error,
    ) -> AccessifyError {
        if let Some(entry) = self.plugins.write().entries.get_mut(name) {
            if entry.registration == registration {
                entry.state = previous;
            }
        }
        self.context.error_handler().handle(
            &*err,
            &format!("PluginRegistry.initPlugin({name})"),
            ErrorKind::Plugin,
        );
        log_plugin_operation("init", name, "failed", Some(&format!("{err:#}")));
        AccessifyError::plugin(name, format!("{err:#}"))
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.registered_plugins())
            .field("has_source", &self.source.read().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigurationManager;
    use crate::error_handling::ErrorHandler;
    use crate::events::EventBus;
    use crate::registry::{plugin_factory, StaticPluginSource};
    use crate::state::StateStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        inits: AtomicUsize,
        destroys: AtomicUsize,
    }

    #[async_trait]
    impl Plugin for Counting {
        async fn init(&self) -> anyhow::Result<()> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn destroy(&self) -> anyhow::Result<()> {
            self.destroys.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("speech engine already stopped")
        }
    }

    struct Broken;

    #[async_trait]
    impl Plugin for Broken {
        async fn init(&self) -> anyhow::Result<()> {
            anyhow::bail!("microphone permission denied")
        }
    }

    fn registry() -> PluginRegistry {
        PluginRegistry::new(CoreContext::new(
            Arc::new(EventBus::new()),
            Arc::new(StateStore::new()),
            Arc::new(ConfigurationManager::new()),
            Arc::new(ErrorHandler::default()),
        ))
    }

    fn counting_factory() -> PluginFactory {
        plugin_factory(|_api, _config| Ok(Arc::new(Counting::default()) as Arc<dyn Plugin>))
    }

    #[tokio::test]
    async fn test_plugin_lifecycle() {
        let registry = registry();
        assert!(registry.register("tts", counting_factory(), None));
        assert_eq!(registry.plugin_state("tts"), Some(PluginState::Registered));

        registry.init_plugin("tts").await.unwrap();
        assert!(registry.is_initialized("tts"));
        let first = registry.get_plugin("tts").unwrap();

        registry.init_plugin("tts").await.unwrap();
        assert!(Arc::ptr_eq(&first, &registry.get_plugin("tts").unwrap()));

        registry.destroy_plugin("tts").await;
        assert_eq!(registry.plugin_state("tts"), Some(PluginState::Destroyed));
        assert!(registry.get_plugin("tts").is_none());
        // The destroy hook failed; it is recorded, not propagated.
        assert_eq!(
            registry
                .context
                .error_handler()
                .get_errors_by_kind(ErrorKind::Plugin)
                .len(),
            1
        );

        registry.init_plugin("tts").await.unwrap();
        let second = registry.get_plugin("tts").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_init_failure_is_recorded_and_propagated() {
        let registry = registry();
        registry.register(
            "voice",
            plugin_factory(|_api, _config| Ok(Arc::new(Broken) as Arc<dyn Plugin>)),
            None,
        );

        let err = registry.init_plugin("voice").await.unwrap_err();
        assert!(matches!(err, AccessifyError::Plugin { ref name, .. } if name == "voice"));
        assert_eq!(registry.plugin_state("voice"), Some(PluginState::Registered));
        assert_eq!(registry.context.error_handler().error_count(), 1);
    }

    #[tokio::test]
    async fn test_stats_by_state() {
        let registry = registry();
        registry.register("a", counting_factory(), None);
        registry.register("b", counting_factory(), None);
        registry.init_plugin("a").await.unwrap();

        let stats = registry.stats();
        assert_eq!(stats.total_plugins, 2);
        assert_eq!(stats.initialized_plugins, 1);
        assert_eq!(stats.registered_plugins, 1);
    }

    #[tokio::test]
    async fn test_load_external_without_source_fails() {
        let registry = registry();
        let err = registry
            .load_external_plugin("https://cdn.example/tts.js", "tts", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessifyError::Plugin { .. }));
        assert!(!registry.is_registered("tts"));
    }

    #[tokio::test]
    async fn test_load_external_from_static_source() {
        let registry = registry();
        let source = StaticPluginSource::new();
        source.insert("pkg:switch-navigation", counting_factory());
        registry.set_source(Arc::new(source));

        registry
            .load_external_plugin("pkg:switch-navigation", "switch", Some(json!({ "scanRate": 2 })))
            .await
            .unwrap();

        assert!(registry.is_initialized("switch"));
        assert_eq!(registry.plugin_config("switch"), Some(json!({ "scanRate": 2 })));
    }
}
