//! # Accessify Orchestrator
//!
//! Root object of the toolkit. It owns the event bus, state store,
//! configuration manager, error handler and plugin registry, owns the feature
//! modules, sequences their startup and teardown, and re-exposes the bus and
//! store operations as its own public surface.
//!
//! ## Lifecycle
//!
//! 1. [`init`](Accessify::init) awaits each feature module's `init` in the order
//!    the modules were added; the first failure aborts startup and is returned
//! 2. The plugin registry then initializes the plugins listed in
//!    `plugins.builtIn`
//! 3. `initialized` is emitted
//!
//! A failed `init` leaves the instance in [`LifecycleState::Failed`]; calling
//! `init` again retries, skipping the modules that already started.
//!
//! [`destroy`](Accessify::destroy) tears plugins down first, then the
//! initialized modules in reverse order, emits `destroyed` and finally drops
//! every listener. Both calls are safe to repeat.
//!
//! ## Usage
//!
//! ```rust
//! use accessify_core::Accessify;
//! use serde_json::json;
//!
//! # async fn example() -> accessify_core::Result<()> {
//! let accessify = Accessify::builder()
//!     .config(json!({ "language": "fr" }))
//!     .build()?;
//!
//! accessify.init().await?;
//! accessify.set_config("visual.textSize.current", json!(1.5))?;
//! assert!(accessify.is_feature_enabled("textSizeAdjustment"));
//! accessify.destroy().await;
//! # Ok(())
//! # }
//! ```

use super::builder::AccessifyBuilder;
use super::context::CoreContext;
use super::module::FeatureModule;
use crate::config::{ConfigurationManager, ValidationReport};
use crate::constants::events;
use crate::error::{AccessifyError, Result};
use crate::error_handling::{ErrorHandler, ErrorKind};
use crate::events::{EventBus, Listener};
use crate::logging::log_module_operation;
use crate::registry::PluginRegistry;
use crate::state::{StateStore, StateSubscriber, Subscription};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Initializing,
    Initialized,
    /// A module or plugin failed during `init`
    Failed,
    Destroyed,
}

pub struct Accessify {
    context: CoreContext,
    plugins: Arc<PluginRegistry>,
    modules: Vec<(String, Arc<dyn FeatureModule>)>,
    /// Names of modules whose `init` completed, in init order
    initialized_modules: Mutex<Vec<String>>,
    lifecycle: Mutex<LifecycleState>,
}

impl Accessify {
    pub fn builder() -> AccessifyBuilder {
        AccessifyBuilder::new()
    }

    /// Instance with `options` over the default configuration and no modules
    pub fn new(options: Value) -> Result<Self> {
        Self::builder().config(options).build()
    }

    pub(crate) fn from_parts(
        context: CoreContext,
        plugins: Arc<PluginRegistry>,
        modules: Vec<(String, Arc<dyn FeatureModule>)>,
    ) -> Self {
        Self {
            context,
            plugins,
            modules,
            initialized_modules: Mutex::new(Vec::new()),
            lifecycle: Mutex::new(LifecycleState::Created),
        }
    }

    /// Start feature modules, then built-in plugins
    ///
    /// Retrying after a failure resumes with the modules that have not started.
    pub async fn init(&self) -> Result<()> {
        {
            let mut lifecycle = self.lifecycle.lock();
            match *lifecycle {
                LifecycleState::Created => {}
                LifecycleState::Failed => info!("Retrying Accessify initialization"),
                state => {
                    warn!(state = ?state, "Accessify already initialized");
                    return Ok(());
                }
            }
            *lifecycle = LifecycleState::Initializing;
        }

        for (name, module) in &self.modules {
            if self.initialized_modules.lock().contains(name) {
                continue;
            }
            if let Err(err) = module.init().await {
                self.context.error_handler().handle(
                    &*err,
                    &format!("Accessify.init({name})"),
                    ErrorKind::Initialization,
                );
                log_module_operation("init", name, "failed", Some(&format!("{err:#}")));
                *self.lifecycle.lock() = LifecycleState::Failed;
                return Err(AccessifyError::module(name, format!("{err:#}")));
            }
            self.initialized_modules.lock().push(name.clone());
            log_module_operation("init", name, "initialized", None);
            self.emit(events::MODULE_INITIALIZED, &json!({ "name": name }));
        }

        if let Err(err) = self.plugins.init().await {
            *self.lifecycle.lock() = LifecycleState::Failed;
            return Err(err);
        }

        *self.lifecycle.lock() = LifecycleState::Initialized;
        info!(
            modules = self.modules.len(),
            plugins = self.plugins.initialized_plugins().len(),
            "Accessify initialized"
        );
        self.emit(
            events::INITIALIZED,
            &json!({
                "modules": self.module_names(),
                "plugins": self.plugins.initialized_plugins(),
            }),
        );
        Ok(())
    }

    /// Tear down plugins, then modules in reverse init order
    pub async fn destroy(&self) {
        {
            let mut lifecycle = self.lifecycle.lock();
            if *lifecycle == LifecycleState::Destroyed {
                return;
            }
            *lifecycle = LifecycleState::Destroyed;
        }

        self.plugins.destroy().await;

        let initialized = std::mem::take(&mut *self.initialized_modules.lock());
        for name in initialized.iter().rev() {
            if let Some(module) = self.module(name) {
                module.destroy();
                log_module_operation("destroy", name, "destroyed", None);
                self.emit(events::MODULE_DESTROYED, &json!({ "name": name }));
            }
        }

        info!("Accessify destroyed");
        self.emit(events::DESTROYED, &Value::Null);
        self.context.events().remove_all_listeners(None);
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        *self.lifecycle.lock()
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle_state() == LifecycleState::Initialized
    }

    /// Named feature-module getter
    pub fn module(&self, name: &str) -> Option<Arc<dyn FeatureModule>> {
        self.modules
            .iter()
            .find(|(module, _)| module == name)
            .map(|(_, module)| Arc::clone(module))
    }

    /// Module names, in init order
    pub fn module_names(&self) -> Vec<String> {
        self.modules.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn context(&self) -> &CoreContext {
        &self.context
    }

    pub fn events(&self) -> &Arc<EventBus> {
        self.context.events()
    }

    pub fn state(&self) -> &Arc<StateStore> {
        self.context.state()
    }

    pub fn config(&self) -> &Arc<ConfigurationManager> {
        self.context.config()
    }

    pub fn error_handler(&self) -> &Arc<ErrorHandler> {
        self.context.error_handler()
    }

    pub fn plugins(&self) -> &Arc<PluginRegistry> {
        &self.plugins
    }

    // Event surface

    pub fn on(&self, event: &str, callback: Listener) -> &Self {
        self.events().on(event, callback);
        self
    }

    pub fn once(&self, event: &str, callback: Listener) -> &Self {
        self.events().once(event, callback);
        self
    }

    pub fn off(&self, event: &str, callback: &Listener) -> &Self {
        self.events().off(event, callback);
        self
    }

    pub fn emit(&self, event: &str, payload: &Value) {
        self.events().emit(event, payload);
    }

    pub fn remove_all_listeners(&self, event: Option<&str>) -> &Self {
        self.events().remove_all_listeners(event);
        self
    }

    // State surface

    pub fn get_state(&self) -> Value {
        self.state().get_state()
    }

    pub fn set_state(&self, partial: Value) -> Result<()> {
        self.state().set_state(partial)
    }

    pub fn subscribe(&self, key: &str, callback: StateSubscriber) -> Subscription {
        self.state().subscribe(key, callback)
    }

    // Configuration surface

    pub fn get_config(&self, path: &str) -> Option<Value> {
        self.config().get(path)
    }

    pub fn set_config(&self, path: &str, value: Value) -> Result<()> {
        self.context.set_config(path, value)
    }

    pub fn update_config(&self, partial: Value) -> Result<()> {
        self.context.update_config(partial)
    }

    pub fn is_feature_enabled(&self, name: &str) -> bool {
        self.config().is_feature_enabled(name)
    }

    pub fn enable_feature(&self, name: &str) -> bool {
        self.context.enable_feature(name)
    }

    pub fn disable_feature(&self, name: &str) -> bool {
        self.context.disable_feature(name)
    }

    pub fn toggle_feature(&self, name: &str) -> Option<bool> {
        self.context.toggle_feature(name)
    }

    pub fn reset_config(&self) {
        self.context.reset_config();
    }

    /// Advisory validation of the current configuration; never run implicitly
    pub fn validate_config(&self) -> ValidationReport {
        self.config().validate()
    }
}

impl std::fmt::Debug for Accessify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessify")
            .field("lifecycle", &self.lifecycle_state())
            .field("modules", &self.module_names())
            .field("plugins", &self.plugins)
            .finish()
    }
}
