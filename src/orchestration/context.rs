//! Shared handles to the core components.
//!
//! [`CoreContext`] is what feature modules and plugin APIs hold instead of the
//! orchestrator itself. Configuration writes made through it announce
//! themselves on the event bus, so every caller (host, module or plugin) sees
//! the same `configChanged`/`configUpdated`/`featureToggled`/`configReset`
//! events.

use crate::config::ConfigurationManager;
use crate::constants::events;
use crate::error::Result;
use crate::error_handling::ErrorHandler;
use crate::events::EventBus;
use crate::state::StateStore;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CoreContext {
    events: Arc<EventBus>,
    state: Arc<StateStore>,
    config: Arc<ConfigurationManager>,
    error_handler: Arc<ErrorHandler>,
}

impl CoreContext {
    pub fn new(
        events: Arc<EventBus>,
        state: Arc<StateStore>,
        config: Arc<ConfigurationManager>,
        error_handler: Arc<ErrorHandler>,
    ) -> Self {
        Self {
            events,
            state,
            config,
            error_handler,
        }
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn state(&self) -> &Arc<StateStore> {
        &self.state
    }

    pub fn config(&self) -> &Arc<ConfigurationManager> {
        &self.config
    }

    pub fn error_handler(&self) -> &Arc<ErrorHandler> {
        &self.error_handler
    }

    /// Dotted-path write that emits `configChanged { path, value, oldValue }`
    pub fn set_config(&self, path: &str, value: Value) -> Result<()> {
        let old_value = self.config.get(path).unwrap_or(Value::Null);
        self.config.set(path, value.clone())?;
        self.events.emit(
            events::CONFIG_CHANGED,
            &json!({ "path": path, "value": value, "oldValue": old_value }),
        );
        Ok(())
    }

    /// Deep-merge update that emits `configUpdated` with the partial
    pub fn update_config(&self, partial: Value) -> Result<()> {
        self.config.update(partial.clone())?;
        self.events.emit(events::CONFIG_UPDATED, &partial);
        Ok(())
    }

    pub fn enable_feature(&self, name: &str) -> bool {
        let known = self.config.enable_feature(name);
        if known {
            self.announce_feature(name, true);
        }
        known
    }

    pub fn disable_feature(&self, name: &str) -> bool {
        let known = self.config.disable_feature(name);
        if known {
            self.announce_feature(name, false);
        }
        known
    }

    pub fn toggle_feature(&self, name: &str) -> Option<bool> {
        let enabled = self.config.toggle_feature(name)?;
        self.announce_feature(name, enabled);
        Some(enabled)
    }

    /// Restore default configuration and emit `configReset` with the new tree
    pub fn reset_config(&self) {
        self.config.reset();
        self.events
            .emit(events::CONFIG_RESET, &self.config.get_all());
    }

    fn announce_feature(&self, name: &str, enabled: bool) {
        self.events.emit(
            events::FEATURE_TOGGLED,
            &json!({ "feature": name, "enabled": enabled }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::listener;
    use parking_lot::Mutex;

    fn context() -> CoreContext {
        CoreContext::new(
            Arc::new(EventBus::new()),
            Arc::new(StateStore::new()),
            Arc::new(ConfigurationManager::new()),
            Arc::new(ErrorHandler::default()),
        )
    }

    fn record(ctx: &CoreContext, event: &str) -> Arc<Mutex<Vec<Value>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        ctx.events().on(
            event,
            listener(move |payload| {
                sink.lock().push(payload.clone());
                Ok(())
            }),
        );
        seen
    }

    #[test]
    fn test_set_config_announces_old_and_new_value() {
        let ctx = context();
        let seen = record(&ctx, events::CONFIG_CHANGED);

        ctx.set_config("motor.targets.minSize", json!(48)).unwrap();

        assert_eq!(
            seen.lock().as_slice(),
            &[json!({ "path": "motor.targets.minSize", "value": 48, "oldValue": 44 })]
        );
    }

    #[test]
    fn test_unknown_feature_is_silent() {
        let ctx = context();
        let seen = record(&ctx, events::FEATURE_TOGGLED);

        assert!(!ctx.enable_feature("teleportation"));
        assert_eq!(ctx.toggle_feature("teleportation"), None);
        assert!(seen.lock().is_empty());

        assert_eq!(ctx.toggle_feature("dyslexiaFont"), Some(true));
        assert_eq!(
            seen.lock().as_slice(),
            &[json!({ "feature": "dyslexiaFont", "enabled": true })]
        );
    }

    #[test]
    fn test_reset_emits_default_tree() {
        let ctx = context();
        ctx.set_config("language", json!("fr")).unwrap();
        let seen = record(&ctx, events::CONFIG_RESET);

        ctx.reset_config();

        assert_eq!(seen.lock()[0]["language"], json!("en"));
    }
}
