use accessify_core::events::{listener, EventBus};
use accessify_core::orchestration::{module_factory, CoreContext, FeatureModule, ModuleFactory};
use accessify_core::registry::{plugin_factory, Plugin, PluginApi, PluginFactory};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Ordered record of lifecycle calls shared between fixtures
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Captures every payload emitted for the given events
pub fn record_events(bus: &EventBus, names: &[&str]) -> Arc<Mutex<Vec<(String, Value)>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for name in names {
        let sink = Arc::clone(&seen);
        let event = name.to_string();
        bus.on(
            name,
            listener(move |payload| {
                sink.lock().push((event.clone(), payload.clone()));
                Ok(())
            }),
        );
    }
    seen
}

/// Plugin that journals its hooks and keeps its API around
pub struct RecordingPlugin {
    pub name: String,
    pub journal: Journal,
    pub api: PluginApi,
    pub config: Mutex<Value>,
    pub fail_init: bool,
    pub fail_destroy: bool,
}

#[async_trait]
impl Plugin for RecordingPlugin {
    async fn init(&self) -> anyhow::Result<()> {
        self.journal.push(format!("plugin:{}:init", self.name));
        if self.fail_init {
            anyhow::bail!("{} could not start", self.name);
        }
        Ok(())
    }

    async fn destroy(&self) -> anyhow::Result<()> {
        self.journal.push(format!("plugin:{}:destroy", self.name));
        if self.fail_destroy {
            anyhow::bail!("{} could not stop", self.name);
        }
        Ok(())
    }

    fn update_config(&self, config: &Value) -> anyhow::Result<()> {
        self.journal.push(format!("plugin:{}:update_config", self.name));
        *self.config.lock() = config.clone();
        Ok(())
    }
}

/// Factory building [`RecordingPlugin`]s; `builds` counts factory calls
pub fn recording_plugin(
    name: &str,
    journal: &Journal,
    builds: &Arc<AtomicUsize>,
    fail_init: bool,
) -> PluginFactory {
    let name = name.to_string();
    let journal = journal.clone();
    let builds = Arc::clone(builds);
    plugin_factory(move |api, config| {
        builds.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(RecordingPlugin {
            name: name.clone(),
            journal: journal.clone(),
            api,
            config: Mutex::new(config),
            fail_init,
            fail_destroy: false,
        }) as Arc<dyn Plugin>)
    })
}

/// Plugin whose destroy hook always fails
pub fn failing_destroy_plugin(name: &str, journal: &Journal) -> PluginFactory {
    let name = name.to_string();
    let journal = journal.clone();
    plugin_factory(move |api, config| {
        Ok(Arc::new(RecordingPlugin {
            name: name.clone(),
            journal: journal.clone(),
            api,
            config: Mutex::new(config),
            fail_init: false,
            fail_destroy: true,
        }) as Arc<dyn Plugin>)
    })
}

/// Feature module that journals its hooks
pub struct RecordingModule {
    pub name: String,
    pub journal: Journal,
    pub context: CoreContext,
    pub fail_init: bool,
}

#[async_trait]
impl FeatureModule for RecordingModule {
    async fn init(&self) -> anyhow::Result<()> {
        self.journal.push(format!("module:{}:init", self.name));
        if self.fail_init {
            anyhow::bail!("{} could not attach", self.name);
        }
        Ok(())
    }

    fn destroy(&self) {
        self.journal.push(format!("module:{}:destroy", self.name));
    }
}

pub fn recording_module(name: &str, journal: &Journal, fail_init: bool) -> ModuleFactory {
    let name = name.to_string();
    let journal = journal.clone();
    module_factory(move |context| {
        Ok(Arc::new(RecordingModule {
            name,
            journal,
            context,
            fail_init,
        }) as Arc<dyn FeatureModule>)
    })
}
