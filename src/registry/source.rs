//! Pluggable resolution of external plugin references.
//!
//! [`PluginRegistry::load_external_plugin`](super::PluginRegistry::load_external_plugin)
//! asks a [`PluginSource`] to turn a reference (module URL, package id, ...)
//! into a factory. Hosts supply whatever loading mechanism their platform has;
//! [`StaticPluginSource`] serves factories from an in-memory table.

use super::plugin::PluginFactory;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[async_trait]
pub trait PluginSource: Send + Sync {
    async fn resolve(&self, reference: &str) -> anyhow::Result<PluginFactory>;
}

/// Reference → factory table
#[derive(Default)]
pub struct StaticPluginSource {
    factories: RwLock<HashMap<String, PluginFactory>>,
}

impl StaticPluginSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, reference: &str, factory: PluginFactory) -> &Self {
        self.factories.write().insert(reference.to_string(), factory);
        self
    }

    pub fn references(&self) -> Vec<String> {
        let mut references: Vec<String> = self.factories.read().keys().cloned().collect();
        references.sort();
        references
    }
}

#[async_trait]
impl PluginSource for StaticPluginSource {
    async fn resolve(&self, reference: &str) -> anyhow::Result<PluginFactory> {
        self.factories
            .read()
            .get(reference)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no plugin published at '{reference}'"))
    }
}

impl std::fmt::Debug for StaticPluginSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticPluginSource")
            .field("references", &self.references())
            .finish()
    }
}
