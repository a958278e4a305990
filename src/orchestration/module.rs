//! Feature-module contract.
//!
//! Feature modules (visual, navigation, reading, motor, ...) are built once by
//! the orchestrator from a [`ModuleFactory`] that receives the shared
//! [`CoreContext`]. `init` is awaited during startup and its failure aborts
//! startup; `destroy` must be idempotent and must not fail.

use super::context::CoreContext;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait FeatureModule: Send + Sync {
    async fn init(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn destroy(&self) {}
}

/// Builds a feature module against the core handles
pub type ModuleFactory =
    Box<dyn FnOnce(CoreContext) -> anyhow::Result<Arc<dyn FeatureModule>> + Send>;

/// Wrap a closure as a [`ModuleFactory`]
pub fn module_factory<F>(f: F) -> ModuleFactory
where
    F: FnOnce(CoreContext) -> anyhow::Result<Arc<dyn FeatureModule>> + Send + 'static,
{
    Box::new(f)
}
