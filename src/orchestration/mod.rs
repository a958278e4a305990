//! # Orchestration
//!
//! The toolkit root ([`Accessify`]), its builder, the feature-module contract
//! and the [`CoreContext`] handle bundle shared with modules and plugins.

pub mod accessify;
pub mod builder;
pub mod context;
pub mod module;

pub use accessify::{Accessify, LifecycleState};
pub use builder::AccessifyBuilder;
pub use context::CoreContext;
pub use module::{module_factory, FeatureModule, ModuleFactory};
