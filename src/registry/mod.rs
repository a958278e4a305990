//! # Plugin Infrastructure
//!
//! ```text
//! Plugin Infrastructure
//! ├── Plugin / PluginFactory   (plugin contract)
//! ├── PluginRegistry           (registration and lifecycle)
//! ├── PluginApi / PluginLogger (what a plugin is allowed to touch)
//! └── PluginSource             (resolution of external plugin references)
//! ```

pub mod api;
pub mod plugin;
pub mod plugin_registry;
pub mod source;

pub use api::{PluginApi, PluginLogger};
pub use plugin::{plugin_factory, Plugin, PluginFactory, PluginState, PluginStats};
pub use plugin_registry::PluginRegistry;
pub use source::{PluginSource, StaticPluginSource};
