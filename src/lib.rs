#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Accessify Core
//!
//! Runtime kernel of the Accessify web accessibility toolkit.
//!
//! ## Overview
//!
//! Every feature module (visual, navigation, reading, motor, multilingual,
//! ARIA, ...) and every optional plugin (text-to-speech, voice commands,
//! switch navigation) is built on the same substrate: an event bus, a
//! change-tracked state store, a hierarchical configuration manager with
//! feature flags, a plugin registry with lifecycle management and a
//! classifying error handler. This crate is that substrate, plus the
//! [`Accessify`] orchestrator that owns and sequences it.
//!
//! ## Module Organization
//!
//! - [`events`] - Synchronous publish/subscribe bus
//! - [`state`] - Change-tracked store with undo history and selectors
//! - [`config`] - Typed configuration, dotted-path access and feature flags
//! - [`error_handling`] - Error classification, records and reports
//! - [`registry`] - Plugin contract, registry and capability-scoped API
//! - [`orchestration`] - The orchestrator, its builder and feature modules
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use accessify_core::events::listener;
//! use accessify_core::Accessify;
//! use serde_json::json;
//!
//! # async fn example() -> accessify_core::Result<()> {
//! accessify_core::logging::init_structured_logging();
//!
//! let accessify = Accessify::new(json!({ "language": "de" }))?;
//! accessify.on("featureToggled", listener(|payload| {
//!     println!("feature toggled: {payload}");
//!     Ok(())
//! }));
//!
//! accessify.init().await?;
//! accessify.toggle_feature("readingGuide");
//! accessify.set_state(json!({ "activePanel": "reading" }))?;
//! accessify.destroy().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod error_handling;
pub mod events;
pub mod logging;
pub mod orchestration;
pub mod registry;
pub mod state;

pub use config::{AccessifyConfig, ConfigurationError, ConfigurationManager, ValidationReport};
pub use error::{AccessifyError, Result};
pub use error_handling::{ErrorHandler, ErrorHandlerConfig, ErrorKind, ErrorRecord, Severity};
pub use events::{listener, EventBus, Listener};
pub use orchestration::{
    module_factory, Accessify, AccessifyBuilder, CoreContext, FeatureModule, LifecycleState,
};
pub use registry::{plugin_factory, Plugin, PluginApi, PluginRegistry, PluginState};
pub use state::{subscriber, StateChange, StateStore};
