//! # Accessify Configuration System
//!
//! Hierarchical configuration for the toolkit: a typed schema with built-in
//! defaults, a manager exposing dotted-path access and feature flags, advisory
//! validation, and YAML/JSON overlay loading.
//!
//! ## Configuration Structure
//!
//! ```yaml
//! # accessify.yaml
//! language: en
//! direction: ltr
//! visual:
//!   textSize:
//!     enabled: true
//!     min: 0.8
//!     max: 2.0
//! plugins:
//!   builtIn: [textToSpeech, voiceCommands]
//! ```

pub mod error;
pub mod flags;
pub mod loader;
pub mod manager;
pub mod merge;
pub mod types;
pub mod validation;

pub use error::{ConfigResult, ConfigurationError};
pub use flags::{FeatureFlag, FEATURE_FLAGS};
pub use manager::{default_tree, ConfigurationManager};
pub use types::AccessifyConfig;
pub use validation::ValidationReport;
