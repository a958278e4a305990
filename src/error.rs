//! Error types for the Accessify core.

use crate::config::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessifyError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Plugin '{name}' failed: {reason}")]
    Plugin {
        name: String,
        reason: String,
    },
    #[error("Feature module '{name}' failed: {reason}")]
    Module {
        name: String,
        reason: String,
    },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AccessifyError {
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Self::NotFound(what.into())
    }

    pub fn plugin<N: Into<String>, R: std::fmt::Display>(name: N, reason: R) -> Self {
        Self::Plugin {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn module<N: Into<String>, R: std::fmt::Display>(name: N, reason: R) -> Self {
        Self::Module {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for AccessifyError {
    fn from(error: serde_json::Error) -> Self {
        AccessifyError::Serialization(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AccessifyError>;
