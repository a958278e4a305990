//! Configuration Error Types
//!
//! Errors raised while loading configuration overlays or reading the live
//! tree back into the typed schema.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// File I/O errors during configuration loading
    #[error("Failed to read configuration file '{file_path}': {error}")]
    FileReadError {
        file_path: String,
        error: String,
    },

    /// Invalid YAML syntax in configuration file
    #[error("Invalid YAML in configuration file '{file_path}': {error}")]
    InvalidYaml {
        file_path: String,
        error: String,
    },

    /// Invalid JSON syntax in configuration file
    #[error("Invalid JSON in configuration file '{file_path}': {error}")]
    InvalidJson {
        file_path: String,
        error: String,
    },

    #[error("Unsupported configuration format for '{file_path}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat {
        file_path: String,
    },

    /// Overlay whose root is not a mapping
    #[error("Configuration overlay from {context} must be a mapping")]
    InvalidOverlay {
        context: String,
    },

    /// Malformed dotted path
    #[error("Invalid configuration path '{path}'")]
    InvalidPath {
        path: String,
    },

    /// Live tree no longer matches the typed schema
    #[error("Configuration does not match the schema: {error}")]
    Schema {
        error: String,
    },
}

impl ConfigurationError {
    pub fn file_read_error<P: Into<String>, E: std::fmt::Display>(file_path: P, error: E) -> Self {
        Self::FileReadError {
            file_path: file_path.into(),
            error: error.to_string(),
        }
    }

    pub fn invalid_yaml<P: Into<String>, E: std::fmt::Display>(file_path: P, error: E) -> Self {
        Self::InvalidYaml {
            file_path: file_path.into(),
            error: error.to_string(),
        }
    }

    pub fn invalid_json<P: Into<String>, E: std::fmt::Display>(file_path: P, error: E) -> Self {
        Self::InvalidJson {
            file_path: file_path.into(),
            error: error.to_string(),
        }
    }

    pub fn invalid_overlay<C: Into<String>>(context: C) -> Self {
        Self::InvalidOverlay {
            context: context.into(),
        }
    }

    pub fn invalid_path<P: Into<String>>(path: P) -> Self {
        Self::InvalidPath { path: path.into() }
    }
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;
