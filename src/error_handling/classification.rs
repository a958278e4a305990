//! Error kinds and their static severity/recoverability table.

use serde::{Deserialize, Serialize};

/// Where an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Initialization,
    Runtime,
    Configuration,
    Plugin,
    Component,
    Network,
    Permission,
    Compatibility,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::Initialization,
        ErrorKind::Runtime,
        ErrorKind::Configuration,
        ErrorKind::Plugin,
        ErrorKind::Component,
        ErrorKind::Network,
        ErrorKind::Permission,
        ErrorKind::Compatibility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Initialization => "initialization",
            ErrorKind::Runtime => "runtime",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Plugin => "plugin",
            ErrorKind::Component => "component",
            ErrorKind::Network => "network",
            ErrorKind::Permission => "permission",
            ErrorKind::Compatibility => "compatibility",
        }
    }

    /// Severity derived from the kind
    pub fn severity(&self) -> Severity {
        match self {
            ErrorKind::Initialization | ErrorKind::Permission | ErrorKind::Compatibility => {
                Severity::High
            }
            ErrorKind::Runtime
            | ErrorKind::Configuration
            | ErrorKind::Plugin
            | ErrorKind::Component
            | ErrorKind::Network => Severity::Medium,
        }
    }

    /// Whether the toolkit can keep running after an error of this kind
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Network | ErrorKind::Plugin | ErrorKind::Component
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
