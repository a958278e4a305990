//! Structured error records and reports.

use super::classification::{ErrorKind, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One handled error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: ErrorKind,
    pub context: String,
    pub message: String,
    /// Source chain or debug rendering of the error
    pub stack: Option<String>,
    pub user_agent: Option<String>,
    pub url: Option<String>,
    pub severity: Severity,
    pub recoverable: bool,
}

/// Summary produced by [`ErrorHandler::create_error_report`](super::ErrorHandler::create_error_report)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub generated_at: DateTime<Utc>,
    pub total_errors: usize,
    pub critical_errors: usize,
    pub by_kind: BTreeMap<ErrorKind, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub recent_errors: Vec<ErrorRecord>,
    pub user_agent: Option<String>,
    pub url: Option<String>,
}
