//! # Error Handler
//!
//! Classifies, records and reports errors raised anywhere in the toolkit.
//!
//! ## Overview
//!
//! [`ErrorHandler::handle`] turns an error into an [`ErrorRecord`] (id,
//! timestamp, kind, context, message, source chain, host environment, derived
//! severity and recoverability), keeps it in a bounded FIFO, logs it at a level
//! matching its severity and re-emits it as an `"error"` event when an emitter
//! is attached. Handling never fails.
//!
//! ## Propagation Policy
//!
//! Wrapped functions ([`ErrorHandler::wrap_function`],
//! [`ErrorHandler::wrap_async_function`]) record the failure and then return
//! the original error unchanged: telemetry is added, control flow is not
//! altered.
//!
//! ## Usage
//!
//! ```rust
//! use accessify_core::error_handling::{ErrorHandler, ErrorHandlerConfig, ErrorKind};
//! use std::sync::Arc;
//!
//! let handler = Arc::new(ErrorHandler::new(ErrorHandlerConfig::default()));
//! let parse = handler.wrap_function(
//!     |input: &str| input.parse::<u32>(),
//!     "settings.parse",
//!     ErrorKind::Configuration,
//! );
//!
//! assert!(parse("12").is_ok());
//! assert!(parse("twelve").is_err());
//! assert_eq!(handler.error_count(), 1);
//! ```

use super::boundary::ErrorBoundary;
use super::classification::{ErrorKind, Severity};
use super::record::{ErrorRecord, ErrorReport};
use crate::constants::{events, DEFAULT_MAX_ERRORS, ERROR_REPORT_RECENT};
use crate::events::EventEmitter;
use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Weak};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Host-environment details and bounds for the error handler
#[derive(Debug, Clone)]
pub struct ErrorHandlerConfig {
    /// Records kept before the oldest is evicted
    pub max_errors: usize,
    pub user_agent: Option<String>,
    pub url: Option<String>,
}

impl Default for ErrorHandlerConfig {
    fn default() -> Self {
        Self {
            max_errors: DEFAULT_MAX_ERRORS,
            user_agent: None,
            url: None,
        }
    }
}

/// Classifying error recorder
pub struct ErrorHandler {
    config: ErrorHandlerConfig,
    errors: RwLock<VecDeque<ErrorRecord>>,
    emitter: Option<Weak<dyn EventEmitter>>,
}

impl ErrorHandler {
    pub fn new(config: ErrorHandlerConfig) -> Self {
        Self {
            config,
            errors: RwLock::new(VecDeque::new()),
            emitter: None,
        }
    }

    /// Handler that re-emits each record as an `"error"` event on `emitter`
    /// while the emitter is alive
    pub fn with_emitter(config: ErrorHandlerConfig, emitter: Weak<dyn EventEmitter>) -> Self {
        Self {
            emitter: Some(emitter),
            ..Self::new(config)
        }
    }

    /// Record `error`, including its source chain
    pub fn handle(
        &self,
        error: &(dyn std::error::Error + 'static),
        context: &str,
        kind: ErrorKind,
    ) -> ErrorRecord {
        self.record(error.to_string(), source_chain(error), context, kind)
    }

    /// Record a failure that only has a message
    pub fn handle_message<M: Into<String>>(
        &self,
        message: M,
        context: &str,
        kind: ErrorKind,
    ) -> ErrorRecord {
        self.record(message.into(), None, context, kind)
    }

    /// Wrap `f` so failures are recorded and then returned unchanged
    pub fn wrap_function<A, T, E, F>(
        self: &Arc<Self>,
        f: F,
        context: &str,
        kind: ErrorKind,
    ) -> impl Fn(A) -> Result<T, E>
    where
        F: Fn(A) -> Result<T, E>,
        E: std::fmt::Display + std::fmt::Debug,
    {
        let handler = Arc::clone(self);
        let context = context.to_string();
        move |args| {
            f(args).map_err(|err| {
                handler.record_display(&err, &context, kind);
                err
            })
        }
    }

    /// Async counterpart of [`wrap_function`](Self::wrap_function)
    pub fn wrap_async_function<A, T, E, F, Fut>(
        self: &Arc<Self>,
        f: F,
        context: &str,
        kind: ErrorKind,
    ) -> impl Fn(A) -> BoxFuture<'static, Result<T, E>>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: std::fmt::Display + std::fmt::Debug + Send + 'static,
    {
        let handler = Arc::clone(self);
        let context = context.to_string();
        move |args| {
            let handler = Arc::clone(&handler);
            let context = context.clone();
            f(args)
                .map(move |result| {
                    result.map_err(|err| {
                        handler.record_display(&err, &context, kind);
                        err
                    })
                })
                .boxed()
        }
    }

    /// Bundle of `catch`/`wrap`/`wrap_async` bound to kind `component`
    pub fn create_error_boundary(self: &Arc<Self>, component: &str) -> ErrorBoundary {
        ErrorBoundary::new(Arc::clone(self), component)
    }

    /// Every retained record, oldest first
    pub fn get_errors(&self) -> Vec<ErrorRecord> {
        self.errors.read().iter().cloned().collect()
    }

    pub fn get_errors_by_kind(&self, kind: ErrorKind) -> Vec<ErrorRecord> {
        self.errors
            .read()
            .iter()
            .filter(|record| record.kind == kind)
            .cloned()
            .collect()
    }

    pub fn get_errors_by_severity(&self, severity: Severity) -> Vec<ErrorRecord> {
        self.errors
            .read()
            .iter()
            .filter(|record| record.severity == severity)
            .cloned()
            .collect()
    }

    /// The `count` most recent records, oldest first
    pub fn get_recent_errors(&self, count: usize) -> Vec<ErrorRecord> {
        let errors = self.errors.read();
        let skip = errors.len().saturating_sub(count);
        errors.iter().skip(skip).cloned().collect()
    }

    pub fn has_critical_errors(&self) -> bool {
        self.errors
            .read()
            .iter()
            .any(|record| record.severity == Severity::High)
    }

    pub fn error_count(&self) -> usize {
        self.errors.read().len()
    }

    pub fn clear_errors(&self) {
        self.errors.write().clear();
    }

    pub fn create_error_report(&self) -> ErrorReport {
        let errors = self.errors.read();
        let mut by_kind = BTreeMap::new();
        let mut by_severity = BTreeMap::new();
        for record in errors.iter() {
            *by_kind.entry(record.kind).or_insert(0) += 1;
            *by_severity.entry(record.severity).or_insert(0) += 1;
        }
        let skip = errors.len().saturating_sub(ERROR_REPORT_RECENT);

        ErrorReport {
            generated_at: Utc::now(),
            total_errors: errors.len(),
            critical_errors: by_severity.get(&Severity::High).copied().unwrap_or(0),
            by_kind,
            by_severity,
            recent_errors: errors.iter().skip(skip).cloned().collect(),
            user_agent: self.config.user_agent.clone(),
            url: self.config.url.clone(),
        }
    }

    fn record_display<E>(&self, error: &E, context: &str, kind: ErrorKind) -> ErrorRecord
    where
        E: std::fmt::Display + std::fmt::Debug + ?Sized,
    {
        self.record(error.to_string(), Some(format!("{error:?}")), context, kind)
    }

    fn record(
        &self,
        message: String,
        stack: Option<String>,
        context: &str,
        kind: ErrorKind,
    ) -> ErrorRecord {
        let record = ErrorRecord {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind,
            context: context.to_string(),
            message,
            stack,
            user_agent: self.config.user_agent.clone(),
            url: self.config.url.clone(),
            severity: kind.severity(),
            recoverable: kind.is_recoverable(),
        };

        {
            let mut errors = self.errors.write();
            errors.push_back(record.clone());
            while errors.len() > self.config.max_errors {
                errors.pop_front();
            }
        }

        log_record(&record);
        self.emit(&record);
        record
    }

    fn emit(&self, record: &ErrorRecord) {
        let Some(emitter) = self.emitter.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        match serde_json::to_value(record) {
            Ok(payload) => emitter.emit(events::ERROR, &payload),
            Err(err) => warn!(error = %err, "Failed to serialise error record"),
        }
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new(ErrorHandlerConfig::default())
    }
}

impl std::fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("config", &self.config)
            .field("errors", &self.error_count())
            .field("has_emitter", &self.emitter.is_some())
            .finish()
    }
}

fn log_record(record: &ErrorRecord) {
    match record.severity {
        Severity::High => error!(
            error_id = %record.id,
            kind = %record.kind,
            context = %record.context,
            recoverable = record.recoverable,
            "{}", record.message
        ),
        Severity::Medium => warn!(
            error_id = %record.id,
            kind = %record.kind,
            context = %record.context,
            recoverable = record.recoverable,
            "{}", record.message
        ),
        Severity::Low => info!(
            error_id = %record.id,
            kind = %record.kind,
            context = %record.context,
            recoverable = record.recoverable,
            "{}", record.message
        ),
    }
}

/// `error` followed by each `source()`, one per line
fn source_chain(error: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut lines = Vec::new();
    let mut current = error.source();
    while let Some(source) = current {
        lines.push(format!("caused by: {source}"));
        current = source.source();
    }
    if lines.is_empty() {
        None
    } else {
        Some(format!("{error}\n{}", lines.join("\n")))
    }
}
