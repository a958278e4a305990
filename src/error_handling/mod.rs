//! # Error Handling
//!
//! Classification, recording and reporting of errors raised by listeners,
//! plugins, feature modules and host integrations.
//!
//! - [`ErrorKind`] / [`Severity`]: static classification table
//! - [`ErrorHandler`]: bounded record store with `"error"` event re-emission
//! - [`ErrorBoundary`]: handler scoped to a single UI component

pub mod boundary;
pub mod classification;
pub mod handler;
pub mod record;

pub use boundary::ErrorBoundary;
pub use classification::{ErrorKind, Severity};
pub use handler::{ErrorHandler, ErrorHandlerConfig};
pub use record::{ErrorRecord, ErrorReport};
