//! Per-component error boundaries.

use super::classification::ErrorKind;
use super::handler::ErrorHandler;
use super::record::ErrorRecord;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Handler bound to one component; everything it records has kind
/// [`ErrorKind::Component`] and the component name as context.
#[derive(Debug, Clone)]
pub struct ErrorBoundary {
    handler: Arc<ErrorHandler>,
    component: String,
}

impl ErrorBoundary {
    pub(crate) fn new(handler: Arc<ErrorHandler>, component: &str) -> Self {
        Self {
            handler,
            component: component.to_string(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Record `error` against this component
    pub fn catch(&self, error: &(dyn std::error::Error + 'static)) -> ErrorRecord {
        self.handler
            .handle(error, &self.component, ErrorKind::Component)
    }

    pub fn wrap<A, T, E, F>(&self, f: F) -> impl Fn(A) -> Result<T, E>
    where
        F: Fn(A) -> Result<T, E>,
        E: std::fmt::Display + std::fmt::Debug,
    {
        self.handler
            .wrap_function(f, &self.component, ErrorKind::Component)
    }

    pub fn wrap_async<A, T, E, F, Fut>(
        &self,
        f: F,
    ) -> impl Fn(A) -> BoxFuture<'static, Result<T, E>>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: std::fmt::Display + std::fmt::Debug + Send + 'static,
    {
        self.handler
            .wrap_async_function(f, &self.component, ErrorKind::Component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::Severity;

    #[test]
    fn test_boundary_records_component_errors() {
        let handler = Arc::new(ErrorHandler::default());
        let boundary = handler.create_error_boundary("ContrastPanel");

        let record = boundary.catch(&std::io::Error::other("render failed"));
        assert_eq!(record.kind, ErrorKind::Component);
        assert_eq!(record.severity, Severity::Medium);
        assert!(record.recoverable);
        assert_eq!(record.context, "ContrastPanel");

        let render = boundary.wrap(|level: u8| {
            if level > 3 {
                Err(format!("unsupported level {level}"))
            } else {
                Ok(level)
            }
        });
        assert!(render(5).is_err());
        assert_eq!(handler.get_errors_by_kind(ErrorKind::Component).len(), 2);
    }

    #[tokio::test]
    async fn test_boundary_wrap_async() {
        let handler = Arc::new(ErrorHandler::default());
        let boundary = handler.create_error_boundary("VoicePicker");
        let load = boundary.wrap_async(|_: ()| async { Err::<(), _>("no voices".to_string()) });

        assert_eq!(load(()).await.unwrap_err(), "no voices");
        assert_eq!(handler.error_count(), 1);
    }
}
