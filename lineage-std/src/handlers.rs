//! Standard error handlers.

use crate::dispatch::ErrorHandler;
use lineage_core::{BoxError, ListenerHandle, Subscriber};

/// An error handler that logs subscriber failures and lets delivery continue.
///
/// Logs through `tracing` when the `tracing` feature is enabled and drops the
/// error otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn handle(&self, error: BoxError, scope: &ListenerHandle, subscriber: &Subscriber) {
        #[cfg(feature = "tracing")]
        {
            tracing::warn!(
                error = %error,
                listener = ?scope.id(),
                subscriber = %subscriber.id(),
                event_type = %subscriber.event_type(),
                "Subscriber failed"
            );
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = (error, scope, subscriber); // Suppress unused warning
        }
    }
}

/// An error handler that ignores every failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreErrors;

impl ErrorHandler for IgnoreErrors {
    fn handle(&self, _error: BoxError, _scope: &ListenerHandle, _subscriber: &Subscriber) {}
}
