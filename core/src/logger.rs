//! Logging collaborator injected into clients.
//!
//! Clients never reach for a global logger. They hold an `Arc<dyn Logger>`
//! that defaults to `NoopLogger`; `TracingLogger` forwards to `tracing`.

use std::fmt;

/// Leveled log sink used by `Client` and `QueueClient`.
pub trait Logger: Send + Sync + fmt::Debug {
    fn debug(&self, message: fmt::Arguments<'_>);

    fn info(&self, message: fmt::Arguments<'_>);

    /// Error-level record for a failure, with the error attached.
    fn exception(&self, message: fmt::Arguments<'_>, error: &dyn std::error::Error);
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _message: fmt::Arguments<'_>) {}

    fn info(&self, _message: fmt::Arguments<'_>) {}

    fn exception(&self, _message: fmt::Arguments<'_>, _error: &dyn std::error::Error) {}
}

/// Forwards records to `tracing` under the `service_client` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: fmt::Arguments<'_>) {
        tracing::debug!(target: "service_client", "{}", message);
    }

    fn info(&self, message: fmt::Arguments<'_>) {
        tracing::info!(target: "service_client", "{}", message);
    }

    fn exception(&self, message: fmt::Arguments<'_>, error: &dyn std::error::Error) {
        tracing::error!(target: "service_client", error = %error, "{}", message);
    }
}
