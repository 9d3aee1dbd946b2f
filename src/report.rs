/// Recoverable per-record failures reported on the error channel.
///
/// None of these ever fail the record: parsing degrades to an empty field
/// set, tag rendering falls back to the literal template, and a full queue
/// drops the point. Delivery failures are not represented here; those stay
/// inside the sink (see [`crate::writer`]).
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("malformed attribute JSON in log record: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to render field '{key}' for tag substitution: {source}")]
    TagRender {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("write queue full, dropping point")]
    QueueFull,
}

/// One-way channel for non-fatal errors, injected by the host.
///
/// Reports are consumed by the host's own logging infrastructure and never
/// surfaced back to the log-emission caller.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &ForwardError);
}

/// Default reporter that bridges onto `tracing`.
#[derive(Clone, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &ForwardError) {
        tracing::error!(error = %error, "log forwarding error");
    }
}

/// Reporter that swallows everything. Useful for hosts that already count
/// drops elsewhere, and for tests that don't care about the channel.
#[derive(Clone, Default)]
pub struct NullReporter;

impl ErrorReporter for NullReporter {
    fn report(&self, _error: &ForwardError) {}
}
