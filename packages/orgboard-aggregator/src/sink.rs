//! Error reporting seam for the dashboard service.
use crate::state::Source;
use tracing::error;

/// Injected side effect invoked once per connection transition into
/// `Failed`. Implementations must not block; the service calls this from
/// its event loop.
pub trait ErrorSink: Send + Sync {
    fn report(&self, source: Source);
}

/// Reports failures through the tracing error channel.
#[derive(Debug, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, source: Source) {
        error!("Failed to load {source} data for the dashboard.");
    }
}
