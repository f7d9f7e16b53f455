use std::time::Instant;
use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines for interactive use
    #[default]
    Pretty,
    /// JSON output for structured logging
    Json,
}

/// Build the subscriber for `format`, writing every event to `writer`
pub fn build_subscriber<W>(format: LogFormat, filter: EnvFilter, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => Box::new(
            registry.with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(writer)
                    .json(),
            ),
        ),
        LogFormat::Pretty => Box::new(registry.with(fmt::layer().with_target(false).with_writer(writer))),
    }
}

/// Initialize structured logging with tracing
/// This should be called once at application startup.
/// Logs go to stderr so stdout stays free for command output.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = build_subscriber(format, filter, std::io::stderr);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[Logging] subscriber already installed: {}", e);
        return;
    }

    tracing::debug!(?format, "Structured logging initialized");
}

/// Request timer that logs its latency on drop
pub struct RequestTimer {
    label: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        tracing::debug!(label = self.label, latency_ms = self.elapsed_ms(), "Request finished");
    }
}
