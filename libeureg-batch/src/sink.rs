use chrono::{DateTime, Local, Utc};
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::error;

use crate::{batch::BatchId, fetcher::FetchError};

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub batch: BatchId,
    pub domains: usize,
    pub occurred_at: DateTime<Utc>,
}

impl ErrorContext {
    pub fn now(batch: BatchId, domains: usize) -> Self {
        Self {
            batch,
            domains,
            occurred_at: Utc::now(),
        }
    }
}

/// Where failed fetches are reported before they propagate.
pub trait ErrorSink: Send + Sync {
    fn record(&self, error: &FetchError, context: &ErrorContext);
}

/// Reports failures through `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn record(&self, error: &FetchError, context: &ErrorContext) {
        error!(
            batch = %context.batch,
            domains = context.domains,
            occurred_at = %context.occurred_at.to_rfc3339(),
            "Error checking domain names: {}",
            error
        );
    }
}

/// Appends one line per failure to a log file.
///
/// A failure to write the log is itself reported through `tracing`; it never
/// masks the fetch error being recorded.
#[derive(Debug, Clone)]
pub struct FileErrorSink {
    path: PathBuf,
}

impl FileErrorSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

impl ErrorSink for FileErrorSink {
    fn record(&self, error: &FetchError, context: &ErrorContext) {
        let line = format_log_line(error, context);
        if let Err(e) = self.append(&line) {
            error!(path = %self.path.display(), "Failed to write error log: {}", e);
        }
    }
}

fn format_log_line(error: &FetchError, context: &ErrorContext) -> String {
    let timestamp = context
        .occurred_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S,%3f");
    format!(
        "{} [ERROR] Error checking domain names ({} domains): {}",
        timestamp, context.domains, error
    )
}
