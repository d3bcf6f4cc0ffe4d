/*!
 * Activity Log
 * Append-only, timestamped, human-readable lines
 */

use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::info;

/// Destination of activity lines
pub trait LogSink: Send + Sync {
    /// Append one already-timestamped line
    fn append(&self, line: String);
}

/// Keeps every line in memory, in order
#[derive(Debug, Default, Clone)]
pub struct MemoryLogSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all lines appended so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl LogSink for MemoryLogSink {
    fn append(&self, line: String) {
        self.lines.lock().push(line);
    }
}

/// Writes lines to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogSink;

impl LogSink for ConsoleLogSink {
    fn append(&self, line: String) {
        let mut out = std::io::stdout().lock();
        // A closed stdout must not take the monitor down
        let _ = writeln!(out, "{}", line);
    }
}

/// Timestamping front of a [`LogSink`]
///
/// Every line is also mirrored to tracing at info level.
#[derive(Clone)]
pub struct ActivityLog {
    sink: Arc<dyn LogSink>,
}

impl ActivityLog {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Log that drops every line
    pub fn discard() -> Self {
        struct Discard;
        impl LogSink for Discard {
            fn append(&self, _line: String) {}
        }
        Self::new(Arc::new(Discard))
    }

    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "memtrim::activity", "{}", message);
        self.sink.append(format!("[{}] {}", timestamp(), message));
    }

    /// Log several lines sharing nothing but order
    pub fn log_all<I, S>(&self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for message in messages {
            self.log(message);
        }
    }
}

/// Local wall-clock time as HH:MM:SS, UTC when the local offset is unknown
fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| "--:--:--".to_string())
}
