use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

use crate::trace::trace::TraceEvent;

/// JSONL sink for non-fatal conditions (dangling discards, stale summaries,
/// reviewer decisions).
///
/// Logging never fails the caller. Problems go to stderr and the event is
/// dropped.
pub struct TraceLogger {
    sink: Option<Mutex<File>>,
}

impl TraceLogger {
    /// Open `path` for appending, or build a disabled logger for `None`.
    pub fn open(path: Option<&str>) -> Self {
        let Some(path) = path else {
            return Self { sink: None };
        };

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Self {
                sink: Some(Mutex::new(f)),
            },
            Err(e) => {
                eprintln!("Warning: could not open trace file '{}': {}", path, e);
                Self { sink: None }
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn log(&self, event: &TraceEvent) {
        let Some(sink) = &self.sink else {
            return;
        };

        let line = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Warning: failed to serialize trace event: {}", e);
                return;
            }
        };

        let mut file = match sink.lock() {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Warning: trace logger lock poisoned: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", line) {
            eprintln!("Warning: failed to write trace event: {}", e);
        }
    }

    pub fn log_all(&self, events: impl IntoIterator<Item = TraceEvent>) {
        for event in events {
            self.log(&event);
        }
    }
}
