// mcpgate-evidence/src/events.rs
// ============================================================================
// Module: Event Logger
// Description: Emits `<command>.start`/`<command>.complete` events as JSONL
//              or pretty text.
// Purpose: spec.md §4.9's event sink contract.
// Dependencies: serde_json, std::io/std::fs
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;
use serde_json::json;

/// One logged event: a name plus arbitrary structured fields.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// Event name, e.g. `"scan.start"` or `"proxy.blocked_would_be"`.
    pub event: &'static str,
    /// Operation id shared across every event/span/receipt for one invocation.
    pub op_id: String,
    /// Arbitrary structured fields merged alongside `event` and `op_id`.
    #[serde(flatten)]
    pub fields: Value,
}

impl Event {
    /// Builds an event with no additional fields beyond `op_id`.
    #[must_use]
    pub fn new(event: &'static str, op_id: impl Into<String>) -> Self {
        Self {
            event,
            op_id: op_id.into(),
            fields: json!({}),
        }
    }

    /// Attaches `fields` (merged into the serialized object) to this event.
    #[must_use]
    pub fn with_fields(mut self, fields: Value) -> Self {
        self.fields = fields;
        self
    }
}

/// Output format an [`EventLogger`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFormat {
    /// One JSON object per line, for machine consumption.
    Jsonl,
    /// Human-readable, explicitly not line-oriented so it cannot be mistaken
    /// for JSONL by downstream tooling.
    Pretty,
}

/// Sink for structured events; implementors must be safe for concurrent use.
pub trait EventSink: Send + Sync {
    /// Records `event`.
    fn record(&self, event: &Event);
}

/// Writes events as JSON lines (or pretty text) to stderr.
pub struct StderrEventLogger {
    /// Output format.
    format: EventFormat,
}

impl StderrEventLogger {
    /// Builds a logger writing to stderr in `format`.
    #[must_use]
    pub const fn new(format: EventFormat) -> Self {
        Self { format }
    }
}

impl EventSink for StderrEventLogger {
    fn record(&self, event: &Event) {
        write_event(&mut io::stderr(), event, self.format);
    }
}

/// Writes events as JSON lines (or pretty text) to a file, guarded by a
/// mutex so concurrent callers serialize their writes per entry.
pub struct FileEventLogger {
    /// Output format.
    format: EventFormat,
    /// File handle opened in append mode.
    file: Mutex<File>,
}

impl FileEventLogger {
    /// Opens `path` in append mode (creating it if absent).
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened.
    pub fn new(path: &Path, format: EventFormat) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            format,
            file: Mutex::new(file),
        })
    }
}

impl EventSink for FileEventLogger {
    fn record(&self, event: &Event) {
        if let Ok(mut file) = self.file.lock() {
            write_event(&mut *file, event, self.format);
        }
    }
}

/// Serializes `event` in `format` and writes it to `writer`, swallowing
/// write failures the way a logging sink must (a blocked log write should
/// never abort the command it is observing).
fn write_event(writer: &mut impl Write, event: &Event, format: EventFormat) {
    match format {
        EventFormat::Jsonl => {
            if let Ok(payload) = serde_json::to_string(event) {
                let _ = writeln!(writer, "{payload}");
            }
        }
        EventFormat::Pretty => {
            if let Ok(payload) = serde_json::to_string_pretty(event) {
                let _ = writeln!(writer, "{payload}");
                let _ = writeln!(writer, "---");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::NamedTempFile;

    #[test]
    fn jsonl_writes_one_compact_line() {
        let event = Event::new("scan.start", "op-1").with_fields(json!({"duration_ms": 0}));
        let mut buf: Vec<u8> = Vec::new();
        write_event(&mut buf, &event, EventFormat::Jsonl);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("\"event\":\"scan.start\""));
    }

    #[test]
    fn pretty_is_not_single_line() {
        let event = Event::new("scan.complete", "op-1").with_fields(json!({"result": "ok"}));
        let mut buf: Vec<u8> = Vec::new();
        write_event(&mut buf, &event, EventFormat::Pretty);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().count() > 1);
    }

    #[test]
    fn file_logger_appends_across_instances() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_path_buf();
        {
            let logger = FileEventLogger::new(&path, EventFormat::Jsonl).unwrap();
            logger.record(&Event::new("scan.start", "op-1"));
        }
        {
            let logger = FileEventLogger::new(&path, EventFormat::Jsonl).unwrap();
            logger.record(&Event::new("scan.complete", "op-1"));
        }
        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
