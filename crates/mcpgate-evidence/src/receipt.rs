// mcpgate-evidence/src/receipt.rs
// ============================================================================
// Module: Receipt Writer
// Description: Persists a per-invocation Receipt in overwrite or append
//              mode, guarded by a file mutex.
// Purpose: spec.md §4.9, §3.
// Dependencies: mcpgate-core::Receipt, std::fs
// ============================================================================

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use mcpgate_core::Receipt;

use crate::error::EvidenceError;

/// How a [`ReceiptWriter`] persists each receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptMode {
    /// Replace the file's contents with a single pretty-printed JSON object.
    Overwrite,
    /// Append one compact JSON object per line.
    Append,
}

/// Writes receipts to a fixed path, serializing concurrent callers behind a
/// mutex the way `mcpgate-evidence`'s event loggers serialize file writes.
pub struct ReceiptWriter {
    /// Destination path.
    path: PathBuf,
    /// Overwrite or append.
    mode: ReceiptMode,
    /// Guards every write so two concurrent callers never interleave.
    lock: Mutex<()>,
}

impl ReceiptWriter {
    /// Builds a writer for `path` in `mode`. The parent directory is created
    /// lazily on the first write, not here.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, mode: ReceiptMode) -> Self {
        Self {
            path: path.into(),
            mode,
            lock: Mutex::new(()),
        }
    }

    /// Persists `receipt`, creating the destination directory if absent.
    ///
    /// # Errors
    ///
    /// Returns [`EvidenceError::Io`] when the directory or file cannot be
    /// written, or [`EvidenceError::Serialize`] when the receipt cannot be
    /// encoded as JSON.
    pub fn write(&self, receipt: &Receipt) -> Result<(), EvidenceError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        match self.mode {
            ReceiptMode::Overwrite => self.write_overwrite(receipt),
            ReceiptMode::Append => self.write_append(receipt),
        }
    }

    /// Replaces the file with one pretty-printed JSON object.
    fn write_overwrite(&self, receipt: &Receipt) -> Result<(), EvidenceError> {
        let payload = serde_json::to_string_pretty(receipt)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    /// Appends one compact JSON object line.
    fn write_append(&self, receipt: &Receipt) -> Result<(), EvidenceError> {
        let payload = serde_json::to_string(receipt)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{payload}")?;
        Ok(())
    }
}

/// Reads back the receipts written to `path` in append mode, one per line.
/// Exposed for tests and for commands that need to inspect prior receipts.
///
/// # Errors
///
/// Returns [`EvidenceError::Io`] when `path` cannot be read, or
/// [`EvidenceError::Serialize`] when a line is not a valid receipt.
pub fn read_appended(path: &Path) -> Result<Vec<Receipt>, EvidenceError> {
    let contents = fs::read_to_string(path)?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(EvidenceError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpgate_core::ReceiptResult;
    use tempfile::tempdir;

    fn sample_receipt(command: &str) -> Receipt {
        Receipt {
            schema_version: Receipt::CURRENT_SCHEMA_VERSION.to_string(),
            op_id: "op-1".to_string(),
            ts_start: "2026-01-01T00:00:00.000000000Z".to_string(),
            ts_end: "2026-01-01T00:00:01.000000000Z".to_string(),
            command: command.to_string(),
            args: vec![],
            args_redacted: Some(false),
            result: ReceiptResult::ok(),
            lockfile: None,
            artifact: None,
            drift: None,
            policy: None,
        }
    }

    #[test]
    fn overwrite_mode_replaces_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("receipt.json");
        let writer = ReceiptWriter::new(&path, ReceiptMode::Overwrite);
        writer.write(&sample_receipt("scan")).unwrap();
        writer.write(&sample_receipt("lock")).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("\"command\"").count(), 1);
        assert!(contents.contains("\"lock\""));
    }

    #[test]
    fn append_mode_accumulates_jsonl() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("receipts.jsonl");
        let writer = ReceiptWriter::new(&path, ReceiptMode::Append);
        writer.write(&sample_receipt("scan")).unwrap();
        writer.write(&sample_receipt("check")).unwrap();
        let receipts = read_appended(&path).unwrap();
        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[1].command, "check");
    }

    #[test]
    fn creates_missing_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("receipt.json");
        let writer = ReceiptWriter::new(&path, ReceiptMode::Overwrite);
        writer.write(&sample_receipt("scan")).unwrap();
        assert!(path.exists());
    }
}
