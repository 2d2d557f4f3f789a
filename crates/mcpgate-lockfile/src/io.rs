// mcpgate-lockfile/src/io.rs
// ============================================================================
// Module: Lockfile I/O
// Description: Atomic, canonical-JSON-v2 read/write for lockfiles on disk.
// Purpose: Guarantee a concurrent reader never observes a partial write.
// Dependencies: mcpgate-core, std::fs
// ============================================================================

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use mcpgate_core::CanonVersion;
use mcpgate_core::Lockfile;
use mcpgate_core::canonicalize;

use crate::error::LockfileError;

/// Reads and parses a lockfile from `path`.
///
/// # Errors
///
/// Returns [`LockfileError::Io`] on a read failure or
/// [`LockfileError::Parse`] when the contents are not a valid lockfile.
pub fn read(path: &Path) -> Result<Lockfile, LockfileError> {
    let bytes = fs::read(path)?;
    let lockfile: Lockfile = serde_json::from_slice(&bytes)?;
    Ok(lockfile)
}

/// Writes `lockfile` to `path` in canonical JSON v2 (spec.md §6), atomically:
/// serialize to a sibling temp file, fsync, then rename over the target.
///
/// # Errors
///
/// Returns [`LockfileError::Canonicalization`] when the lockfile cannot be
/// canonicalized, or [`LockfileError::Io`] on any filesystem failure.
pub fn write_atomic(path: &Path, lockfile: &Lockfile) -> Result<(), LockfileError> {
    let bytes = canonicalize(lockfile, CanonVersion::V2)?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp_path = parent.to_path_buf();
    let file_name = path
        .file_name()
        .map(|n| format!(".{}.tmp", n.to_string_lossy()))
        .unwrap_or_else(|| ".lockfile.tmp".to_string());
    tmp_path.push(file_name);

    let mut file = File::create(&tmp_path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpgate_core::PromptSection;
    use mcpgate_core::ResourceSection;
    use mcpgate_core::ServerIdentity;

    fn stub_lockfile() -> Lockfile {
        Lockfile {
            lock_file_version: "3.0".to_string(),
            server: ServerIdentity {
                name: "stub".to_string(),
                version: "0.0.1".to_string(),
            },
            tools: std::collections::BTreeMap::new(),
            prompts: PromptSection::default(),
            resources: ResourceSection::default(),
            artifact: None,
            generated_at: "2026-01-01T00:00:00.000000000Z".to_string(),
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lock.json");
        let lockfile = stub_lockfile();
        write_atomic(&path, &lockfile).unwrap();
        let read_back = read(&path).unwrap();
        assert_eq!(read_back, lockfile);
    }

    #[test]
    fn write_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lock.json");
        write_atomic(&path, &stub_lockfile()).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
