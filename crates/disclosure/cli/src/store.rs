//! Ledger snapshot file
//!
//! Every invocation loads the whole snapshot, commits in memory, and writes
//! the snapshot back. A save only succeeds if the file still holds the
//! sequence that was loaded, so a concurrent invocation that committed first
//! turns the later one into a conflict instead of being overwritten.

use anyhow::{bail, Context, Result};
use disclosure_ledger::{LedgerSnapshot, MemoryLedger};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Ledger stored at `path`; empty if the file does not exist yet
pub fn load(path: &Path) -> Result<MemoryLedger> {
    Ok(MemoryLedger::from_snapshot(read_snapshot(path)?))
}

/// Write the committed state of `ledger` to `path`, replacing the file in one
/// rename. Fails if the file no longer holds `loaded_sequence`.
pub fn save(path: &Path, ledger: &MemoryLedger, loaded_sequence: u64) -> Result<()> {
    let snapshot = ledger.snapshot()?;
    let json = serde_json::to_string_pretty(&snapshot)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let _lock = WriteLock::acquire(path)?;
    let on_disk = read_snapshot(path)?.sequence;
    if on_disk != loaded_sequence {
        bail!(
            "ledger {} changed since it was loaded (sequence {} on disk, {} loaded); retry the operation",
            path.display(),
            on_disk,
            loaded_sequence
        );
    }

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

fn read_snapshot(path: &Path) -> Result<LedgerSnapshot> {
    if !path.exists() {
        return Ok(LedgerSnapshot::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading ledger {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing ledger {}", path.display()))
}

/// Exclusive `<ledger>.lock` marker held across the sequence check and the
/// rename
struct WriteLock {
    path: PathBuf,
}

impl WriteLock {
    fn acquire(ledger: &Path) -> Result<Self> {
        let path = ledger.with_extension("json.lock");
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => bail!(
                "ledger {} is being written by another invocation (remove {} if stale)",
                ledger.display(),
                path.display()
            ),
            Err(e) => Err(e).with_context(|| format!("creating {}", path.display())),
        }
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
