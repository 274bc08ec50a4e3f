//! Persisted dedup ledger

use crate::error::StoreError;
use gazette_domain::traits::DedupLedger;
use gazette_domain::ContentHash;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Append-only file of submitted content hashes, one per line
///
/// Loaded fully at open so lookups are in-memory reads; each append
/// goes straight to disk. Existing entries are never rewritten, which
/// keeps the file safe to read while a run appends to it. Losing the
/// file is harmless — the ingestion service's identifiers are also
/// deterministic, so re-submission is idempotent.
pub struct FileDedupLedger {
    path: PathBuf,
    hashes: HashSet<ContentHash>,
}

impl FileDedupLedger {
    /// Open (creating if needed) the ledger under a store root
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = root.as_ref().join("ledger");
        fs::create_dir_all(&dir)?;
        let path = dir.join("content_hashes.log");

        let mut hashes = HashSet::new();
        if path.exists() {
            for line in fs::read_to_string(&path)?.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                match ContentHash::from_hex(line) {
                    Ok(hash) => {
                        hashes.insert(hash);
                    }
                    Err(e) => warn!(line = %line, error = %e, "skipping malformed ledger entry"),
                }
            }
        }
        debug!(entries = hashes.len(), path = %path.display(), "dedup ledger loaded");
        Ok(Self { path, hashes })
    }

    /// Number of hashes currently recorded
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Whether the ledger holds no hashes
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl DedupLedger for FileDedupLedger {
    type Error = StoreError;

    fn contains(&self, hash: &ContentHash) -> bool {
        self.hashes.contains(hash)
    }

    fn append(&mut self, hash: &ContentHash) -> Result<(), Self::Error> {
        if !self.hashes.insert(hash.clone()) {
            return Ok(()); // already recorded
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", hash)?;
        Ok(())
    }
}
