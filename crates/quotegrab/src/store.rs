//! Fingerprint store
//!
//! In-memory set of every fingerprint accepted so far, backed by an
//! append-only log of raw 16-byte records. The log is the only state that
//! survives a restart: [`FingerprintStore::open`] rebuilds the set from it.
//!
//! New fingerprints go into memory first and onto disk second. A crash in
//! between loses at most the one record, which costs a single avoidable
//! duplicate on the next run.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use quotegrab_common::{Fingerprint, GrabError, Result, FINGERPRINT_LEN};
use tracing::{info, warn};

/// Fingerprints read from a log, plus what was left over at the end
#[derive(Debug, Default)]
pub struct LoadedLog {
    pub fingerprints: HashSet<Fingerprint>,
    /// Bytes after the last whole record
    pub torn_tail: usize,
}

/// Read every whole record from the fingerprint log at `path`.
///
/// A missing file is an empty log. A trailing partial record is ignored.
pub fn read_log(path: &Path) -> Result<LoadedLog> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LoadedLog::default()),
        Err(e) => return Err(GrabError::fingerprint_log(path, e)),
    };

    let records = bytes.chunks_exact(FINGERPRINT_LEN);
    let torn_tail = records.remainder().len();
    let fingerprints = records.filter_map(Fingerprint::from_record).collect();

    Ok(LoadedLog {
        fingerprints,
        torn_tail,
    })
}

/// Load the fingerprint set from the log at `path`
pub fn load(path: &Path) -> Result<HashSet<Fingerprint>> {
    Ok(read_log(path)?.fingerprints)
}

pub struct FingerprintStore {
    seen: HashSet<Fingerprint>,
    log: File,
    path: PathBuf,
}

impl FingerprintStore {
    /// Load the log at `path` and open it for appending.
    ///
    /// The log is never truncated. If it ends in a partial record, that
    /// record is zero-padded to full width so new records start on a record
    /// boundary. The padded record loads as one fingerprint no text has.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if path.exists() {
            info!(path = %path.display(), "Reading fingerprint log");
        } else {
            info!(path = %path.display(), "No fingerprint log found, a new one will be created");
        }

        let loaded = read_log(&path)?;

        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| GrabError::fingerprint_log(&path, e))?;

        if loaded.torn_tail > 0 {
            warn!(
                path = %path.display(),
                bytes = loaded.torn_tail,
                "Padding incomplete record at end of fingerprint log"
            );
            let padding = [0u8; FINGERPRINT_LEN];
            log.write_all(&padding[loaded.torn_tail..])
                .map_err(|e| GrabError::fingerprint_log(&path, e))?;
        }

        info!(count = loaded.fingerprints.len(), "Fingerprints loaded");

        Ok(Self {
            seen: loaded.fingerprints,
            log,
            path,
        })
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.seen.contains(fp)
    }

    /// Add to the in-memory set only. Returns `true` if `fp` was new.
    pub fn insert(&mut self, fp: Fingerprint) -> bool {
        self.seen.insert(fp)
    }

    /// Append one record to the on-disk log
    pub fn append(&mut self, fp: &Fingerprint) -> Result<()> {
        self.log
            .write_all(fp.as_bytes())
            .map_err(|e| GrabError::fingerprint_log(&self.path, e))
    }

    /// Insert `fp` and, if it was new, append it to the log.
    ///
    /// Returns `true` if `fp` was new.
    pub fn record(&mut self, fp: Fingerprint) -> Result<bool> {
        if !self.insert(fp) {
            return Ok(false);
        }
        self.append(&fp)?;
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
