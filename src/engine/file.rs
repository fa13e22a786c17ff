//! File-backed engine
//!
//! Keeps every entry in an in-memory [`Index`], persisted as a snapshot at
//! the store path plus a journal of mutations made since that snapshot.
//!
//! ## Lifecycle
//! 1. Load the snapshot (a missing or empty file is an empty store)
//! 2. Replay the journal on top of it
//! 3. When writable, fold the replayed journal into a new snapshot
//! 4. Each mutation: journal first, then index
//! 5. Compact once the journal reaches `compaction_threshold` entries; a
//!    failed compaction is logged and retried, the mutation still succeeds

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::config::Config;
use crate::error::{Result, ShelfError};
use crate::journal::{JournalRecovery, JournalWriter, Operation, RecoveryResult};
use crate::storage::{SnapshotBuilder, SnapshotReader};

use super::{Index, IndexKind, RawIter, StorageEngine};

/// Built-in storage engine
pub struct FileEngine {
    /// Snapshot path, as given in the config
    path: PathBuf,

    /// Live entries
    index: Index,

    /// Journal for mutations; `None` when opened read-only or after close
    journal: Option<JournalWriter>,

    /// Journal entries that trigger a snapshot rewrite
    compaction_threshold: usize,

    /// Opened without write access
    read_only: bool,
}

impl FileEngine {
    /// Open or create a store according to `config`
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let path = config.path.clone();
        let journal_path = config.journal_path();
        let mode = config.mode;

        // Step 1: Check existence against the open mode
        let exists = path.exists();
        if !exists && !mode.create {
            return Err(ShelfError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("store {} does not exist", path.display()),
            )));
        }

        // Step 2: Load the snapshot unless its contents are being discarded
        let snapshot = if exists && !mode.truncate && fs::metadata(&path)?.len() > 0 {
            Some(SnapshotReader::open(&path)?)
        } else {
            None
        };

        let recorded = snapshot.as_ref().map(SnapshotReader::kind);
        let kind = IndexKind::resolve(config.engine, recorded);
        let mut index = Index::new(kind);
        if let Some(snapshot) = snapshot {
            for (key, value) in snapshot.into_entries() {
                index.insert(key, value);
            }
        }

        // Step 3: Replay the journal
        let recovery = if mode.truncate {
            RecoveryResult::default()
        } else {
            let (entries, recovery) = JournalRecovery::recover(&journal_path)?;
            for entry in entries {
                apply(&mut index, entry.operation);
            }
            recovery
        };

        if recovery.entries_recovered > 0 || recovery.was_truncated {
            tracing::debug!(
                path = %path.display(),
                recovered = recovery.entries_recovered,
                corrupted = recovery.entries_corrupted,
                last_seq = recovery.last_seq,
                "journal replayed"
            );
        }

        let mut engine = Self {
            path,
            index,
            journal: None,
            compaction_threshold: config.compaction_threshold,
            read_only: !mode.write,
        };

        // Step 4: Make replayed data durable in a snapshot, then start an
        // empty journal. Read-only handles leave both files untouched.
        if mode.write {
            let needs_snapshot = !exists
                || mode.truncate
                || recorded != Some(kind)
                || recovery.entries_recovered > 0
                || recovery.was_truncated;
            if needs_snapshot {
                engine.write_snapshot()?;
            }

            let mut journal = JournalWriter::open(&journal_path, config.sync_strategy)?;
            if journal.entry_count() > 0 {
                journal.truncate()?;
            }
            engine.journal = Some(journal);
        }

        tracing::info!(
            path = %engine.path.display(),
            kind = ?kind,
            entries = engine.index.len(),
            read_only = engine.read_only,
            "store opened"
        );

        Ok(engine)
    }

    /// Index flavour in use
    pub fn kind(&self) -> IndexKind {
        self.index.kind()
    }

    /// Entries written to the journal since the last snapshot
    pub fn journal_len(&self) -> usize {
        self.journal.as_ref().map_or(0, JournalWriter::entry_count)
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Rewrite the snapshot and empty the journal
    pub fn compact(&mut self) -> Result<()> {
        let journal = self.writable()?;
        let journaled = journal.entry_count();

        self.write_snapshot()?;
        if let Some(journal) = self.journal.as_mut() {
            journal.truncate()?;
        }

        tracing::debug!(
            path = %self.path.display(),
            entries = self.index.len(),
            journaled,
            "store compacted"
        );
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn writable(&mut self) -> Result<&mut JournalWriter> {
        if self.read_only {
            return Err(ShelfError::ReadOnly);
        }
        self.journal
            .as_mut()
            .ok_or_else(|| ShelfError::Engine("engine is closed".to_string()))
    }

    fn journal(&mut self, operation: Operation) -> Result<()> {
        self.writable()?.append(operation)?;
        Ok(())
    }

    /// Compact once the threshold is reached. The mutation that triggered it
    /// is already journaled, so a failure is logged and retried on the next
    /// mutation instead of being reported against a write that landed.
    fn maybe_compact(&mut self) {
        if self.journal_len() < self.compaction_threshold {
            return;
        }
        if let Err(e) = self.compact() {
            tracing::warn!(
                path = %self.path.display(),
                journaled = self.journal_len(),
                error = %e,
                "compaction failed; journal kept"
            );
        }
    }

    fn write_snapshot(&self) -> Result<()> {
        let mut builder = SnapshotBuilder::new(&self.path, self.index.kind())?;
        for (key, value) in self.index.iter() {
            builder.add(key, value)?;
        }
        builder.finish()?;
        Ok(())
    }
}

impl StorageEngine for FileEngine {
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        Ok(self.index.get(key).cloned())
    }

    fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.index.contains(key))
    }

    fn set(&mut self, key: Bytes, value: Bytes) -> Result<()> {
        self.journal(Operation::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;
        self.index.insert(key, value);
        self.maybe_compact();
        Ok(())
    }

    fn remove(&mut self, key: &[u8]) -> Result<Option<Bytes>> {
        self.writable()?;
        if !self.index.contains(key) {
            return Ok(None);
        }

        self.journal(Operation::Delete { key: key.to_vec() })?;
        let removed = self.index.remove(key);
        self.maybe_compact();
        Ok(removed)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.index.len())
    }

    fn clear(&mut self) -> Result<()> {
        self.journal(Operation::Clear)?;
        self.index.clear();
        self.maybe_compact();
        Ok(())
    }

    fn iter(&self) -> Result<RawIter<'_>> {
        Ok(Box::new(
            self.index
                .iter()
                .map(|(key, value)| Ok((key.clone(), value.clone()))),
        ))
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn sync(&mut self) -> Result<()> {
        match self.journal.as_mut() {
            Some(journal) => journal.sync(),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut journal) = self.journal.take() {
            if journal.entry_count() > 0 {
                self.write_snapshot()?;
                journal.truncate()?;
            }
            journal.sync()?;
        }

        tracing::info!(
            path = %self.path.display(),
            entries = self.index.len(),
            "store closed"
        );
        Ok(())
    }
}

/// Replay one journaled mutation
fn apply(index: &mut Index, operation: Operation) {
    match operation {
        Operation::Put { key, value } => {
            index.insert(Bytes::from(key), Bytes::from(value));
        }
        Operation::Delete { key } => {
            index.remove(&key);
        }
        Operation::Clear => index.clear(),
    }
}
