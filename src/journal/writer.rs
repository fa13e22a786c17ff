//! Journal Writer
//!
//! Handles appending entries to the journal file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::Result;

use super::{JournalEntry, JournalRecovery, Operation};

/// Writes entries to the journal file
pub struct JournalWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    /// Sequence number the next append will use
    next_seq: u64,
    sync_strategy: SyncStrategy,
    /// Appends since the last fsync
    uncommitted: usize,
    /// Entries currently in the file
    entry_count: usize,
}

impl JournalWriter {
    /// Open or create a journal file, continuing after its last valid entry.
    ///
    /// A damaged tail is cut off so new frames follow the valid prefix.
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let recovered = JournalRecovery::verify(path)?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        if recovered.was_truncated {
            file.set_len(recovered.valid_bytes)?;
            file.sync_all()?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            next_seq: recovered.last_seq + 1,
            sync_strategy,
            uncommitted: 0,
            entry_count: recovered.entries_recovered as usize,
        })
    }

    /// Append an operation, returning its sequence number.
    ///
    /// The frame is always handed to the OS before returning; fsync follows
    /// the configured strategy.
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        let seq = self.next_seq;
        let frame = JournalEntry::new(seq, operation).serialize()?;

        self.writer.write_all(&frame)?;
        self.writer.flush()?;

        self.next_seq += 1;
        self.entry_count += 1;
        self.uncommitted += 1;

        match self.sync_strategy {
            SyncStrategy::EveryWrite => self.sync()?,
            SyncStrategy::EveryNEntries { count } => {
                if self.uncommitted >= count {
                    self.sync()?;
                }
            }
        }

        Ok(seq)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.uncommitted = 0;
        Ok(())
    }

    /// Drop every entry; sequence numbers keep increasing
    pub fn truncate(&mut self) -> Result<()> {
        self.writer.flush()?;
        let file = self.writer.get_ref();
        file.set_len(0)?;
        file.sync_all()?;
        self.entry_count = 0;
        self.uncommitted = 0;
        Ok(())
    }

    /// Sequence number the next append will use
    pub fn current_seq(&self) -> u64 {
        self.next_seq
    }

    /// Appends not yet fsynced
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    /// Entries currently held in the journal file
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
