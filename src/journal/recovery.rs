//! Journal Recovery
//!
//! Rebuilds the list of journaled mutations after a restart or crash.

use std::path::Path;

use crate::error::{Result, ShelfError};

use super::{JournalEntry, JournalReader};

/// Handles journal recovery
pub struct JournalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Number of damaged frames found (recovery stops at the first one)
    pub entries_corrupted: u64,

    /// Last valid sequence number, 0 when nothing was recovered
    pub last_seq: u64,

    /// Whether a torn or damaged tail was left behind
    pub was_truncated: bool,

    /// Length of the valid prefix of the file in bytes
    pub valid_bytes: u64,
}

impl JournalRecovery {
    /// Recover entries from a journal file.
    ///
    /// A missing file yields no entries. Reading stops at the first torn or
    /// damaged frame; everything before it is returned in order. The file
    /// itself is never modified.
    pub fn recover(path: &Path) -> Result<(Vec<JournalEntry>, RecoveryResult)> {
        let mut entries = Vec::new();
        let result = Self::scan(path, |entry| entries.push(entry))?;
        Ok((entries, result))
    }

    /// Verify integrity of a journal file without collecting entries
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path, |_| {})
    }

    fn scan<F: FnMut(JournalEntry)>(path: &Path, mut on_entry: F) -> Result<RecoveryResult> {
        let mut result = RecoveryResult::default();
        if !path.exists() {
            return Ok(result);
        }

        let mut reader = JournalReader::open(path)?;
        loop {
            match reader.next_entry() {
                Ok(Some(entry)) => {
                    result.entries_recovered += 1;
                    result.last_seq = entry.seq;
                    on_entry(entry);
                }
                Ok(None) => break,
                Err(ShelfError::Corruption(reason)) => {
                    tracing::warn!(
                        path = %path.display(),
                        offset = reader.position(),
                        %reason,
                        "journal tail dropped during recovery"
                    );
                    result.entries_corrupted += 1;
                    result.was_truncated = true;
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        result.valid_bytes = reader.position();
        Ok(result)
    }
}
