//! Snapshot Reader
//!
//! Loads a snapshot file into memory and validates it.

use std::fs;
use std::path::Path;

use bytes::Bytes;

use crate::engine::IndexKind;
use crate::error::{Result, ShelfError};

use super::{FOOTER_SIZE, HEADER_SIZE, MAGIC, VERSION};

/// A fully validated snapshot
pub struct SnapshotReader {
    kind: IndexKind,
    /// Entries in file order, sliced from the loaded file
    entries: Vec<(Bytes, Bytes)>,
}

impl SnapshotReader {
    /// Open a snapshot, checking magic, version, kind, CRC and entry count
    pub fn open(path: &Path) -> Result<Self> {
        let data = Bytes::from(fs::read(path)?);

        if data.len() < (HEADER_SIZE + FOOTER_SIZE) as usize {
            return Err(ShelfError::Corruption(format!(
                "snapshot too small: {} bytes",
                data.len()
            )));
        }

        if &data[0..4] != MAGIC {
            return Err(ShelfError::Corruption(format!(
                "invalid snapshot magic: expected SHKV, got {:?}",
                &data[0..4]
            )));
        }

        let version = u16::from_le_bytes([data[4], data[5]]);
        if version != VERSION {
            return Err(ShelfError::Corruption(format!(
                "unsupported snapshot version: {}",
                version
            )));
        }

        let kind = IndexKind::from_byte(data[6]).ok_or_else(|| {
            ShelfError::Corruption(format!("unknown snapshot index kind: 0x{:02x}", data[6]))
        })?;

        let entry_count = read_u64(&data, 7);

        let data_end = data.len() - FOOTER_SIZE as usize;
        let stored_crc = read_u32(&data, data_end);
        let actual_crc = crc32fast::hash(&data[HEADER_SIZE as usize..data_end]);
        if stored_crc != actual_crc {
            return Err(ShelfError::Corruption(format!(
                "snapshot CRC mismatch: expected {:08x}, got {:08x}",
                stored_crc, actual_crc
            )));
        }

        // Parse entries: [key_len(4)][val_len(4)][key][value]
        let mut entries = Vec::new();
        let mut pos = HEADER_SIZE as usize;
        while pos < data_end {
            if pos + 8 > data_end {
                return Err(ShelfError::Corruption(format!(
                    "partial snapshot entry header at offset {}",
                    pos
                )));
            }
            let key_len = read_u32(&data, pos) as usize;
            let val_len = read_u32(&data, pos + 4) as usize;
            pos += 8;

            if pos + key_len + val_len > data_end {
                return Err(ShelfError::Corruption(format!(
                    "snapshot entry at offset {} overruns the data block",
                    pos - 8
                )));
            }
            let key = data.slice(pos..pos + key_len);
            pos += key_len;
            let value = data.slice(pos..pos + val_len);
            pos += val_len;

            entries.push((key, value));
        }

        if entries.len() as u64 != entry_count {
            return Err(ShelfError::Corruption(format!(
                "snapshot entry count mismatch: header says {}, found {}",
                entry_count,
                entries.len()
            )));
        }

        Ok(Self { kind, entries })
    }

    /// Index kind recorded in the header
    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Entries in file order
    pub fn into_entries(self) -> Vec<(Bytes, Bytes)> {
        self.entries
    }
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&data[at..at + 4]);
    u32::from_le_bytes(raw)
}

fn read_u64(data: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&data[at..at + 8]);
    u64::from_le_bytes(raw)
}
