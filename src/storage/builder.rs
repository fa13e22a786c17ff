//! Snapshot Builder
//!
//! Writes every entry of a store to a fresh snapshot file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::engine::IndexKind;
use crate::error::{Result, ShelfError};

use super::{SnapshotInfo, COUNT_OFFSET, MAGIC, VERSION};

/// Builder for creating a snapshot
///
/// Entries are written to `{path}.tmp`; `finish()` renames it over `path`,
/// so a crash mid-build leaves the previous snapshot intact.
pub struct SnapshotBuilder {
    /// Final snapshot path
    path: PathBuf,
    /// Temporary path being written
    tmp_path: PathBuf,
    /// Buffered writer for performance
    writer: BufWriter<File>,
    /// Number of entries written
    entry_count: u64,
    /// Running CRC hasher for data section
    data_hasher: crc32fast::Hasher,
}

impl SnapshotBuilder {
    /// Create a new snapshot builder; the header is written immediately
    pub fn new(path: &Path, kind: IndexKind) -> Result<Self> {
        let tmp_path = tmp_path(path);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        let mut writer = BufWriter::new(file);

        // Header (entry_count placeholder, patched in finish)
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&[kind.to_byte()])?;
        writer.write_all(&0u64.to_le_bytes())?;

        Ok(Self {
            path: path.to_path_buf(),
            tmp_path,
            writer,
            entry_count: 0,
            data_hasher: crc32fast::Hasher::new(),
        })
    }

    /// Add one entry
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let key_len = entry_len(key.len())?.to_le_bytes();
        let val_len = entry_len(value.len())?.to_le_bytes();

        for part in [&key_len[..], &val_len[..], key, value] {
            self.writer.write_all(part)?;
            self.data_hasher.update(part);
        }

        self.entry_count += 1;
        Ok(())
    }

    /// Finish building: write the footer, patch the count, move into place
    pub fn finish(mut self) -> Result<SnapshotInfo> {
        let data_crc = self.data_hasher.finalize();
        self.writer.write_all(&data_crc.to_le_bytes())?;
        self.writer.flush()?;

        let mut file = self.writer.into_inner().map_err(|e| {
            ShelfError::Io(e.into_error())
        })?;
        file.seek(SeekFrom::Start(COUNT_OFFSET))?;
        file.write_all(&self.entry_count.to_le_bytes())?;
        file.sync_all()?;

        let file_size = file.metadata()?.len();
        drop(file);

        fs::rename(&self.tmp_path, &self.path)?;

        Ok(SnapshotInfo {
            path: self.path,
            entry_count: self.entry_count,
            file_size,
        })
    }
}

fn entry_len(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| ShelfError::Engine(format!("entry of {} bytes is too large for a snapshot", len)))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
