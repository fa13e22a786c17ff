//! Storage Module
//!
//! Snapshot file holding the complete contents of a store.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (15 bytes)                                       │
//! │   Magic: "SHKV" (4) | Version: u16 (2) | Kind: u8 (1)   │
//! │   Count: u64 (8)                                        │
//! ├─────────────────────────────────────────────────────────┤
//! │ Data Block (variable)                                   │
//! │   [KeyLen: u32][ValLen: u32][Key][Value]                │
//! │   ... repeated for each entry ...                       │
//! ├─────────────────────────────────────────────────────────┤
//! │ Footer (4 bytes)                                        │
//! │   DataCRC: u32                                          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. Kind is 0 for a tree index, 1 for hash.

mod builder;
mod reader;

use std::path::PathBuf;

pub use builder::SnapshotBuilder;
pub use reader::SnapshotReader;

// =============================================================================
// Shared Constants (used by builder and reader)
// =============================================================================

/// Magic bytes identifying a snapshot file
pub(crate) const MAGIC: &[u8; 4] = b"SHKV";

/// Current snapshot format version
pub(crate) const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + Kind (1) + EntryCount (8) = 15 bytes
pub(crate) const HEADER_SIZE: u64 = 15;

/// Offset of the entry count within the header
pub(crate) const COUNT_OFFSET: u64 = 7;

/// Footer size: DataCRC (4)
pub(crate) const FOOTER_SIZE: u64 = 4;

/// Summary of a written snapshot
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    /// Path to the snapshot file
    pub path: PathBuf,
    /// Number of entries written
    pub entry_count: u64,
    /// File size in bytes
    pub file_size: u64,
}
