//! Journal Module
//!
//! Append-only log of engine mutations made since the last snapshot.
//!
//! ## Responsibilities
//! - Append a frame before the in-memory index changes
//! - CRC32 checksums for corruption detection
//! - Sequence numbers for ordering
//! - Replay on open, stopping at a torn tail
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Entry 1                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ Seq (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Entry 2                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ Seq (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//!
//! `Data` is the bincode encoding of an [`Operation`]; the CRC covers the
//! sequence number and the data.

mod entry;
mod reader;
mod recovery;
mod writer;

pub use entry::{JournalEntry, Operation, HEADER_SIZE};
pub use reader::{JournalIterator, JournalReader};
pub use recovery::{JournalRecovery, RecoveryResult};
pub use writer::JournalWriter;
