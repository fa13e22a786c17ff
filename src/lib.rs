//! # ShelfKV
//!
//! A persistent, dictionary-like key-value store with:
//! - Structured keys and values (text, integers, floats, lists, sets, maps)
//! - A self-describing, deterministic binary encoding for every stored item
//! - Pluggable raw-bytes storage engines
//! - A journaled, snapshot-based built-in engine with crash recovery
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                           Shelf                              │
//! │          (get / set / delete / pop / keys / update)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Value  <──>  bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Value Codec                           │
//! │               (tagged, big-endian, canonical)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  dyn StorageEngine                           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Journal   │          │    Index    │
//!   │  (Append)   │          │ (Tree/Hash) │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  Snapshot   │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod journal;
pub mod storage;
pub mod engine;
pub mod shelf;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, ShelfError};
pub use config::{Config, EngineKind, OpenMode, SyncStrategy};
pub use codec::{Blob, IntoValue, Value};
pub use engine::{FileEngine, StorageEngine};
pub use shelf::{Shelf, UpdateBatch};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ShelfKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
