//! Engine Module
//!
//! The raw-bytes storage contract a [`Shelf`](crate::Shelf) is layered on,
//! plus the built-in file-backed implementation.
//!
//! ## Contract
//! - Keys and values are opaque byte strings
//! - `set` is an upsert; keys are unique
//! - `iter` walks entries in the engine's native order (sorted for a tree
//!   index, implementation-defined for a hash index)
//!
//! Any type implementing [`StorageEngine`] can back a `Shelf` through
//! [`Shelf::with_engine`](crate::Shelf::with_engine).

mod file;
mod index;

use std::path::Path;

use bytes::Bytes;

use crate::config::Config;
use crate::error::Result;

pub use file::FileEngine;
pub use index::{Index, IndexKind};

/// One raw store entry: (key bytes, value bytes)
pub type RawEntry = (Bytes, Bytes);

/// Cursor over raw entries in engine-native order
pub type RawIter<'a> = Box<dyn Iterator<Item = Result<RawEntry>> + 'a>;

/// Raw-bytes storage engine
pub trait StorageEngine: Send {
    /// Look up the value stored under `key`
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>>;

    /// Check for `key` without materializing its value
    fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Insert or overwrite an entry
    fn set(&mut self, key: Bytes, value: Bytes) -> Result<()>;

    /// Remove an entry, returning the value it held
    fn remove(&mut self, key: &[u8]) -> Result<Option<Bytes>>;

    /// Number of entries
    fn count(&self) -> Result<usize>;

    /// Remove every entry
    fn clear(&mut self) -> Result<()>;

    /// Walk all entries in native order
    fn iter(&self) -> Result<RawIter<'_>>;

    /// Backing file path
    fn path(&self) -> &Path;

    /// Push buffered writes to durable storage
    fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release the store; the engine must not be used afterwards
    fn close(&mut self) -> Result<()>;
}

/// Open the built-in engine described by `config`
pub fn open(config: &Config) -> Result<Box<dyn StorageEngine>> {
    Ok(Box::new(FileEngine::open(config)?))
}
