//! Shelf Module
//!
//! Dictionary-style handle over a storage engine.
//!
//! ## Responsibilities
//! - Encode every key (and stored value) with the value codec
//! - Decode every byte string read back before returning it
//! - Map absence to `KeyNotFound`, or to a caller-supplied default
//! - Own the engine: close it exactly once, explicitly or on drop
//!
//! ## Ordering
//! `keys()`, `values()` and `items()` follow the engine's native order and
//! agree with each other index by index. The tree engine yields keys sorted
//! by their encoded bytes; the hash engine in an unspecified order.

mod iter;
mod update;

use std::path::Path;

use bytes::Bytes;

use crate::codec::{self, IntoValue, Value};
use crate::config::Config;
use crate::engine::{self, StorageEngine};
use crate::error::{Result, ShelfError};

pub use iter::{Items, Keys, Values};
pub use update::UpdateBatch;

/// A persistent mapping of values to values
///
/// ```ignore
/// let mut shelf = Shelf::open_path("data.db")?;
/// shelf.set("x", 123)?;
/// shelf.set("y", ["456", "789"])?;
/// assert_eq!(shelf.get("x")?, 123);
/// shelf.close()?;
/// ```
pub struct Shelf {
    /// `None` once the handle is closed
    engine: Option<Box<dyn StorageEngine>>,
}

impl Shelf {
    /// Open a store with the built-in engine
    pub fn open(config: Config) -> Result<Self> {
        Ok(Self::with_engine(engine::open(&config)?))
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified store path
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Config::builder().path(path.as_ref()).build())
    }

    /// Wrap an already-open engine
    pub fn with_engine(engine: Box<dyn StorageEngine>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Get the value stored under `key`, or `KeyNotFound`
    pub fn get<K: IntoValue>(&self, key: K) -> Result<Value> {
        let key = key.into_value()?;
        match self.lookup(&key)? {
            Some(value) => Ok(value),
            None => Err(ShelfError::KeyNotFound(key)),
        }
    }

    /// Get the value stored under `key`, or `default` when absent
    pub fn get_or<K: IntoValue>(&self, key: K, default: Value) -> Result<Value> {
        Ok(self.lookup(&key.into_value()?)?.unwrap_or(default))
    }

    /// Get the value stored under `key`, if any
    pub fn get_opt<K: IntoValue>(&self, key: K) -> Result<Option<Value>> {
        self.lookup(&key.into_value()?)
    }

    /// Check for `key` without decoding its value
    pub fn contains<K: IntoValue>(&self, key: K) -> Result<bool> {
        let engine = self.engine()?;
        let raw_key = codec::encode(&key.into_value()?)?;
        engine.contains(&raw_key)
    }

    /// Number of entries
    pub fn len(&self) -> Result<usize> {
        self.engine()?.count()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert or overwrite the entry for `key`
    pub fn set<K: IntoValue, V: IntoValue>(&mut self, key: K, value: V) -> Result<()> {
        let raw_key = codec::encode(&key.into_value()?)?;
        let raw_value = codec::encode(&value.into_value()?)?;
        self.engine_mut()?
            .set(Bytes::from(raw_key), Bytes::from(raw_value))
    }

    /// Remove the entry for `key`, or fail with `KeyNotFound`
    pub fn delete<K: IntoValue>(&mut self, key: K) -> Result<()> {
        let key = key.into_value()?;
        if self.remove(&key)? {
            Ok(())
        } else {
            Err(ShelfError::KeyNotFound(key))
        }
    }

    /// Remove the entry for `key`, reporting whether it existed
    pub fn remove<K: IntoValue>(&mut self, key: K) -> Result<bool> {
        let raw_key = codec::encode(&key.into_value()?)?;
        Ok(self.engine_mut()?.remove(&raw_key)?.is_some())
    }

    /// Remove the entry for `key` and return its value, or `KeyNotFound`
    pub fn pop<K: IntoValue>(&mut self, key: K) -> Result<Value> {
        let key = key.into_value()?;
        match self.take(&key)? {
            Some(value) => Ok(value),
            None => Err(ShelfError::KeyNotFound(key)),
        }
    }

    /// Remove the entry for `key` and return its value, or `default` when
    /// absent (the store is left unchanged)
    pub fn pop_or<K: IntoValue>(&mut self, key: K, default: Value) -> Result<Value> {
        Ok(self.take(&key.into_value()?)?.unwrap_or(default))
    }

    /// Remove every entry
    pub fn clear(&mut self) -> Result<()> {
        self.engine_mut()?.clear()
    }

    /// Apply a batch of writes in order: positional entries, then named ones.
    ///
    /// Every entry is encoded before the first write, so an encoding failure
    /// leaves the store untouched.
    pub fn update(&mut self, batch: UpdateBatch) -> Result<()> {
        let engine = self.engine_mut()?;

        let encoded = batch
            .into_entries()
            .map(|(key, value)| {
                Ok((
                    Bytes::from(codec::encode(&key)?),
                    Bytes::from(codec::encode(&value)?),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let count = encoded.len();
        for (key, value) in encoded {
            engine.set(key, value)?;
        }

        tracing::debug!(entries = count, "update batch applied");
        Ok(())
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// All keys, in engine order
    pub fn keys(&self) -> Result<Vec<Value>> {
        self.iter_keys()?.collect()
    }

    /// All values, in the same order as `keys()`
    pub fn values(&self) -> Result<Vec<Value>> {
        self.iter_values()?.collect()
    }

    /// All (key, value) pairs, in the same order as `keys()`
    pub fn items(&self) -> Result<Vec<(Value, Value)>> {
        self.iter_items()?.collect()
    }

    pub fn iter_keys(&self) -> Result<Keys<'_>> {
        Ok(Keys {
            inner: self.engine()?.iter()?,
        })
    }

    pub fn iter_values(&self) -> Result<Values<'_>> {
        Ok(Values {
            inner: self.engine()?.iter()?,
        })
    }

    pub fn iter_items(&self) -> Result<Items<'_>> {
        Ok(Items {
            inner: self.engine()?.iter()?,
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Backing store path, as the engine reports it
    pub fn path(&self) -> Result<&Path> {
        Ok(self.engine()?.path())
    }

    /// Push buffered writes to durable storage
    pub fn sync(&mut self) -> Result<()> {
        self.engine_mut()?.sync()
    }

    /// Release the engine. Every later call fails with `ClosedHandle`.
    pub fn close(&mut self) -> Result<()> {
        let mut engine = self.engine.take().ok_or(ShelfError::ClosedHandle)?;
        engine.close()
    }

    pub fn is_closed(&self) -> bool {
        self.engine.is_none()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn engine(&self) -> Result<&dyn StorageEngine> {
        self.engine.as_deref().ok_or(ShelfError::ClosedHandle)
    }

    fn engine_mut(&mut self) -> Result<&mut (dyn StorageEngine + 'static)> {
        self.engine.as_deref_mut().ok_or(ShelfError::ClosedHandle)
    }

    fn lookup(&self, key: &Value) -> Result<Option<Value>> {
        let engine = self.engine()?;
        let raw_key = codec::encode(key)?;
        engine
            .get(&raw_key)?
            .map(|raw| codec::decode(&raw))
            .transpose()
    }

    /// Decode first, then remove, so an undecodable entry stays in place
    fn take(&mut self, key: &Value) -> Result<Option<Value>> {
        let raw_key = codec::encode(key)?;
        let engine = self.engine_mut()?;
        let value = match engine.get(&raw_key)? {
            Some(raw) => codec::decode(&raw)?,
            None => return Ok(None),
        };
        engine.remove(&raw_key)?;
        Ok(Some(value))
    }
}

impl Drop for Shelf {
    fn drop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            if let Err(e) = engine.close() {
                tracing::warn!(error = %e, "failed to close store on drop");
            }
        }
    }
}
