//! Lazy iterators over a shelf
//!
//! Each iterator walks the engine cursor one entry per `next()` and decodes
//! only what it yields. They borrow the shelf immutably, so the store cannot
//! be mutated while one is alive. They are finite and not restartable.

use crate::codec::{self, Value};
use crate::engine::RawIter;
use crate::error::Result;

/// Iterator over decoded keys
pub struct Keys<'a> {
    pub(super) inner: RawIter<'a>,
}

impl Iterator for Keys<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        Some(entry.and_then(|(key, _)| codec::decode(&key)))
    }
}

/// Iterator over decoded values
pub struct Values<'a> {
    pub(super) inner: RawIter<'a>,
}

impl Iterator for Values<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        Some(entry.and_then(|(_, value)| codec::decode(&value)))
    }
}

/// Iterator over decoded (key, value) pairs
pub struct Items<'a> {
    pub(super) inner: RawIter<'a>,
}

impl Iterator for Items<'_> {
    type Item = Result<(Value, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        Some(entry.and_then(|(key, value)| Ok((codec::decode(&key)?, codec::decode(&value)?))))
    }
}
