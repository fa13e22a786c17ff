//! Bulk updates
//!
//! An [`UpdateBatch`] gathers the entries for one [`Shelf::update`] call.
//! Positional entries (from mappings or pair sequences) are applied first in
//! the order given, then named entries, so a named entry wins over a
//! positional one with the same text key.
//!
//! [`Shelf::update`]: crate::Shelf::update

use crate::codec::{IntoValue, Value};
use crate::error::Result;

/// Entries for a single `update` call
#[derive(Debug, Clone, Default)]
pub struct UpdateBatch {
    positional: Vec<(Value, Value)>,
    named: Vec<(String, Value)>,
}

impl UpdateBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every entry of a mapping or a sequence of pairs
    pub fn pairs<I, K, V>(mut self, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: IntoValue,
        V: IntoValue,
    {
        for (key, value) in entries {
            self.positional.push((key.into_value()?, value.into_value()?));
        }
        Ok(self)
    }

    /// Add a single positional entry
    pub fn push<K: IntoValue, V: IntoValue>(mut self, key: K, value: V) -> Result<Self> {
        self.positional.push((key.into_value()?, value.into_value()?));
        Ok(self)
    }

    /// Add a named entry; the name becomes a text key
    pub fn named<V: IntoValue>(mut self, name: impl Into<String>, value: V) -> Result<Self> {
        self.named.push((name.into(), value.into_value()?));
        Ok(self)
    }

    /// Total number of writes the batch will perform
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in application order: positional first, then named
    pub(crate) fn into_entries(self) -> impl Iterator<Item = (Value, Value)> {
        self.positional.into_iter().chain(
            self.named
                .into_iter()
                .map(|(name, value)| (Value::Text(name), value)),
        )
    }
}
