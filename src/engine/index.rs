//! In-memory index
//!
//! Holds the live entries of a `FileEngine`. The tree flavour iterates in
//! key order; the hash flavour in whatever order the table yields.

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;

use crate::config::EngineKind;

/// Concrete index flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Tree,
    Hash,
}

impl IndexKind {
    /// Byte stored in the snapshot header
    pub fn to_byte(self) -> u8 {
        match self {
            IndexKind::Tree => 0,
            IndexKind::Hash => 1,
        }
    }

    pub fn from_byte(byte: u8) -> Option<IndexKind> {
        match byte {
            0 => Some(IndexKind::Tree),
            1 => Some(IndexKind::Hash),
            _ => None,
        }
    }

    /// Pick the flavour for a store, given what an existing snapshot records
    pub fn resolve(requested: EngineKind, recorded: Option<IndexKind>) -> IndexKind {
        match requested {
            EngineKind::Tree => IndexKind::Tree,
            EngineKind::Hash => IndexKind::Hash,
            EngineKind::Auto => recorded.unwrap_or(IndexKind::Tree),
        }
    }
}

/// Entry index
#[derive(Debug)]
pub enum Index {
    Tree(BTreeMap<Bytes, Bytes>),
    Hash(HashMap<Bytes, Bytes>),
}

impl Index {
    /// Create an empty index
    pub fn new(kind: IndexKind) -> Self {
        match kind {
            IndexKind::Tree => Index::Tree(BTreeMap::new()),
            IndexKind::Hash => Index::Hash(HashMap::new()),
        }
    }

    pub fn kind(&self) -> IndexKind {
        match self {
            Index::Tree(_) => IndexKind::Tree,
            Index::Hash(_) => IndexKind::Hash,
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&Bytes> {
        match self {
            Index::Tree(map) => map.get(key),
            Index::Hash(map) => map.get(key),
        }
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        match self {
            Index::Tree(map) => map.contains_key(key),
            Index::Hash(map) => map.contains_key(key),
        }
    }

    /// Insert or overwrite, returning the previous value
    pub fn insert(&mut self, key: Bytes, value: Bytes) -> Option<Bytes> {
        match self {
            Index::Tree(map) => map.insert(key, value),
            Index::Hash(map) => map.insert(key, value),
        }
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<Bytes> {
        match self {
            Index::Tree(map) => map.remove(key),
            Index::Hash(map) => map.remove(key),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Index::Tree(map) => map.len(),
            Index::Hash(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        match self {
            Index::Tree(map) => map.clear(),
            Index::Hash(map) => map.clear(),
        }
    }

    /// Iterate entries in index order
    pub fn iter(&self) -> Box<dyn Iterator<Item = (&Bytes, &Bytes)> + '_> {
        match self {
            Index::Tree(map) => Box::new(map.iter()),
            Index::Hash(map) => Box::new(map.iter()),
        }
    }
}
