//! Configuration for shelfkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, ShelfError};

/// Main configuration for opening a store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the store file. The journal lives next to it:
    ///   {path}           (snapshot)
    ///   {path}.journal   (append-only mutation log)
    pub path: PathBuf,

    /// Which index the built-in engine keeps entries in
    pub engine: EngineKind,

    /// Access mode used when opening the store
    pub mode: OpenMode,

    // -------------------------------------------------------------------------
    // Journal Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the journal
    pub sync_strategy: SyncStrategy,

    /// Number of journal entries that triggers a snapshot rewrite
    pub compaction_threshold: usize,
}

/// Engine flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// B-tree index: iteration in encoded-key order
    Tree,

    /// Hash index: iteration order is implementation-defined
    Hash,

    /// Reuse the kind recorded in an existing store, `Tree` for a new one
    Auto,
}

impl EngineKind {
    /// Parse an engine name as accepted on the command line
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "tree" | "treedb" => Ok(EngineKind::Tree),
            "hash" | "hashdb" => Ok(EngineKind::Hash),
            "auto" | "poly" | "polydb" => Ok(EngineKind::Auto),
            other => Err(ShelfError::Config(format!(
                "Database type {} is not supported",
                other
            ))),
        }
    }
}

/// Access mode flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    /// Allow mutations
    pub write: bool,

    /// Create the store file if it does not exist
    pub create: bool,

    /// Discard any existing contents on open
    pub truncate: bool,
}

impl OpenMode {
    /// Read-only access to an existing store
    pub const READ_ONLY: OpenMode = OpenMode {
        write: false,
        create: false,
        truncate: false,
    };

    /// Read-write access, creating the store when missing
    pub const READ_WRITE: OpenMode = OpenMode {
        write: true,
        create: true,
        truncate: false,
    };

    /// Read-write access to a fresh, empty store
    pub const TRUNCATE: OpenMode = OpenMode {
        write: true,
        create: true,
        truncate: true,
    };
}

impl Default for OpenMode {
    fn default() -> Self {
        OpenMode::READ_WRITE
    }
}

/// Journal sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./shelf.db"),
            engine: EngineKind::Auto,
            mode: OpenMode::default(),
            sync_strategy: SyncStrategy::EveryNEntries { count: 100 },
            compaction_threshold: 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject combinations the engine cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(ShelfError::Config("store path is empty".to_string()));
        }
        if self.compaction_threshold == 0 {
            return Err(ShelfError::Config(
                "compaction_threshold must be at least 1".to_string(),
            ));
        }
        if let SyncStrategy::EveryNEntries { count: 0 } = self.sync_strategy {
            return Err(ShelfError::Config(
                "EveryNEntries sync count must be at least 1".to_string(),
            ));
        }
        if self.mode.truncate && !self.mode.write {
            return Err(ShelfError::Config(
                "truncate requires write access".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the journal kept next to the store file
    pub fn journal_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".journal");
        PathBuf::from(name)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the engine flavour
    pub fn engine(mut self, engine: EngineKind) -> Self {
        self.config.engine = engine;
        self
    }

    /// Set the access mode
    pub fn mode(mut self, mode: OpenMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Open read-only (shorthand for `mode(OpenMode::READ_ONLY)`)
    pub fn read_only(self) -> Self {
        self.mode(OpenMode::READ_ONLY)
    }

    /// Set the journal sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the number of journal entries that triggers compaction
    pub fn compaction_threshold(mut self, entries: usize) -> Self {
        self.config.compaction_threshold = entries;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
