//! Error types for shelfkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::codec::Value;

/// Result type alias using ShelfError
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Unified error type for shelfkv operations
#[derive(Debug, Error)]
pub enum ShelfError {
    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    // -------------------------------------------------------------------------
    // Mapping Errors
    // -------------------------------------------------------------------------
    #[error("Key not found: {0}")]
    KeyNotFound(Value),

    #[error("Operation on a closed handle")]
    ClosedHandle,

    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage corruption detected: {0}")]
    Corruption(String),

    #[error("Store is opened read-only")]
    ReadOnly,

    #[error("Engine error: {0}")]
    Engine(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShelfError {
    /// True for failures raised by the storage engine rather than this layer
    pub fn is_engine_error(&self) -> bool {
        matches!(
            self,
            ShelfError::Io(_) | ShelfError::Corruption(_) | ShelfError::ReadOnly | ShelfError::Engine(_)
        )
    }
}
