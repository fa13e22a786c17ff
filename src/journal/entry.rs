//! Journal entry definitions
//!
//! Defines the structure of individual journal entries and their framing.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShelfError};

/// Frame header size: Seq (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// A single entry in the journal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Sequence number - monotonically increasing within a journal
    pub seq: u64,

    /// The mutation to replay
    pub operation: Operation,
}

/// Mutations that can be journaled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Insert or overwrite an entry
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Remove an entry
    Delete { key: Vec<u8> },

    /// Remove every entry
    Clear,
}

impl JournalEntry {
    pub fn new(seq: u64, operation: Operation) -> Self {
        Self { seq, operation }
    }

    /// Serialize into a complete frame: seq (8) + crc (4) + len (4) + payload
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let payload = self.payload()?;
        let len = u32::try_from(payload.len()).map_err(|_| {
            ShelfError::Engine(format!("journal entry of {} bytes is too large", payload.len()))
        })?;
        let crc = frame_crc(self.seq, &payload);

        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&self.seq.to_le_bytes());
        frame.extend_from_slice(&crc.to_le_bytes());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Parse one complete frame, verifying its checksum
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(ShelfError::Corruption(format!(
                "journal frame header too small: {} bytes",
                bytes.len()
            )));
        }

        let header = FrameHeader::parse(&bytes[..HEADER_SIZE]);
        let end = HEADER_SIZE + header.len;
        if bytes.len() < end {
            return Err(ShelfError::Corruption(format!(
                "journal frame truncated: expected {} bytes, got {}",
                end,
                bytes.len()
            )));
        }

        Self::from_parts(&header, &bytes[HEADER_SIZE..end])
    }

    /// Build an entry from an already-split header and payload
    pub(super) fn from_parts(header: &FrameHeader, payload: &[u8]) -> Result<Self> {
        let actual = frame_crc(header.seq, payload);
        if actual != header.crc {
            return Err(ShelfError::Corruption(format!(
                "journal CRC mismatch at seq {}: expected {:08x}, got {:08x}",
                header.seq, header.crc, actual
            )));
        }

        let operation = bincode::deserialize(payload).map_err(|e| {
            ShelfError::Corruption(format!("undecodable journal entry {}: {}", header.seq, e))
        })?;

        Ok(Self {
            seq: header.seq,
            operation,
        })
    }

    /// Total frame size in bytes
    pub fn serialized_size(&self) -> Result<usize> {
        let payload_len = bincode::serialized_size(&self.operation)
            .map_err(|e| ShelfError::Engine(format!("journal encode failed: {}", e)))?;
        Ok(HEADER_SIZE + payload_len as usize)
    }

    /// CRC over the sequence number and payload
    pub fn compute_crc(&self) -> Result<u32> {
        Ok(frame_crc(self.seq, &self.payload()?))
    }

    fn payload(&self) -> Result<Vec<u8>> {
        bincode::serialize(&self.operation)
            .map_err(|e| ShelfError::Engine(format!("journal encode failed: {}", e)))
    }
}

/// Decoded frame header
#[derive(Debug, Clone, Copy)]
pub(super) struct FrameHeader {
    pub seq: u64,
    pub crc: u32,
    pub len: usize,
}

impl FrameHeader {
    /// Parse the first `HEADER_SIZE` bytes of a frame
    pub fn parse(header: &[u8]) -> Self {
        let mut seq = [0u8; 8];
        let mut crc = [0u8; 4];
        let mut len = [0u8; 4];
        seq.copy_from_slice(&header[0..8]);
        crc.copy_from_slice(&header[8..12]);
        len.copy_from_slice(&header[12..16]);

        Self {
            seq: u64::from_le_bytes(seq),
            crc: u32::from_le_bytes(crc),
            len: u32::from_le_bytes(len) as usize,
        }
    }
}

fn frame_crc(seq: u64, payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&seq.to_le_bytes());
    hasher.update(payload);
    hasher.finalize()
}
