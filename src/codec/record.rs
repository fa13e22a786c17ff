//! Record codec
//!
//! Encoding and decoding functions for value records.
//!
//! ## Record Format
//!
//! ```text
//! ┌──────────┬─────────────────────────────────────────┐
//! │ Tag (1)  │         Payload (by tag)                │
//! └──────────┴─────────────────────────────────────────┘
//! ```
//!
//! All multi-byte integers are big-endian. Containers nest complete records,
//! so every element carries its own tag.

use std::collections::{BTreeMap, BTreeSet};

use super::value::{Blob, Tag, Value};
use crate::error::{Result, ShelfError};

/// Deepest container nesting accepted by either direction
pub const MAX_DEPTH: usize = 128;

/// Size of a length or count prefix
const LEN_SIZE: usize = 4;

/// Smallest possible record: a tag plus an empty length prefix
const MIN_RECORD_SIZE: usize = 1 + LEN_SIZE;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value into a new record
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_into(value, &mut buf)?;
    Ok(buf)
}

/// Encode a value, appending the record to `buf`.
///
/// On error `buf` may hold a partial record.
pub fn encode_into(value: &Value, buf: &mut Vec<u8>) -> Result<()> {
    encode_value(value, buf, 0)
}

fn encode_value(value: &Value, buf: &mut Vec<u8>, depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(ShelfError::Encoding(format!(
            "value nests deeper than {} levels",
            MAX_DEPTH
        )));
    }

    buf.push(value.tag() as u8);

    match value {
        Value::Text(s) => {
            put_len(buf, s.len(), "text")?;
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Int(n) => buf.extend_from_slice(&n.to_be_bytes()),
        Value::Float(x) => buf.extend_from_slice(&x.to_bits().to_be_bytes()),
        Value::List(items) => {
            put_len(buf, items.len(), "list")?;
            for item in items {
                encode_value(item, buf, depth + 1)?;
            }
        }
        Value::Set(items) => {
            put_len(buf, items.len(), "set")?;
            for item in items {
                encode_value(item, buf, depth + 1)?;
            }
        }
        Value::Map(entries) => {
            put_len(buf, entries.len(), "map")?;
            for (key, value) in entries {
                encode_value(key, buf, depth + 1)?;
                encode_value(value, buf, depth + 1)?;
            }
        }
        Value::Blob(blob) => {
            let payload = blob.to_bytes()?;
            put_len(buf, payload.len(), "blob")?;
            buf.extend_from_slice(&payload);
        }
    }

    Ok(())
}

fn put_len(buf: &mut Vec<u8>, len: usize, what: &str) -> Result<()> {
    let len = u32::try_from(len).map_err(|_| {
        ShelfError::Encoding(format!("{} of {} elements exceeds the record limit", what, len))
    })?;
    buf.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a complete record.
///
/// The record must be consumed exactly; trailing bytes are an error.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    if bytes.is_empty() {
        return Err(ShelfError::Decoding("empty record".to_string()));
    }

    let mut reader = RecordReader { bytes, pos: 0 };
    let value = reader.read_value(0)?;

    if reader.remaining() != 0 {
        return Err(ShelfError::Decoding(format!(
            "{} trailing bytes after record",
            reader.remaining()
        )));
    }

    Ok(value)
}

/// Cursor over a record being decoded
struct RecordReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(ShelfError::Decoding(format!(
                "truncated record: need {} bytes at offset {}, have {}",
                len,
                self.pos,
                self.remaining()
            )));
        }
        let bytes = self.bytes;
        let slice = &bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_len(&mut self) -> Result<usize> {
        Ok(u32::from_be_bytes(self.read_array()?) as usize)
    }

    /// Read an element count, rejecting counts the remaining bytes cannot hold
    fn read_count(&mut self, records_per_element: usize) -> Result<usize> {
        let count = self.read_len()?;
        let needed = count
            .saturating_mul(records_per_element)
            .saturating_mul(MIN_RECORD_SIZE);
        if needed > self.remaining() {
            return Err(ShelfError::Decoding(format!(
                "count {} exceeds the {} remaining bytes",
                count,
                self.remaining()
            )));
        }
        Ok(count)
    }

    fn read_value(&mut self, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(ShelfError::Decoding(format!(
                "record nests deeper than {} levels",
                MAX_DEPTH
            )));
        }

        let [tag_byte] = self.read_array::<1>()?;
        let tag = Tag::from_byte(tag_byte).ok_or_else(|| {
            ShelfError::Decoding(format!("unknown record tag: 0x{:02x}", tag_byte))
        })?;

        match tag {
            Tag::Text => {
                let len = self.read_len()?;
                let raw = self.take(len)?;
                let text = std::str::from_utf8(raw)
                    .map_err(|e| ShelfError::Decoding(format!("text is not UTF-8: {}", e)))?;
                Ok(Value::Text(text.to_string()))
            }
            Tag::Int => Ok(Value::Int(i64::from_be_bytes(self.read_array()?))),
            Tag::Float => Ok(Value::Float(f64::from_bits(u64::from_be_bytes(
                self.read_array()?,
            )))),
            Tag::List => {
                let count = self.read_count(1)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.read_value(depth + 1)?);
                }
                Ok(Value::List(items))
            }
            Tag::Set => {
                let count = self.read_count(1)?;
                let mut items = BTreeSet::new();
                for _ in 0..count {
                    items.insert(self.read_value(depth + 1)?);
                }
                Ok(Value::Set(items))
            }
            Tag::Map => {
                let count = self.read_count(2)?;
                let mut entries = BTreeMap::new();
                for _ in 0..count {
                    let key = self.read_value(depth + 1)?;
                    let value = self.read_value(depth + 1)?;
                    entries.insert(key, value);
                }
                Ok(Value::Map(entries))
            }
            Tag::Blob => {
                let len = self.read_len()?;
                let payload = self.take(len)?;
                Ok(Value::Blob(Blob::from_bytes(payload)?))
            }
        }
    }
}
