//! Typed values
//!
//! The tagged union every key and value stored through a [`Shelf`](crate::Shelf)
//! is expressed in.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, ShelfError};

/// Record tags, one per `Value` variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    Text = 0x01,
    Int = 0x02,
    Float = 0x03,
    List = 0x04,
    Set = 0x05,
    Map = 0x06,
    Blob = 0x07,
}

impl Tag {
    /// Map a leading record byte back to its tag
    pub fn from_byte(byte: u8) -> Option<Tag> {
        match byte {
            0x01 => Some(Tag::Text),
            0x02 => Some(Tag::Int),
            0x03 => Some(Tag::Float),
            0x04 => Some(Tag::List),
            0x05 => Some(Tag::Set),
            0x06 => Some(Tag::Map),
            0x07 => Some(Tag::Blob),
            _ => None,
        }
    }
}

/// A typed value
///
/// Values are totally ordered: first by variant (in tag order), then by
/// content, with floats compared by IEEE-754 total order. `Int(1)` and
/// `Float(1.0)` are distinct values because they encode to distinct records.
#[derive(Debug, Clone)]
pub enum Value {
    /// UTF-8 text
    Text(String),

    /// Signed 64-bit integer
    Int(i64),

    /// 64-bit float
    Float(f64),

    /// Ordered sequence
    List(Vec<Value>),

    /// Unordered collection of unique values
    Set(BTreeSet<Value>),

    /// Mapping of values to values
    Map(BTreeMap<Value, Value>),

    /// Any other structured data, kept in a self-describing form
    Blob(Blob),
}

impl Value {
    /// Get the record tag for this value
    pub fn tag(&self) -> Tag {
        match self {
            Value::Text(_) => Tag::Text,
            Value::Int(_) => Tag::Int,
            Value::Float(_) => Tag::Float,
            Value::List(_) => Tag::List,
            Value::Set(_) => Tag::Set,
            Value::Map(_) => Tag::Map,
            Value::Blob(_) => Tag::Blob,
        }
    }

    /// Human-readable name of the variant
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Blob(_) => "blob",
        }
    }

    /// Wrap any serializable data as an opaque blob.
    ///
    /// Fails with an encoding error when the data has no JSON form, for
    /// example a map whose keys do not serialize as strings.
    pub fn pack<T: Serialize + ?Sized>(data: &T) -> Result<Value> {
        let json = serde_json::to_value(data)
            .map_err(|e| ShelfError::Encoding(format!("cannot serialize blob: {}", e)))?;
        Ok(Value::Blob(Blob::from_json(json)))
    }

    /// Rebuild typed data from a blob produced by [`Value::pack`]
    pub fn unpack<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Value::Blob(blob) => serde_json::from_value(blob.as_json().clone())
                .map_err(|e| ShelfError::Decoding(format!("cannot rebuild blob: {}", e))),
            other => Err(ShelfError::Decoding(format!(
                "expected blob, found {}",
                other.type_name()
            ))),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<Value>> {
        match self {
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<Value, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Value::Blob(blob) => Some(blob),
            _ => None,
        }
    }
}

// =============================================================================
// Ordering and Equality
// =============================================================================

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::List(a), Value::List(b)) => a.cmp(b),
            (Value::Set(a), Value::Set(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => a.cmp(b),
            (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
            _ => (self.tag() as u8).cmp(&(other.tag() as u8)),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        self.as_int() == Some(*other)
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        self.as_float() == Some(*other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Set(items) if items.is_empty() => write!(f, "set()"),
            Value::Set(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Blob(blob) => write!(f, "blob({})", blob),
        }
    }
}

// =============================================================================
// Blob
// =============================================================================

/// Deepest array/object nesting a blob may carry. The JSON parser refuses
/// anything deeper, so such a blob could be written but never read back.
pub const BLOB_MAX_NESTING: usize = 127;

/// Opaque fallback payload
///
/// Held as a JSON document together with its canonical rendering. Object
/// keys are kept sorted, so equal documents render to identical bytes.
/// Ordering and equality both compare the rendering.
#[derive(Debug, Clone)]
pub struct Blob {
    json: serde_json::Value,
    canonical: String,
}

impl Blob {
    pub fn from_json(json: serde_json::Value) -> Self {
        let canonical = json.to_string();
        Self { json, canonical }
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.json
    }

    pub fn into_json(self) -> serde_json::Value {
        self.json
    }

    /// Canonical payload bytes
    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>> {
        if exceeds_nesting(&self.json, 0) {
            return Err(ShelfError::Encoding(format!(
                "blob nests deeper than {} levels",
                BLOB_MAX_NESTING
            )));
        }
        Ok(self.canonical.as_bytes().to_vec())
    }

    /// Parse payload bytes written by [`Blob::to_bytes`]
    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map(Blob::from_json)
            .map_err(|e| ShelfError::Decoding(format!("invalid blob payload: {}", e)))
    }
}

/// True when `json` nests deeper than [`BLOB_MAX_NESTING`]. `depth` counts
/// the containers enclosing `json`; descent stops once the limit is passed.
fn exceeds_nesting(json: &serde_json::Value, depth: usize) -> bool {
    match json {
        serde_json::Value::Array(items) => {
            depth >= BLOB_MAX_NESTING || items.iter().any(|item| exceeds_nesting(item, depth + 1))
        }
        serde_json::Value::Object(fields) => {
            depth >= BLOB_MAX_NESTING
                || fields.values().any(|field| exceeds_nesting(field, depth + 1))
        }
        _ => false,
    }
}

impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl Ord for Blob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl PartialOrd for Blob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Blob {}
