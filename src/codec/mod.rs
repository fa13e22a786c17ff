//! Value Codec Module
//!
//! Converts typed values to and from the tagged byte records stored in the
//! engine's value slots (and used as engine keys).
//!
//! ## Record Format
//! ```text
//! ┌──────────┬─────────────────────────────────────────┐
//! │ Tag (1)  │         Payload                         │
//! └──────────┴─────────────────────────────────────────┘
//! ```
//!
//! ### Payload by Tag
//! - 0x01 TEXT:  len (4) + UTF-8 bytes
//! - 0x02 INT:   i64 two's complement (8)
//! - 0x03 FLOAT: IEEE-754 f64 bits (8)
//! - 0x04 LIST:  count (4) + records, in sequence order
//! - 0x05 SET:   count (4) + records, ascending value order
//! - 0x06 MAP:   count (4) + (key record, value record) pairs, ascending key order
//! - 0x07 BLOB:  len (4) + JSON document
//!
//! Sets and maps are written in value order, so equal values always produce
//! identical records. Blob payloads are canonical JSON (sorted object keys);
//! a set packed inside a blob comes back as an array.

mod convert;
mod record;
mod value;

pub use convert::IntoValue;
pub use record::{decode, encode, encode_into, MAX_DEPTH};
pub use value::{Blob, Tag, Value, BLOB_MAX_NESTING};
