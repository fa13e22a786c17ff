//! Conversions into `Value`
//!
//! `From` covers the lossless cases. `IntoValue` is the fallible conversion
//! every `Shelf` operation accepts keys and values through: integers that do
//! not fit in `i64` fail here, and Rust types without a dedicated variant
//! (booleans, unit, `Option`) fall back to a blob.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::value::{Blob, Value};
use crate::error::{Result, ShelfError};

/// Fallible conversion into a [`Value`]
pub trait IntoValue {
    fn into_value(self) -> Result<Value>;
}

// =============================================================================
// Lossless Conversions
// =============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeSet<Value>> for Value {
    fn from(items: BTreeSet<Value>) -> Self {
        Value::Set(items)
    }
}

impl From<BTreeMap<Value, Value>> for Value {
    fn from(entries: BTreeMap<Value, Value>) -> Self {
        Value::Map(entries)
    }
}

impl From<Blob> for Value {
    fn from(blob: Blob) -> Self {
        Value::Blob(blob)
    }
}

macro_rules! lossless_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Int(i64::from(n))
                }
            }

            impl IntoValue for $t {
                fn into_value(self) -> Result<Value> {
                    Ok(Value::from(self))
                }
            }
        )*
    };
}

lossless_int!(i8, i16, i32, i64, u8, u16, u32);

// =============================================================================
// Fallible Conversions
// =============================================================================

macro_rules! checked_int {
    ($($t:ty),*) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Result<Value> {
                    i64::try_from(self).map(Value::Int).map_err(|_| {
                        ShelfError::Encoding(format!(
                            "integer {} is outside the signed 64-bit range",
                            self
                        ))
                    })
                }
            }
        )*
    };
}

checked_int!(u64, usize, isize, i128, u128);

impl IntoValue for Value {
    fn into_value(self) -> Result<Value> {
        Ok(self)
    }
}

impl IntoValue for &Value {
    fn into_value(self) -> Result<Value> {
        Ok(self.clone())
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Result<Value> {
        Ok(Value::from(self))
    }
}

impl IntoValue for String {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Text(self))
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Text(self.clone()))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Float(self))
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Result<Value> {
        Ok(Value::from(self))
    }
}

impl IntoValue for Blob {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Blob(self))
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Blob(Blob::from_json(serde_json::Value::Bool(self))))
    }
}

impl IntoValue for () {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Blob(Blob::from_json(serde_json::Value::Null)))
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Result<Value> {
        match self {
            Some(inner) => inner.into_value(),
            None => ().into_value(),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Result<Value> {
        self.into_iter()
            .map(IntoValue::into_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }
}

impl<T: IntoValue, const N: usize> IntoValue for [T; N] {
    fn into_value(self) -> Result<Value> {
        self.into_iter()
            .map(IntoValue::into_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }
}

impl<T: IntoValue> IntoValue for BTreeSet<T> {
    fn into_value(self) -> Result<Value> {
        self.into_iter()
            .map(IntoValue::into_value)
            .collect::<Result<BTreeSet<_>>>()
            .map(Value::Set)
    }
}

impl<T: IntoValue, S> IntoValue for HashSet<T, S> {
    fn into_value(self) -> Result<Value> {
        self.into_iter()
            .map(IntoValue::into_value)
            .collect::<Result<BTreeSet<_>>>()
            .map(Value::Set)
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for BTreeMap<K, V> {
    fn into_value(self) -> Result<Value> {
        self.into_iter()
            .map(|(k, v)| Ok((k.into_value()?, v.into_value()?)))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(Value::Map)
    }
}

impl<K: IntoValue, V: IntoValue, S> IntoValue for HashMap<K, V, S> {
    fn into_value(self) -> Result<Value> {
        self.into_iter()
            .map(|(k, v)| Ok((k.into_value()?, v.into_value()?)))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(Value::Map)
    }
}
