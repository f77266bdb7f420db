//! Dynamic host values
//!
//! [`Variant`] is the native-side picture of a value owned by the host. It
//! carries just enough structure to round-trip everything the binding
//! exchanges without losing type or precision information.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Host-side type of a value, as `typeof` would report it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Object,
    Array,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Undefined => "undefined",
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Object => "object",
            ValueType::Array => "array",
        };
        f.write_str(name)
    }
}

/// A value crossing the boundary
///
/// Integers keep the representation they were produced with so that the
/// full `i64` and `u64` ranges survive a round trip; the host only sees a
/// single number type.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Variant {
    Undefined,
    Null,
    Bool(bool),
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    String(String),
    Array(Vec<Variant>),
    Object(BTreeMap<String, Variant>),
}

#[derive(Clone, Copy)]
enum Numeric {
    Int(i128),
    Float(f64),
}

impl Variant {
    /// Host type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Variant::Undefined => ValueType::Undefined,
            Variant::Null => ValueType::Null,
            Variant::Bool(_) => ValueType::Boolean,
            Variant::Int64(_) | Variant::UInt64(_) | Variant::Float64(_) => ValueType::Number,
            Variant::String(_) => ValueType::String,
            Variant::Array(_) => ValueType::Array,
            Variant::Object(_) => ValueType::Object,
        }
    }

    /// Build an object from key/value pairs
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Variant)>,
    {
        Variant::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Variant::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Variant::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Variant]> {
        match self {
            Variant::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Variant>> {
        match self {
            Variant::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a property on an object value
    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.as_object().and_then(|map| map.get(key))
    }

    fn numeric(&self) -> Option<Numeric> {
        match self {
            Variant::Int64(i) => Some(Numeric::Int(i128::from(*i))),
            Variant::UInt64(u) => Some(Numeric::Int(i128::from(*u))),
            Variant::Float64(f) => Some(Numeric::Float(*f)),
            _ => None,
        }
    }
}

fn numeric_eq(a: Numeric, b: Numeric) -> bool {
    match (a, b) {
        (Numeric::Int(a), Numeric::Int(b)) => a == b,
        (Numeric::Float(a), Numeric::Float(b)) => {
            (a == b && a.is_sign_negative() == b.is_sign_negative()) || (a.is_nan() && b.is_nan())
        }
        (Numeric::Int(i), Numeric::Float(f)) | (Numeric::Float(f), Numeric::Int(i)) => {
            // i128 covers both integer variants; out-of-range floats saturate and never match.
            // An integer zero reaches the host as +0.
            f.is_finite() && f.fract() == 0.0 && !(f == 0.0 && f.is_sign_negative()) && f as i128 == i
        }
    }
}

/// Deep equality: structural, order-insensitive for object keys, and
/// numeric variants compare by value regardless of representation.
/// Numbers follow `Object.is`: NaN equals NaN and `-0` differs from `0`.
impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variant::Undefined, Variant::Undefined) | (Variant::Null, Variant::Null) => true,
            (Variant::Bool(a), Variant::Bool(b)) => a == b,
            (Variant::String(a), Variant::String(b)) => a == b,
            (Variant::Array(a), Variant::Array(b)) => a == b,
            (Variant::Object(a), Variant::Object(b)) => a == b,
            _ => match (self.numeric(), other.numeric()) {
                (Some(a), Some(b)) => numeric_eq(a, b),
                _ => false,
            },
        }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Undefined
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Undefined => f.write_str("undefined"),
            Variant::Float64(n) => write!(f, "{}", n),
            other => match serde_json::to_string(other) {
                Ok(json) => f.write_str(&json),
                Err(_) => f.write_str("<unprintable>"),
            },
        }
    }
}

impl From<JsonValue> for Variant {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Variant::Null,
            JsonValue::Bool(b) => Variant::Bool(b),
            JsonValue::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Variant::UInt64(u)
                } else if let Some(i) = n.as_i64() {
                    Variant::Int64(i)
                } else {
                    Variant::Float64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Variant::String(s),
            JsonValue::Array(items) => Variant::Array(items.into_iter().map(Variant::from).collect()),
            JsonValue::Object(map) => {
                Variant::Object(map.into_iter().map(|(k, v)| (k, Variant::from(v))).collect())
            }
        }
    }
}

impl TryFrom<Variant> for JsonValue {
    type Error = Error;

    fn try_from(value: Variant) -> Result<Self> {
        Ok(match value {
            Variant::Undefined | Variant::Null => JsonValue::Null,
            Variant::Bool(b) => JsonValue::Bool(b),
            Variant::Int64(i) => JsonValue::from(i),
            Variant::UInt64(u) => JsonValue::from(u),
            Variant::Float64(f) => serde_json::Number::from_f64(f)
                .map(JsonValue::Number)
                .ok_or_else(|| Error::NotRepresentable(format!("{} has no JSON form", f)))?,
            Variant::String(s) => JsonValue::String(s),
            Variant::Array(items) => JsonValue::Array(
                items
                    .into_iter()
                    .map(JsonValue::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Variant::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| JsonValue::try_from(v).map(|v| (k, v)))
                    .collect::<Result<serde_json::Map<_, _>>>()?,
            ),
        })
    }
}
