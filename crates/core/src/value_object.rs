//! Value objects: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.
//!
//! [`Frozen`] is the generic immutable wrapper: it hands out shared references only,
//! so the wrapped value cannot be changed after construction. Dynamic payloads
//! (records and lists built at runtime) go through [`deep_freeze`], which turns a
//! mutable [`Payload`] tree into a read-only [`FrozenPayload`] tree.
//!
//! Opaque values ([`SharedDate`]) are not frozen: they keep their own interior
//! state and remain usable through their handle after the surrounding tree is frozen.
//!
//! ```compile_fail
//! use catalog_core::value_object::{deep_freeze, Payload};
//!
//! let frozen = deep_freeze(Payload::record([("prop1", Payload::from("test"))]));
//! // No mutable access exists on a frozen tree.
//! *frozen.get_mut("prop1").unwrap() = Payload::from("changed");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value as JsonValue};

/// Marker trait for value objects.
///
/// The trait requires:
/// - **Clone**: Value objects should be cheap to copy (they're values, not references)
/// - **PartialEq**: Value objects are compared by their attribute values
/// - **Debug**: Value objects should be debuggable (helpful for logging, testing)
pub trait ValueObject: Clone + PartialEq + fmt::Debug {}

/// Generic immutable wrapper.
///
/// Cloning shares the same value; nothing hands out `&mut T`.
#[derive(Debug)]
pub struct Frozen<T> {
    value: Arc<T>,
}

impl<T> Frozen<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(value),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl Frozen<FrozenPayload> {
    /// Wrap a dynamic payload, freezing every nested record and list.
    pub fn deep(payload: Payload) -> Self {
        Self::new(deep_freeze(payload))
    }
}

impl<T> Clone for Frozen<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
        }
    }
}

impl<T: PartialEq> PartialEq for Frozen<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Frozen<T> {}

impl<T: PartialEq + fmt::Debug> ValueObject for Frozen<T> {}

impl<T> core::ops::Deref for Frozen<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// Scalars print their plain value; structured values print as JSON.
impl<T: Serialize> fmt::Display for Frozen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_value(&*self.value) {
            Ok(JsonValue::String(s)) => f.write_str(&s),
            Ok(other) => write!(f, "{other}"),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Opaque, shareable timestamp.
///
/// Left untouched by [`deep_freeze`]: every clone of the handle observes and may
/// change the same instant.
#[derive(Debug, Clone)]
pub struct SharedDate(Arc<RwLock<DateTime<Utc>>>);

impl SharedDate {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(Arc::new(RwLock::new(at)))
    }

    pub fn get(&self) -> DateTime<Utc> {
        match self.0.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        match self.0.write() {
            Ok(mut guard) => *guard = at,
            Err(poisoned) => *poisoned.into_inner() = at,
        }
    }
}

impl PartialEq for SharedDate {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

/// Mutable dynamic payload, the input to [`deep_freeze`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<Payload>),
    Record(BTreeMap<String, Payload>),
    Date(SharedDate),
}

impl Payload {
    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Payload)>,
    {
        Payload::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Text(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Text(value)
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Payload::Bool(value)
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Payload::Number(value.into())
    }
}

impl From<SharedDate> for Payload {
    fn from(value: SharedDate) -> Self {
        Payload::Date(value)
    }
}

impl From<JsonValue> for Payload {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Payload::Null,
            JsonValue::Bool(b) => Payload::Bool(b),
            JsonValue::Number(n) => Payload::Number(n),
            JsonValue::String(s) => Payload::Text(s),
            JsonValue::Array(items) => Payload::List(items.into_iter().map(Payload::from).collect()),
            JsonValue::Object(map) => {
                Payload::Record(map.into_iter().map(|(k, v)| (k, Payload::from(v))).collect())
            }
        }
    }
}

/// Read-only view produced by [`deep_freeze`].
#[derive(Debug, Clone, PartialEq)]
pub enum FrozenPayload {
    Null,
    Bool(bool),
    Number(Number),
    Text(Arc<str>),
    List(Arc<[FrozenPayload]>),
    Record(Arc<BTreeMap<String, FrozenPayload>>),
    Opaque(SharedDate),
}

impl FrozenPayload {
    /// Field of a record; `None` for other shapes or missing keys.
    pub fn get(&self, key: &str) -> Option<&FrozenPayload> {
        match self {
            FrozenPayload::Record(map) => map.get(key),
            _ => None,
        }
    }

    /// Element of a list.
    pub fn at(&self, index: usize) -> Option<&FrozenPayload> {
        match self {
            FrozenPayload::List(items) => items.get(index),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FrozenPayload::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FrozenPayload::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            FrozenPayload::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&SharedDate> {
        match self {
            FrozenPayload::Opaque(d) => Some(d),
            _ => None,
        }
    }

    /// Copy the tree back into a mutable payload. Opaque handles stay shared.
    pub fn thaw(&self) -> Payload {
        match self {
            FrozenPayload::Null => Payload::Null,
            FrozenPayload::Bool(b) => Payload::Bool(*b),
            FrozenPayload::Number(n) => Payload::Number(n.clone()),
            FrozenPayload::Text(s) => Payload::Text(s.to_string()),
            FrozenPayload::List(items) => Payload::List(items.iter().map(Self::thaw).collect()),
            FrozenPayload::Record(map) => {
                Payload::Record(map.iter().map(|(k, v)| (k.clone(), v.thaw())).collect())
            }
            FrozenPayload::Opaque(d) => Payload::Date(d.clone()),
        }
    }
}

impl Serialize for FrozenPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FrozenPayload::Null => serializer.serialize_unit(),
            FrozenPayload::Bool(b) => serializer.serialize_bool(*b),
            FrozenPayload::Number(n) => n.serialize(serializer),
            FrozenPayload::Text(s) => serializer.serialize_str(s),
            FrozenPayload::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FrozenPayload::Record(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            FrozenPayload::Opaque(d) => {
                serializer.serialize_str(&d.get().to_rfc3339_opts(SecondsFormat::Millis, true))
            }
        }
    }
}

/// Recursively freeze records and lists. Scalars pass through; opaque values
/// are carried as shared handles and keep their own mutability.
pub fn deep_freeze(payload: Payload) -> FrozenPayload {
    match payload {
        Payload::Null => FrozenPayload::Null,
        Payload::Bool(b) => FrozenPayload::Bool(b),
        Payload::Number(n) => FrozenPayload::Number(n),
        Payload::Text(s) => FrozenPayload::Text(Arc::from(s)),
        Payload::List(items) => FrozenPayload::List(items.into_iter().map(deep_freeze).collect()),
        Payload::Record(map) => FrozenPayload::Record(Arc::new(
            map.into_iter().map(|(k, v)| (k, deep_freeze(v))).collect(),
        )),
        Payload::Date(d) => FrozenPayload::Opaque(d),
    }
}
