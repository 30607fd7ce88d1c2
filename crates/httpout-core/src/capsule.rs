//! Capsule templates and signature substitution.
//!
//! A [`Capsule`] is an operator-defined JSON-like envelope. Any scalar string
//! in it that equals the configured signature is a placeholder: at publish
//! time it is replaced by the whole current batch, turning a string into an
//! array of event objects.
//!
//! ```text
//! capsule:   {"type": "batch", "payload": "EVENTS"}
//! signature: "EVENTS"
//! batch:     [{"msg": "hi"}]
//! result:    {"type": "batch", "payload": [{"msg": "hi"}]}
//! ```
//!
//! Substitution borrows the template, so one capsule serves every publish
//! call of an output.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use serde_json::{Number, Value};

use crate::event::{Event, batch_value};

/// A scalar leaf of a capsule.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// JSON `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A finite number.
    Number(Number),
    /// A string; a placeholder when it equals the signature.
    String(String),
}

impl Scalar {
    fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
        }
    }
}

/// An envelope template: scalars, sequences and string-keyed mappings.
///
/// Mapping keys keep the order in which they were read.
#[derive(Debug, Clone, PartialEq)]
pub enum Capsule {
    /// A leaf value.
    Scalar(Scalar),
    /// An ordered list of templates.
    Sequence(Vec<Capsule>),
    /// String keys to templates, in insertion order.
    Mapping(IndexMap<String, Capsule>),
}

impl Capsule {
    /// Rewrites the template, replacing every placeholder with `batch`.
    ///
    /// Total: every template maps to a value. Nodes that are not a string
    /// equal to `signature` are copied unchanged.
    pub fn substitute(&self, signature: &str, batch: &[Event]) -> Value {
        let batch = batch_value(batch);
        self.substitute_with(signature, &batch)
    }

    fn substitute_with(&self, signature: &str, batch: &Value) -> Value {
        match self {
            Self::Sequence(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.substitute_with(signature, batch))
                    .collect(),
            ),
            Self::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.substitute_with(signature, batch)))
                    .collect(),
            ),
            Self::Scalar(Scalar::String(s)) if s == signature => batch.clone(),
            Self::Scalar(scalar) => scalar.to_value(),
        }
    }

    /// Returns true if a placeholder for `signature` occurs anywhere.
    pub fn contains(&self, signature: &str) -> bool {
        match self {
            Self::Sequence(items) => items.iter().any(|item| item.contains(signature)),
            Self::Mapping(entries) => entries.values().any(|value| value.contains(signature)),
            Self::Scalar(Scalar::String(s)) => s == signature,
            Self::Scalar(_) => false,
        }
    }

    /// Converts the template to a JSON value without substituting anything.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Self::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_value()))
                    .collect(),
            ),
            Self::Scalar(scalar) => scalar.to_value(),
        }
    }
}

impl From<Value> for Capsule {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            Value::String(s) => Self::Scalar(Scalar::String(s)),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => Self::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Capsule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(Scalar::Null) => serializer.serialize_unit(),
            Self::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Self::Scalar(Scalar::Number(n)) => n.serialize(serializer),
            Self::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
            Self::Sequence(items) => serializer.collect_seq(items),
            Self::Mapping(entries) => serializer.collect_map(entries),
        }
    }
}

impl<'de> Deserialize<'de> for Capsule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CapsuleVisitor)
    }
}

struct CapsuleVisitor;

impl<'de> Visitor<'de> for CapsuleVisitor {
    type Value = Capsule;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON-compatible capsule template")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Capsule, E> {
        Ok(Capsule::Scalar(Scalar::Bool(v)))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Capsule, E> {
        Ok(Capsule::Scalar(Scalar::Number(v.into())))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Capsule, E> {
        Ok(Capsule::Scalar(Scalar::Number(v.into())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Capsule, E> {
        Number::from_f64(v)
            .map(|n| Capsule::Scalar(Scalar::Number(n)))
            .ok_or_else(|| E::custom(format!("non-finite number {v} in capsule")))
    }

    fn visit_str<E>(self, v: &str) -> Result<Capsule, E> {
        Ok(Capsule::Scalar(Scalar::String(v.to_string())))
    }

    fn visit_string<E>(self, v: String) -> Result<Capsule, E> {
        Ok(Capsule::Scalar(Scalar::String(v)))
    }

    fn visit_unit<E>(self) -> Result<Capsule, E> {
        Ok(Capsule::Scalar(Scalar::Null))
    }

    fn visit_none<E>(self) -> Result<Capsule, E> {
        Ok(Capsule::Scalar(Scalar::Null))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Capsule, D::Error> {
        Capsule::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Capsule, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Capsule::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Capsule, A::Error> {
        let mut entries = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((MapKey(key), value)) = map.next_entry::<MapKey, Capsule>()? {
            entries.insert(key, value);
        }
        Ok(Capsule::Mapping(entries))
    }
}

/// A mapping key of any scalar type, coerced to its string form.
struct MapKey(String);

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MapKeyVisitor)
    }
}

struct MapKeyVisitor;

impl Visitor<'_> for MapKeyVisitor {
    type Value = MapKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar mapping key")
    }

    fn visit_bool<E>(self, v: bool) -> Result<MapKey, E> {
        Ok(MapKey(v.to_string()))
    }

    fn visit_i64<E>(self, v: i64) -> Result<MapKey, E> {
        Ok(MapKey(v.to_string()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<MapKey, E> {
        Ok(MapKey(v.to_string()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<MapKey, E> {
        Ok(MapKey(v.to_string()))
    }

    fn visit_char<E>(self, v: char) -> Result<MapKey, E> {
        Ok(MapKey(v.to_string()))
    }

    fn visit_str<E>(self, v: &str) -> Result<MapKey, E> {
        Ok(MapKey(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<MapKey, E> {
        Ok(MapKey(v))
    }

    fn visit_unit<E>(self) -> Result<MapKey, E> {
        Ok(MapKey("null".to_string()))
    }
}
