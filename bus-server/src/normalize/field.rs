//! Declarative field mapping.
//!
//! A [`FieldTable`] is an ordered list of [`FieldSpec`]s, each naming a
//! source key, a target key, a [`Conversion`] and what to do when the source
//! value is missing or does not convert. Tables are `const` data, so every
//! policy is visible in one place.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::bus_api::RawRecord;
use crate::domain::ClockTime;

use super::error::NormalizeError;

/// How a raw value is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Any scalar, as a string.
    Text,
    /// A signed integer, from a number or a numeric string.
    Integer,
    /// A finite float, from a number or a numeric string.
    Float,
    /// An "HH:MM" time of day.
    Clock,
}

/// A constant substituted by [`Policy::Default`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    Integer(i64),
    Float(f64),
    Text(&'static str),
}

/// What to do when a value is missing or fails conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    /// The whole record is malformed.
    Reject,
    /// Emit `null` for this field.
    Null,
    /// Emit a constant.
    Default(Fallback),
}

/// One entry of a field table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub source: &'static str,
    pub target: &'static str,
    pub conversion: Conversion,
    pub on_missing: Policy,
    pub on_invalid: Policy,
}

impl FieldSpec {
    /// Missing or unconvertible values reject the record.
    pub const fn required(
        source: &'static str,
        target: &'static str,
        conversion: Conversion,
    ) -> Self {
        Self {
            source,
            target,
            conversion,
            on_missing: Policy::Reject,
            on_invalid: Policy::Reject,
        }
    }

    /// Missing values become `null`; present values must convert.
    pub const fn optional(
        source: &'static str,
        target: &'static str,
        conversion: Conversion,
    ) -> Self {
        Self {
            source,
            target,
            conversion,
            on_missing: Policy::Null,
            on_invalid: Policy::Reject,
        }
    }

    /// Missing and unconvertible values both become `null`. Used for fields
    /// the provider fills with placeholders such as "미정차".
    pub const fn lenient(
        source: &'static str,
        target: &'static str,
        conversion: Conversion,
    ) -> Self {
        Self {
            source,
            target,
            conversion,
            on_missing: Policy::Null,
            on_invalid: Policy::Null,
        }
    }

    /// Substitute `fallback` for missing and unconvertible values.
    pub const fn or_default(mut self, fallback: Fallback) -> Self {
        self.on_missing = Policy::Default(fallback);
        self.on_invalid = Policy::Default(fallback);
        self
    }
}

/// A named mapping from one provider record shape to normalized fields.
#[derive(Debug, Clone, Copy)]
pub struct FieldTable {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
    /// Target keys copied from the first entry into a list's summary.
    pub aggregates: &'static [&'static str],
}

/// A converted value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Clock(ClockTime),
}

impl FieldValue {
    fn from_fallback(fallback: Fallback) -> Self {
        match fallback {
            Fallback::Integer(n) => FieldValue::Integer(n),
            Fallback::Float(x) => FieldValue::Float(x),
            Fallback::Text(s) => FieldValue::Text(s.to_string()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Integer(n) => serializer.serialize_i64(*n),
            FieldValue::Float(x) => serializer.serialize_f64(*x),
            FieldValue::Clock(t) => t.serialize(serializer),
        }
    }
}

/// A record after normalization: target keys in table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    fields: Vec<(&'static str, FieldValue)>,
}

impl NormalizedRecord {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            FieldValue::Float(x) => Some(*x),
            FieldValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn clock(&self, key: &str) -> Option<ClockTime> {
        match self.get(key)? {
            FieldValue::Clock(t) => Some(*t),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub(super) fn push(&mut self, key: &'static str, value: FieldValue) {
        self.fields.push((key, value));
    }
}

impl Serialize for NormalizedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Apply `table` to one raw record.
///
/// Fields are emitted in table order. The first field whose policy is
/// [`Policy::Reject`] and whose value is missing or unconvertible fails the
/// whole record with [`NormalizeError::MalformedRecord`] naming the source key.
pub fn normalize(record: &RawRecord, table: &FieldTable) -> Result<NormalizedRecord, NormalizeError> {
    let mut out = NormalizedRecord::default();

    for spec in table.fields {
        let raw = record.get(spec.source).filter(|v| !v.is_null());

        let value = match raw {
            None => apply_policy(spec.on_missing, table, spec, "missing".to_string())?,
            Some(raw) => match convert(raw, spec.conversion) {
                Ok(value) => value,
                Err(reason) => apply_policy(spec.on_invalid, table, spec, reason)?,
            },
        };

        out.push(spec.target, value);
    }

    Ok(out)
}

fn apply_policy(
    policy: Policy,
    table: &FieldTable,
    spec: &FieldSpec,
    reason: String,
) -> Result<FieldValue, NormalizeError> {
    match policy {
        Policy::Reject => Err(NormalizeError::MalformedRecord {
            table: table.name,
            key: spec.source,
            reason,
        }),
        Policy::Null => Ok(FieldValue::Null),
        Policy::Default(fallback) => Ok(FieldValue::from_fallback(fallback)),
    }
}

fn convert(raw: &Value, conversion: Conversion) -> Result<FieldValue, String> {
    match conversion {
        Conversion::Text => match raw {
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            Value::Number(n) => Ok(FieldValue::Text(n.to_string())),
            Value::Bool(b) => Ok(FieldValue::Text(b.to_string())),
            _ => Err(format!("expected text, got {raw}")),
        },
        Conversion::Integer => match raw {
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Integer)
                .ok_or_else(|| format!("{n} is not an integer")),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| format!("{s:?} is not an integer")),
            _ => Err(format!("expected integer, got {raw}")),
        },
        Conversion::Float => {
            let parsed = match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            match parsed {
                Some(x) if x.is_finite() => Ok(FieldValue::Float(x)),
                _ => Err(format!("{raw} is not a finite number")),
            }
        }
        Conversion::Clock => match raw {
            Value::String(s) => ClockTime::parse_hhmm(s)
                .map(FieldValue::Clock)
                .map_err(|e| e.to_string()),
            _ => Err(format!("expected HH:MM, got {raw}")),
        },
    }
}
