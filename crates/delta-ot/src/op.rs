//! The atomic edit operation of a change script.
//!
//! An operation inserts content, deletes a run of positions, or retains a run
//! of positions (optionally reformatting it, or updating a single embedded
//! object in place). Inserted and retained content is either plain text or a
//! structured *embed*: a JSON object with a single top-level key naming the
//! embed type, occupying exactly one document position.
//!
//! All lengths and positions are counted in Unicode scalar values.
//!
//! The wire shape is the canonical one-key object form: `{"insert": …}`,
//! `{"delete": n}` or `{"retain": …}`, plus an optional `"attributes"` object.

use crate::attributes::AttributeMap;
use serde::de;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Payload of an insert: a text run or a structured embed.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertValue {
    Text(String),
    Embed(Value),
}

impl InsertValue {
    /// Number of document positions the content occupies.
    pub fn length(&self) -> usize {
        match self {
            InsertValue::Text(text) => text.chars().count(),
            InsertValue::Embed(_) => 1,
        }
    }
}

impl From<&str> for InsertValue {
    fn from(text: &str) -> Self {
        InsertValue::Text(text.to_string())
    }
}

impl From<String> for InsertValue {
    fn from(text: String) -> Self {
        InsertValue::Text(text)
    }
}

impl From<Value> for InsertValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => InsertValue::Text(text),
            other => InsertValue::Embed(other),
        }
    }
}

/// Payload of a retain: a plain advance or an in-place embed update.
#[derive(Debug, Clone, PartialEq)]
pub enum RetainValue {
    Count(usize),
    Embed(Value),
}

impl RetainValue {
    pub fn length(&self) -> usize {
        match self {
            RetainValue::Count(count) => *count,
            RetainValue::Embed(_) => 1,
        }
    }
}

impl From<usize> for RetainValue {
    fn from(count: usize) -> Self {
        RetainValue::Count(count)
    }
}

impl From<Value> for RetainValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(ref n) => match n.as_u64() {
                Some(count) => RetainValue::Count(count as usize),
                None => RetainValue::Embed(value),
            },
            other => RetainValue::Embed(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Insert(InsertValue, Option<AttributeMap>),
    Delete(usize),
    Retain(RetainValue, Option<AttributeMap>),
}

impl Op {
    pub fn insert(content: impl Into<InsertValue>, attributes: Option<AttributeMap>) -> Op {
        Op::Insert(content.into(), attributes)
    }

    pub fn delete(length: usize) -> Op {
        Op::Delete(length)
    }

    pub fn retain(what: impl Into<RetainValue>, attributes: Option<AttributeMap>) -> Op {
        Op::Retain(what.into(), attributes)
    }

    /// Number of document positions the operation covers.
    pub fn length(&self) -> usize {
        match self {
            Op::Insert(content, _) => content.length(),
            Op::Delete(length) => *length,
            Op::Retain(what, _) => what.length(),
        }
    }

    pub fn attributes(&self) -> Option<&AttributeMap> {
        match self {
            Op::Insert(_, attributes) | Op::Retain(_, attributes) => attributes.as_ref(),
            Op::Delete(_) => None,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Op::Insert(..))
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Op::Delete(_))
    }

    pub fn is_retain(&self) -> bool {
        matches!(self, Op::Retain(..))
    }
}

impl Serialize for Op {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = if self.attributes().is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(entries))?;
        match self {
            Op::Insert(InsertValue::Text(text), _) => map.serialize_entry("insert", text)?,
            Op::Insert(InsertValue::Embed(value), _) => map.serialize_entry("insert", value)?,
            Op::Delete(length) => map.serialize_entry("delete", length)?,
            Op::Retain(RetainValue::Count(count), _) => map.serialize_entry("retain", count)?,
            Op::Retain(RetainValue::Embed(value), _) => map.serialize_entry("retain", value)?,
        }
        if let Some(attributes) = self.attributes() {
            map.serialize_entry("attributes", attributes)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct RawOp {
    #[serde(default)]
    insert: Option<Value>,
    #[serde(default)]
    delete: Option<u64>,
    #[serde(default)]
    retain: Option<Value>,
    #[serde(default)]
    attributes: Option<AttributeMap>,
}

impl<'de> Deserialize<'de> for Op {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawOp::deserialize(deserializer)?;
        let attributes = raw.attributes.filter(|a| !a.is_empty());
        match (raw.insert, raw.delete, raw.retain) {
            (Some(value), None, None) => Ok(Op::Insert(InsertValue::from(value), attributes)),
            (None, Some(length), None) => Ok(Op::Delete(length as usize)),
            (None, None, Some(value)) => match value {
                Value::Number(_) | Value::Object(_) => {
                    Ok(Op::Retain(RetainValue::from(value), attributes))
                }
                _ => Err(de::Error::custom(
                    "retain must be a count or an embed object",
                )),
            },
            _ => Err(de::Error::custom(
                "op must carry exactly one of insert, delete, retain",
            )),
        }
    }
}
