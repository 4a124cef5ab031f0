// Input documents

use crate::RuleError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An ordered tree of named fields under validation.
///
/// Field values are scalars, nested documents (JSON objects) or sequences.
/// Evaluation only ever borrows a document; transforms such as
/// [`Document::with`] return a new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value whose root is an object
    pub fn from_value(value: Value) -> Result<Self, RuleError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(RuleError::MalformedDocument(format!(
                "document root must be an object, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| RuleError::MalformedDocument(e.to_string()))?;
        Self::from_value(value)
    }

    /// Top-level fields
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Check if a top-level field exists
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Read a concrete dotted path. Numeric segments index sequences.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = child(current, segment)?;
        }
        Some(current)
    }

    /// Read a path as a string slice
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Return a copy with `value` written at the dotted `path`, creating
    /// intermediate documents as needed.
    pub fn with(&self, path: &str, value: impl Into<Value>) -> Self {
        let mut copy = self.clone();
        copy.insert(path, value.into());
        copy
    }

    pub(crate) fn insert(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let (first, rest) = match segments.split_first() {
            Some(parts) => parts,
            None => return,
        };
        if rest.is_empty() {
            self.fields.insert((*first).to_string(), value);
            return;
        }
        let slot = self
            .fields
            .entry((*first).to_string())
            .or_insert_with(|| container_for(rest[0]));
        write_path(slot, rest, value);
    }

    /// Copy into a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Consume into a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for Document {
    type Error = RuleError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

pub(crate) fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn container_for(next_segment: &str) -> Value {
    if next_segment.parse::<usize>().is_ok() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn write_path(slot: &mut Value, segments: &[&str], value: Value) {
    let (segment, rest) = match segments.split_first() {
        Some(parts) => parts,
        None => {
            *slot = value;
            return;
        }
    };

    if let (Value::Array(items), Ok(index)) = (&mut *slot, segment.parse::<usize>()) {
        if items.len() <= index {
            items.resize(index + 1, Value::Null);
        }
        if rest.is_empty() {
            items[index] = value;
        } else {
            if !items[index].is_object() && !items[index].is_array() {
                items[index] = container_for(rest[0]);
            }
            write_path(&mut items[index], rest, value);
        }
        return;
    }

    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        if rest.is_empty() {
            map.insert((*segment).to_string(), value);
        } else {
            let next = map
                .entry((*segment).to_string())
                .or_insert_with(|| container_for(rest[0]));
            write_path(next, rest, value);
        }
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "document",
    }
}
