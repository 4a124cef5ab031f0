//! Form body decoding with bracket notation

use crate::Error;
use formguard_validation::Document;
use serde_json::{Map, Value};

/// Parse URL-encoded form data into ordered key/value pairs
pub fn parse_form_pairs(body: &[u8]) -> Result<Vec<(String, String)>, Error> {
    serde_urlencoded::from_bytes(body)
        .map_err(|e| Error::BadRequest(format!("Failed to parse form data: {}", e)))
}

/// Parse URL-encoded form data into a nested document.
///
/// `address[0][city]=Bogor` becomes `{"address": [{"city": "Bogor"}]}` and
/// `tags[]=a&tags[]=b` becomes `{"tags": ["a", "b"]}`. A repeated plain key
/// keeps its last value.
pub fn parse_form_document(body: &[u8]) -> Result<Document, Error> {
    Ok(document_from_pairs(parse_form_pairs(body)?))
}

/// Build a nested document from decoded pairs
pub fn document_from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Document {
    let mut root = Map::new();
    for (key, value) in pairs {
        let segments = split_key(&key);
        insert(&mut root, &segments, value);
    }

    let fields = root
        .into_iter()
        .map(|(key, value)| (key, into_sequences(value)))
        .collect::<Map<String, Value>>();
    Document::from(fields)
}

/// Split `a[b][]` into `["a", "b", ""]`. Keys that are not well-formed
/// bracket expressions are kept whole.
fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };
    if open == 0 {
        return vec![key.to_string()];
    }

    let mut segments = vec![key[..open].to_string()];
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            return vec![key.to_string()];
        };
        segments.push(inner[..close].to_string());
        rest = &inner[close + 1..];
    }

    if !rest.is_empty() {
        return vec![key.to_string()];
    }
    segments
}

fn insert(node: &mut Map<String, Value>, segments: &[String], value: String) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };

    // `[]` appends after the highest index already present
    let key = if first.is_empty() {
        node.keys()
            .filter_map(|key| key.parse::<usize>().ok())
            .max()
            .map_or(0, |highest| highest + 1)
            .to_string()
    } else {
        first.clone()
    };

    if rest.is_empty() {
        node.insert(key, Value::String(value));
        return;
    }

    let slot = node
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(child) = slot {
        insert(child, rest, value);
    }
}

/// Turn groups keyed exactly `0..n` into sequences, recursively
fn into_sequences(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };

    let map: Map<String, Value> = map
        .into_iter()
        .map(|(key, value)| (key, into_sequences(value)))
        .collect();

    let indexes: Option<Vec<usize>> = map
        .keys()
        .map(|key| key.parse::<usize>().ok().filter(|index| index.to_string() == *key))
        .collect();
    let is_sequence = match indexes {
        Some(mut indexes) if !indexes.is_empty() => {
            indexes.sort_unstable();
            indexes
                .iter()
                .enumerate()
                .all(|(position, index)| position == *index)
        }
        _ => false,
    };
    if !is_sequence {
        return Value::Object(map);
    }

    let mut entries: Vec<(usize, Value)> = map
        .into_iter()
        .filter_map(|(key, value)| key.parse().ok().map(|index| (index, value)))
        .collect();
    entries.sort_by_key(|(index, _)| *index);
    Value::Array(entries.into_iter().map(|(_, value)| value).collect())
}
