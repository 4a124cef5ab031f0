// Environment variable loading

use serde_json::{Map, Value};
use std::env;

/// Default prefix for formguard variables
pub const DEFAULT_PREFIX: &str = "FORMGUARD";

/// Reads prefixed environment variables into a nested configuration map.
///
/// `FORMGUARD_VALIDATION__DEFAULT_LOCALE=id` becomes
/// `{"validation": {"default_locale": "id"}}`. Values that look like
/// booleans or integers are typed accordingly.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Load from the process environment
    pub fn load(&self) -> Map<String, Value> {
        self.from_vars(env::vars())
    }

    /// Load from an explicit set of variables
    pub fn from_vars<I, K, V>(&self, vars: I) -> Map<String, Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = Map::new();
        for (key, value) in vars {
            let Some(path) = self.strip(key.as_ref()) else {
                continue;
            };
            crate::insert_path(&mut map, &path, coerce(value.as_ref()));
        }
        map
    }

    fn strip(&self, key: &str) -> Option<Vec<String>> {
        let rest = key.strip_prefix(&self.prefix)?.strip_prefix('_')?;
        if rest.is_empty() {
            return None;
        }
        Some(rest.split("__").map(str::to_lowercase).collect())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

/// Type a raw string value
pub(crate) fn coerce(raw: &str) -> Value {
    match raw {
        "true" | "TRUE" | "True" => Value::Bool(true),
        "false" | "FALSE" | "False" => Value::Bool(false),
        _ => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}
