// Layered configuration for formguard hosts

pub mod env;
pub mod error;
pub mod loader;
pub mod settings;

pub use env::{DEFAULT_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::ValidationSettings;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Layered configuration: defaults, then files, then environment.
///
/// Later layers override earlier ones key by key; nested tables are merged
/// rather than replaced.
///
/// ```
/// use formguard_config::{ConfigManager, FileFormat, ValidationSettings};
///
/// let mut config = ConfigManager::new();
/// config.set_default("validation.default_locale", "en").unwrap();
/// config.merge_str("[validation]\ndefault_locale = \"id\"", FileFormat::Toml).unwrap();
///
/// let settings: ValidationSettings = config.section("validation").unwrap();
/// assert_eq!(settings.default_locale, "id");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    defaults: Map<String, Value>,
    files: Map<String, Value>,
    env: Map<String, Value>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a default at a dotted key
    pub fn set_default<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| ConfigError::invalid(key, e.to_string()))?;
        insert_path(&mut self.defaults, &split_key(key), value);
        Ok(())
    }

    /// Merge a configuration file, detecting its format from the name
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let map = ConfigLoader::auto(path)?.load_file(path)?;
        deep_merge(&mut self.files, map);
        Ok(())
    }

    /// Merge configuration text in the given format
    pub fn merge_str(&mut self, content: &str, format: FileFormat) -> Result<()> {
        let map = ConfigLoader::new(format).parse(content)?;
        deep_merge(&mut self.files, map);
        Ok(())
    }

    /// Merge `FORMGUARD_*` variables from the process environment
    pub fn load_env(&mut self) {
        self.load_env_with(&EnvLoader::default());
    }

    pub fn load_env_with(&mut self, loader: &EnvLoader) {
        deep_merge(&mut self.env, loader.load());
    }

    /// Merge prefixed variables from a `.env` file without touching the
    /// process environment. A missing file is not an error.
    pub fn load_dotenv(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(());
        }

        let vars = dotenvy::from_path_iter(path)
            .map_err(|e| ConfigError::LoadError(e.to_string()))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        deep_merge(&mut self.env, EnvLoader::default().from_vars(vars));
        Ok(())
    }

    /// The merged configuration
    pub fn resolved(&self) -> Value {
        let mut merged = self.defaults.clone();
        deep_merge(&mut merged, self.files.clone());
        deep_merge(&mut merged, self.env.clone());
        Value::Object(merged)
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        let mut current = self.resolved();
        for segment in split_key(key) {
            current = match current {
                Value::Object(mut map) => map.remove(&segment)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Get a value at a dotted key
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .lookup(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;
        serde_json::from_value(value).map_err(|e| ConfigError::invalid(key, e.to_string()))
    }

    /// Get a value or a default when missing or mistyped
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Deserialize a whole section. A missing section deserializes from an
    /// empty table, so `#[serde(default)]` types get their defaults.
    pub fn section<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self.lookup(name).unwrap_or_else(|| Value::Object(Map::new()));
        serde_json::from_value(value).map_err(|e| ConfigError::invalid(name, e.to_string()))
    }

    /// Deserialize a section and run its checks
    pub fn load_validated<T: DeserializeOwned + Validate>(&self, name: &str) -> Result<T> {
        let section: T = self.section(name)?;
        section.validate()?;
        Ok(section)
    }
}

fn split_key(key: &str) -> Vec<String> {
    key.split('.').map(str::to_string).collect()
}

pub(crate) fn insert_path(map: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    if rest.is_empty() {
        map.insert(first.clone(), value);
        return;
    }

    let slot = map
        .entry(first.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(child) = slot {
        insert_path(child, rest, value);
    }
}

fn deep_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match value {
            Value::Object(incoming) if base.get(&key).is_some_and(Value::is_object) => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    deep_merge(existing, incoming);
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}
