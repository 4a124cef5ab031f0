//! Message bundles and the immutable per-locale message table.

use crate::{I18nError, Locale, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Message templates for a single locale, keyed by dotted message id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBundle {
    messages: HashMap<String, String>,
}

impl MessageBundle {
    /// Create a new empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from JSON. Nested objects are flattened into dotted keys, so
    /// `{"max": {"string": "..."}}` defines `max.string`.
    pub fn from_json(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)?;
        let Value::Object(map) = root else {
            return Err(I18nError::ParseError(
                "message file root must be an object".to_string(),
            ));
        };

        let mut bundle = Self::new();
        for (key, value) in map {
            bundle.flatten(key, value)?;
        }
        Ok(bundle)
    }

    fn flatten(&mut self, key: String, value: Value) -> Result<()> {
        match value {
            Value::String(message) => {
                self.messages.insert(key, message);
            }
            Value::Object(children) => {
                for (child, value) in children {
                    self.flatten(format!("{}.{}", key, child), value)?;
                }
            }
            other => {
                return Err(I18nError::ParseError(format!(
                    "message '{}' must be a string, got {}",
                    key, other
                )));
            }
        }
        Ok(())
    }

    /// Add a message.
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    /// Builder-style [`MessageBundle::add`].
    pub fn with(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(key, message);
        self
    }

    /// Get a message.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Check if bundle has a message.
    pub fn has(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the bundle is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Copy every message of `other` into this bundle, overriding duplicates.
    pub fn merge(&mut self, other: MessageBundle) {
        self.messages.extend(other.messages);
    }
}

/// Per-locale message templates with locale fallback.
///
/// A table is assembled once at startup with [`MessageTableBuilder`] and is
/// read-only afterwards, so it can be shared behind an `Arc` across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct MessageTable {
    bundles: HashMap<String, MessageBundle>,
    default_locale: Locale,
    fallback_locale: Option<Locale>,
}

impl MessageTable {
    /// Start building a table.
    pub fn builder() -> MessageTableBuilder {
        MessageTableBuilder::default()
    }

    /// A table with no messages at all.
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// The locale used when nothing else matches.
    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    /// The locale consulted after the requested one.
    pub fn fallback_locale(&self) -> Option<&Locale> {
        self.fallback_locale.as_ref()
    }

    /// Locales that have a bundle, sorted by tag.
    pub fn locales(&self) -> Vec<Locale> {
        let mut tags: Vec<&String> = self.bundles.keys().collect();
        tags.sort();
        tags.into_iter()
            .filter_map(|tag| Locale::parse(tag).ok())
            .collect()
    }

    fn bundle(&self, locale: &Locale) -> Option<&MessageBundle> {
        self.bundles.get(&locale.tag()).or_else(|| {
            locale
                .region
                .as_ref()
                .and_then(|_| self.bundles.get(&locale.language_only().tag()))
        })
    }

    /// Look up a template.
    ///
    /// Tries the requested locale, its language-only form, the fallback
    /// locale and finally the default locale.
    pub fn lookup(&self, key: &str, locale: &Locale) -> Option<&str> {
        [Some(locale), self.fallback_locale.as_ref(), Some(&self.default_locale)]
            .into_iter()
            .flatten()
            .find_map(|candidate| self.bundle(candidate).and_then(|b| b.get(key)))
    }

    /// Look up a template in the requested locale only (with its
    /// language-only form), without falling back.
    pub fn lookup_exact(&self, key: &str, locale: &Locale) -> Option<&str> {
        self.bundle(locale).and_then(|b| b.get(key))
    }

    /// Check whether any locale in the chain has `key`.
    pub fn has(&self, key: &str, locale: &Locale) -> bool {
        self.lookup(key, locale).is_some()
    }
}

impl Default for MessageTable {
    fn default() -> Self {
        Self::empty()
    }
}

/// Assembles a [`MessageTable`].
#[derive(Debug, Default)]
pub struct MessageTableBuilder {
    bundles: HashMap<String, MessageBundle>,
    default_locale: Option<Locale>,
    fallback_locale: Option<Locale>,
}

impl MessageTableBuilder {
    /// Add (or merge into) the bundle for `locale`.
    pub fn bundle(mut self, locale: &Locale, bundle: MessageBundle) -> Self {
        self.bundles.entry(locale.tag()).or_default().merge(bundle);
        self
    }

    /// Add a bundle parsed from JSON.
    pub fn json(self, locale: &Locale, json: &str) -> Result<Self> {
        let bundle = MessageBundle::from_json(json)?;
        Ok(self.bundle(locale, bundle))
    }

    /// Load every `<tag>.json` file in `dir`.
    ///
    /// Expected structure:
    /// - `lang/en.json`
    /// - `lang/id.json`
    pub fn load_dir(mut self, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(I18nError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Directory not found: {}", dir.display()),
            )));
        }

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        paths.sort();

        for path in paths {
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| I18nError::ParseError(format!("Invalid filename: {}", path.display())))?;

            let locale = Locale::parse(stem)?;
            let content = fs::read_to_string(&path)?;
            self = self.json(&locale, &content)?;
        }

        Ok(self)
    }

    /// Set the default locale (defaults to `en`).
    pub fn default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = Some(locale);
        self
    }

    /// Set the fallback locale.
    pub fn fallback(mut self, locale: Locale) -> Self {
        self.fallback_locale = Some(locale);
        self
    }

    /// Freeze the table.
    pub fn build(self) -> MessageTable {
        MessageTable {
            bundles: self.bundles,
            default_locale: self.default_locale.unwrap_or_default(),
            fallback_locale: self.fallback_locale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_table() -> MessageTable {
        let en = MessageBundle::new()
            .with("required", "The :attribute field is required.")
            .with("email", "The :attribute must be a valid email address.");
        let id = MessageBundle::new().with("required", ":attribute wajib diisi.");

        MessageTable::builder()
            .bundle(&Locale::en(), en)
            .bundle(&Locale::id(), id)
            .default_locale(Locale::en())
            .fallback(Locale::en())
            .build()
    }

    #[test]
    fn test_lookup_in_requested_locale() {
        let table = create_test_table();
        assert_eq!(table.lookup("required", &Locale::id()), Some(":attribute wajib diisi."));
    }

    #[test]
    fn test_lookup_language_only_fallback() {
        let table = create_test_table();
        assert_eq!(table.lookup("required", &Locale::id_id()), Some(":attribute wajib diisi."));
    }

    #[test]
    fn test_lookup_falls_back_to_default() {
        let table = create_test_table();
        assert_eq!(
            table.lookup("email", &Locale::id()),
            Some("The :attribute must be a valid email address.")
        );
        assert!(table.lookup_exact("email", &Locale::id()).is_none());
        assert!(table.lookup("missing", &Locale::id()).is_none());
    }

    #[test]
    fn test_bundle_from_json_flattens() {
        let json = r#"{
            "required": "The :attribute field is required.",
            "max": {
                "string": "The :attribute may not exceed :max characters.",
                "numeric": "The :attribute may not exceed :max."
            }
        }"#;

        let bundle = MessageBundle::from_json(json).unwrap();
        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.get("max.numeric"), Some("The :attribute may not exceed :max."));
    }

    #[test]
    fn test_bundle_rejects_non_string_leaves() {
        assert!(MessageBundle::from_json(r#"{"max": 3}"#).is_err());
        assert!(MessageBundle::from_json(r#"["a"]"#).is_err());
    }

    #[test]
    fn test_locales_listed() {
        let table = create_test_table();
        assert_eq!(table.locales(), vec![Locale::en(), Locale::id()]);
    }
}
