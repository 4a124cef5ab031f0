// Typed settings sections

use crate::{ConfigError, Result, Validate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for the validation layer, read from the `validation` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Locale used when the request does not ask for a supported one
    pub default_locale: String,
    /// Locale consulted when a template is missing in the requested one
    pub fallback_locale: String,
    /// Stop at the first failure of every attribute
    pub stop_on_first_failure: bool,
    /// Directory of extra `<locale>.json` message tables
    pub lang_dir: Option<PathBuf>,
    /// Log rejected submissions at debug level
    pub log_rejections: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            fallback_locale: "en".to_string(),
            stop_on_first_failure: false,
            lang_dir: None,
            log_rejections: true,
        }
    }
}

fn check_tag(key: &str, tag: &str) -> Result<()> {
    let language = tag.split(['-', '_']).next().unwrap_or_default();
    if (2..=3).contains(&language.len()) && language.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, format!("'{}' is not a locale tag", tag)))
    }
}

impl Validate for ValidationSettings {
    fn validate(&self) -> Result<()> {
        check_tag("validation.default_locale", &self.default_locale)?;
        check_tag("validation.fallback_locale", &self.fallback_locale)?;
        if let Some(dir) = &self.lang_dir {
            if !dir.is_dir() {
                return Err(ConfigError::invalid(
                    "validation.lang_dir",
                    format!("{} is not a directory", dir.display()),
                ));
            }
        }
        Ok(())
    }
}
