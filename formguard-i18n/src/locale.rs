//! Locale representation and Accept-Language negotiation.

use crate::{I18nError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language with an optional script and region, e.g. `id`, `en-US`.
///
/// ```
/// use formguard_i18n::Locale;
///
/// let locale = Locale::parse("id_ID").unwrap();
/// assert_eq!(locale.tag(), "id-ID");
/// assert_eq!(locale.language_only().tag(), "id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    /// ISO 639 language code, lower case
    pub language: String,
    /// Four-letter script subtag, title case
    pub script: Option<String>,
    /// ISO 3166 region or UN M.49 code, upper case
    pub region: Option<String>,
}

impl Locale {
    /// Create a locale from a language and optional region.
    pub fn new(language: impl Into<String>, region: Option<&str>) -> Self {
        Self {
            language: language.into().to_lowercase(),
            script: None,
            region: region.map(str::to_uppercase),
        }
    }

    /// Parse a BCP 47 style tag. `-` and `_` are both accepted as separators.
    pub fn parse(tag: &str) -> Result<Self> {
        let mut parts = tag.trim().split(['-', '_']);

        let language = parts.next().unwrap_or_default().to_lowercase();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(I18nError::InvalidLocale(tag.to_string()));
        }

        let mut locale = Self {
            language,
            script: None,
            region: None,
        };

        for part in parts {
            let alphabetic = part.chars().all(|c| c.is_ascii_alphabetic());
            match part.len() {
                4 if alphabetic => locale.script = Some(title_case(part)),
                2 if alphabetic => locale.region = Some(part.to_uppercase()),
                3 if part.chars().all(|c| c.is_ascii_digit()) => {
                    locale.region = Some(part.to_string())
                }
                _ => return Err(I18nError::InvalidLocale(tag.to_string())),
            }
        }

        Ok(locale)
    }

    /// Canonical tag (`zh-Hans-CN`)
    pub fn tag(&self) -> String {
        [Some(&self.language), self.script.as_ref(), self.region.as_ref()]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("-")
    }

    /// The same locale without its region
    pub fn language_only(&self) -> Self {
        Self {
            language: self.language.clone(),
            script: self.script.clone(),
            region: None,
        }
    }

    /// How closely `other` matches this locale: 0 for a different language,
    /// 100 for an exact match, something in between otherwise.
    pub fn match_score(&self, other: &Locale) -> u32 {
        if self.language != other.language {
            return 0;
        }
        if self == other {
            return 100;
        }

        let mut score = 10;
        if self.region.is_some() && self.region == other.region {
            score += 40;
        }
        if self.script.is_some() && self.script == other.script {
            score += 15;
        }
        score
    }

    /// English
    pub fn en() -> Self {
        Self::new("en", None)
    }

    /// English (United States)
    pub fn en_us() -> Self {
        Self::new("en", Some("US"))
    }

    /// Indonesian
    pub fn id() -> Self {
        Self::new("id", None)
    }

    /// Indonesian (Indonesia)
    pub fn id_id() -> Self {
        Self::new("id", Some("ID"))
    }
}

fn title_case(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Locale {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::parse(s)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en()
    }
}

/// Parse an `Accept-Language` header into locales ordered by quality.
///
/// Wildcards, malformed tags and `q=0` entries are dropped; entries with
/// equal quality keep header order.
///
/// ```
/// use formguard_i18n::parse_accept_language;
///
/// let locales = parse_accept_language("id-ID,id;q=0.9,en;q=0.8,*;q=0.1");
/// let tags: Vec<String> = locales.iter().map(|l| l.tag()).collect();
/// assert_eq!(tags, vec!["id-ID", "id", "en"]);
/// ```
pub fn parse_accept_language(header: &str) -> Vec<Locale> {
    let mut entries: Vec<(Locale, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.trim().split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }

            let quality = pieces
                .find_map(|p| p.trim().strip_prefix("q=").map(str::to_string))
                .map_or(Some(1.0), |q| q.parse::<f32>().ok())?;
            if quality <= 0.0 {
                return None;
            }

            Some((Locale::parse(tag).ok()?, quality))
        })
        .collect();

    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.into_iter().map(|(locale, _)| locale).collect()
}

/// Pick the best available locale for the requested preferences.
///
/// Each requested locale is tried in order: first an exact match, then the
/// highest-scoring available locale of the same language. Falls back to
/// `default` when nothing matches.
pub fn negotiate_locale<'a>(
    requested: &[Locale],
    available: &'a [Locale],
    default: &'a Locale,
) -> &'a Locale {
    for wanted in requested {
        if let Some(exact) = available.iter().find(|a| *a == wanted) {
            return exact;
        }

        let best = available
            .iter()
            .map(|a| (a, a.match_score(wanted)))
            .filter(|(_, score)| *score > 0)
            .max_by_key(|(_, score)| *score);
        if let Some((locale, _)) = best {
            return locale;
        }
    }

    default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parse() {
        let id = Locale::parse("id").unwrap();
        assert_eq!(id.language, "id");
        assert!(id.region.is_none());

        let en_us = Locale::parse("en_us").unwrap();
        assert_eq!(en_us.region.as_deref(), Some("US"));

        let zh = Locale::parse("zh-hans-CN").unwrap();
        assert_eq!(zh.script.as_deref(), Some("Hans"));
        assert_eq!(zh.tag(), "zh-Hans-CN");
    }

    #[test]
    fn test_locale_parse_rejects_garbage() {
        assert!(Locale::parse("").is_err());
        assert!(Locale::parse("e").is_err());
        assert!(Locale::parse("english").is_err());
        assert!(Locale::parse("en-toolongpart").is_err());
    }

    #[test]
    fn test_language_only() {
        assert_eq!(Locale::id_id().language_only(), Locale::id());
    }

    #[test]
    fn test_accept_language_orders_by_quality() {
        let locales = parse_accept_language("en;q=0.5, id-ID, fr;q=0");
        assert_eq!(locales, vec![Locale::id_id(), Locale::en()]);
    }

    #[test]
    fn test_negotiate_exact_then_language() {
        let available = vec![Locale::en(), Locale::id()];
        let default = Locale::en();

        let requested = parse_accept_language("id-ID,en;q=0.8");
        assert_eq!(negotiate_locale(&requested, &available, &default), &Locale::id());

        let requested = parse_accept_language("de,ja");
        assert_eq!(negotiate_locale(&requested, &available, &default), &Locale::en());
    }

    #[test]
    fn test_match_score() {
        assert_eq!(Locale::en_us().match_score(&Locale::en_us()), 100);
        assert!(Locale::en_us().match_score(&Locale::en()) > 0);
        assert_eq!(Locale::en().match_score(&Locale::id()), 0);
    }
}
