// Failure message rendering

use crate::Failure;
use formguard_i18n::{Locale, MessageTable};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

const GENERIC: &str = "The :attribute field is invalid.";

static DEFAULT_MESSAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("required", "The :attribute field is required."),
        ("present", "The :attribute field must be present."),
        ("filled", "The :attribute field must have a value."),
        ("required_with", "The :attribute field is required when :values is present."),
        ("accepted", "The :attribute field must be accepted."),
        ("email", "The :attribute field must be a valid email address."),
        ("url", "The :attribute field must be a valid URL."),
        ("uuid", "The :attribute field must be a valid UUID."),
        ("alpha", "The :attribute field must only contain letters."),
        ("alpha_num", "The :attribute field must only contain letters and numbers."),
        (
            "alpha_dash",
            "The :attribute field must only contain letters, numbers, dashes, and underscores.",
        ),
        ("lowercase", "The :attribute field must be lowercase."),
        ("uppercase", "The :attribute field must be uppercase."),
        ("regex", "The :attribute field format is invalid."),
        ("not_regex", "The :attribute field format is invalid."),
        ("string", "The :attribute field must be a string."),
        ("numeric", "The :attribute field must be a number."),
        ("integer", "The :attribute field must be an integer."),
        ("boolean", "The :attribute field must be true or false."),
        ("array", "The :attribute field must be an array."),
        ("min.string", "The :attribute field must be at least :min characters."),
        ("min.numeric", "The :attribute field must be at least :min."),
        ("min.array", "The :attribute field must have at least :min items."),
        ("max.string", "The :attribute field must not be greater than :max characters."),
        ("max.numeric", "The :attribute field must not be greater than :max."),
        ("max.array", "The :attribute field must not have more than :max items."),
        ("between.string", "The :attribute field must be between :min and :max characters."),
        ("between.numeric", "The :attribute field must be between :min and :max."),
        ("between.array", "The :attribute field must have between :min and :max items."),
        ("size.string", "The :attribute field must be :size characters."),
        ("size.numeric", "The :attribute field must be :size."),
        ("size.array", "The :attribute field must contain :size items."),
        ("in", "The selected :attribute is invalid."),
        ("not_in", "The selected :attribute is invalid."),
        ("same", "The :attribute field must match :other."),
        ("different", "The :attribute field and :other must be different."),
        ("confirmed", "The :attribute field confirmation does not match."),
        ("password.min", "The :attribute field must be at least :min characters."),
        ("password.letters", "The :attribute field must contain at least one letter."),
        (
            "password.mixed",
            "The :attribute field must contain at least one uppercase and one lowercase letter.",
        ),
        ("password.numbers", "The :attribute field must contain at least one number."),
        ("password.symbols", "The :attribute field must contain at least one symbol."),
    ])
});

/// Renders [`Failure`]s into human-readable messages.
///
/// Templates come from the shared [`MessageTable`], then from the built-in
/// English defaults, then from a generic template. Rendering never fails.
#[derive(Debug, Clone, Default)]
pub struct ErrorFormatter {
    table: Arc<MessageTable>,
}

impl ErrorFormatter {
    pub fn new(table: Arc<MessageTable>) -> Self {
        Self { table }
    }

    /// The message table backing this formatter
    pub fn table(&self) -> &MessageTable {
        &self.table
    }

    /// Render a failure without per-call overrides
    pub fn render(&self, failure: &Failure, locale: &Locale) -> String {
        self.render_with(failure, locale, &HashMap::new(), &HashMap::new())
    }

    /// Render a failure, consulting inline messages (keyed `attribute.rule`
    /// or `rule`, `*` matching one path segment) and inline attribute
    /// display names first.
    pub fn render_with(
        &self,
        failure: &Failure,
        locale: &Locale,
        messages: &HashMap<String, String>,
        attributes: &HashMap<String, String>,
    ) -> String {
        let template = self.template(failure, locale, messages);
        let display = self.display_name(&failure.attribute, locale, attributes);

        let mut replacements = vec![
            (":attribute".to_string(), display.clone()),
            (":Attribute".to_string(), upper_first(&display)),
            (":ATTRIBUTE".to_string(), display.to_uppercase()),
        ];
        for (name, value) in &failure.parameters {
            let value = if name == "other" {
                self.display_name(value, locale, attributes)
            } else {
                value.clone()
            };
            replacements.push((format!(":{}", name), value));
        }

        replace_placeholders(&template, &replacements)
    }

    fn template(
        &self,
        failure: &Failure,
        locale: &Locale,
        messages: &HashMap<String, String>,
    ) -> String {
        let rule = failure.rule.as_str();
        let specific = format!("{}.{}", failure.attribute, rule);

        if let Some(message) = inline_lookup(messages, &specific).or_else(|| messages.get(rule)) {
            return message.clone();
        }
        if !failure.message.is_empty() {
            return failure.message.clone();
        }

        let variant_key = failure.variant.as_ref().map(|v| format!("{}.{}", rule, v));
        let keys: Vec<&str> = variant_key.as_deref().into_iter().chain([rule]).collect();

        // Every key in one locale before moving down the chain
        let chain = [
            Some(locale),
            self.table.fallback_locale(),
            Some(self.table.default_locale()),
        ];
        chain
            .into_iter()
            .flatten()
            .find_map(|candidate| {
                keys.iter()
                    .find_map(|key| self.table.lookup_exact(key, candidate))
            })
            .or_else(|| keys.iter().find_map(|key| DEFAULT_MESSAGES.get(key).copied()))
            .unwrap_or(GENERIC)
            .to_string()
    }

    fn display_name(
        &self,
        attribute: &str,
        locale: &Locale,
        attributes: &HashMap<String, String>,
    ) -> String {
        if let Some(name) = inline_lookup(attributes, attribute) {
            return name.clone();
        }
        if let Some(name) = self.table.lookup(&format!("attributes.{}", attribute), locale) {
            return name.to_string();
        }
        attribute.replace('_', " ")
    }
}

/// Exact key first, then keys containing `*` segments
fn inline_lookup<'a>(map: &'a HashMap<String, String>, key: &str) -> Option<&'a String> {
    map.get(key).or_else(|| {
        map.iter()
            .filter(|(pattern, _)| pattern.contains('*'))
            .find(|(pattern, _)| segments_match(pattern, key))
            .map(|(_, value)| value)
    })
}

fn segments_match(pattern: &str, key: &str) -> bool {
    let pattern: Vec<&str> = pattern.split('.').collect();
    let key: Vec<&str> = key.split('.').collect();
    pattern.len() == key.len()
        && pattern
            .iter()
            .zip(&key)
            .all(|(p, k)| *p == "*" || p == k)
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Single left-to-right pass; at each `:` the longest matching placeholder
/// wins, so `:min` never clobbers `:minimum`.
fn replace_placeholders(template: &str, replacements: &[(String, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(':') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let hit = replacements
            .iter()
            .filter(|(key, _)| tail.starts_with(key.as_str()))
            .max_by_key(|(key, _)| key.len());

        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push(':');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use formguard_i18n::MessageBundle;

    fn formatter() -> ErrorFormatter {
        let id = MessageBundle::new()
            .with("required", ":attribute wajib diisi.")
            .with("max.string", ":attribute maksimal :max karakter.")
            .with("attributes.username", "nama pengguna");
        let table = MessageTable::builder()
            .bundle(&Locale::id(), id)
            .default_locale(Locale::en())
            .build();
        ErrorFormatter::new(Arc::new(table))
    }

    #[test]
    fn test_render_from_table() {
        let failure = Failure::new("username", "required");
        assert_eq!(
            formatter().render(&failure, &Locale::id()),
            "nama pengguna wajib diisi."
        );
    }

    #[test]
    fn test_render_variant_with_parameters() {
        let failure = Failure::new("password", "max")
            .with_variant("string")
            .with_parameter("max", "20");
        assert_eq!(
            formatter().render(&failure, &Locale::id()),
            "password maksimal 20 karakter."
        );
        assert_eq!(
            formatter().render(&failure, &Locale::en()),
            "The password field must not be greater than 20 characters."
        );
    }

    #[test]
    fn test_render_falls_back_to_generic() {
        let failure = Failure::new("first_name", "no_such_rule");
        assert_eq!(
            formatter().render(&failure, &Locale::parse("fr").unwrap()),
            "The first name field is invalid."
        );
    }

    #[test]
    fn test_requested_locale_rule_key_beats_default_variant() {
        let en = MessageBundle::new().with("max.string", "EN variant :max");
        let fr = MessageBundle::new().with("max", "FR plain :max");
        let table = MessageTable::builder()
            .bundle(&Locale::en(), en)
            .bundle(&Locale::parse("fr").unwrap(), fr)
            .default_locale(Locale::en())
            .build();
        let formatter = ErrorFormatter::new(Arc::new(table));
        let failure = Failure::new("name", "max")
            .with_variant("string")
            .with_parameter("max", "3");

        assert_eq!(
            formatter.render(&failure, &Locale::parse("fr-CA").unwrap()),
            "FR plain 3"
        );
        assert_eq!(formatter.render(&failure, &Locale::en()), "EN variant 3");
    }

    #[test]
    fn test_inline_messages_take_precedence() {
        let failure = Failure::new("address.1.city", "required").with_message("custom");
        let messages = HashMap::from([
            ("required".to_string(), "generic :attribute".to_string()),
            ("address.*.city.required".to_string(), "Kota wajib diisi".to_string()),
        ]);
        assert_eq!(
            formatter().render_with(&failure, &Locale::en(), &messages, &HashMap::new()),
            "Kota wajib diisi"
        );

        let messages = HashMap::from([("required".to_string(), "generic :attribute".to_string())]);
        let attributes = HashMap::from([("address.*.city".to_string(), "city".to_string())]);
        assert_eq!(
            formatter().render_with(&failure, &Locale::en(), &messages, &attributes),
            "generic city"
        );
    }

    #[test]
    fn test_custom_message_before_table() {
        let failure = Failure::new("password", "custom")
            .with_message(":attribute must be different with username");
        assert_eq!(
            formatter().render(&failure, &Locale::id()),
            "password must be different with username"
        );
    }

    #[test]
    fn test_attribute_case_placeholders() {
        let failure = Failure::new("username", "x").with_message(":Attribute / :ATTRIBUTE / :attribute");
        assert_eq!(
            formatter().render(&failure, &Locale::en()),
            "Username / USERNAME / username"
        );
    }

    #[test]
    fn test_other_placeholder_uses_display_name() {
        let failure = Failure::new("password", "different").with_parameter("other", "username");
        assert_eq!(
            formatter().render(&failure, &Locale::en()),
            "The password field and username must be different."
        );
    }

    #[test]
    fn test_longest_placeholder_wins() {
        let replacements = vec![
            (":min".to_string(), "1".to_string()),
            (":minimum".to_string(), "2".to_string()),
        ];
        assert_eq!(replace_placeholders(":minimum :min: x", &replacements), "2 1: x");
    }
}
