// Attribute path patterns and their resolution against a document

use crate::document::child;
use crate::{Document, RuleError};
use serde_json::Value;
use std::fmt;

/// One segment of an attribute path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A field name or sequence index
    Key(String),
    /// `*`, expanding over every element of a sequence or nested document
    Wildcard,
}

/// A parsed attribute path pattern such as `address.*.city`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a dotted pattern
    pub fn parse(pattern: &str) -> Result<Self, RuleError> {
        if pattern.is_empty() {
            return Err(RuleError::MalformedRuleSet(
                "attribute pattern must not be empty".to_string(),
            ));
        }

        let segments = pattern
            .split('.')
            .map(|segment| match segment {
                "" => Err(RuleError::MalformedRuleSet(format!(
                    "empty segment in attribute pattern '{}'",
                    pattern
                ))),
                "*" => Ok(Segment::Wildcard),
                key => Ok(Segment::Key(key.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Original pattern text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the pattern contains at least one wildcard
    pub fn has_wildcard(&self) -> bool {
        self.segments.contains(&Segment::Wildcard)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A concrete attribute produced by resolving a pattern
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAttribute<'a> {
    /// Concrete dotted path (`address.1.city`)
    pub path: String,
    /// Value at the path, `None` when the key is absent
    pub value: Option<&'a Value>,
}

impl ResolvedAttribute<'_> {
    /// Distinguishes an absent key from a present null or empty value
    pub fn exists(&self) -> bool {
        self.value.is_some()
    }
}

/// Resolves attribute patterns against documents
pub struct PathResolver;

impl PathResolver {
    /// Expand `pattern` against `document` into concrete attributes.
    ///
    /// Exact paths yield exactly one attribute (possibly absent). Each
    /// wildcard fans out over the elements found at that position, left to
    /// right, in document order; an absent or scalar value under a wildcard
    /// yields nothing.
    pub fn resolve<'a>(document: &'a Document, pattern: &PathPattern) -> Vec<ResolvedAttribute<'a>> {
        let mut frontier: Vec<(String, Option<&'a Value>)> = Vec::with_capacity(1);
        let mut segments = pattern.segments().iter();

        match segments.next() {
            Some(Segment::Key(key)) => frontier.push((key.clone(), document.fields().get(key))),
            Some(Segment::Wildcard) => {
                for (key, value) in document.fields() {
                    frontier.push((key.clone(), Some(value)));
                }
            }
            None => return Vec::new(),
        }

        for segment in segments {
            let mut next = Vec::with_capacity(frontier.len());
            for (path, value) in frontier {
                match segment {
                    Segment::Key(key) => {
                        let found = value.and_then(|v| child(v, key));
                        next.push((format!("{}.{}", path, key), found));
                    }
                    Segment::Wildcard => match value {
                        Some(Value::Array(items)) => {
                            for (index, item) in items.iter().enumerate() {
                                next.push((format!("{}.{}", path, index), Some(item)));
                            }
                        }
                        Some(Value::Object(map)) => {
                            for (key, item) in map {
                                next.push((format!("{}.{}", path, key), Some(item)));
                            }
                        }
                        _ => {}
                    },
                }
            }
            frontier = next;
        }

        frontier
            .into_iter()
            .map(|(path, value)| ResolvedAttribute { path, value })
            .collect()
    }

    /// Parse and resolve in one step
    pub fn resolve_str<'a>(
        document: &'a Document,
        pattern: &str,
    ) -> Result<Vec<ResolvedAttribute<'a>>, RuleError> {
        Ok(Self::resolve(document, &PathPattern::parse(pattern)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_exact_path_resolves_once() {
        let document = doc(json!({"name": {"first": "Miftah"}}));

        let found = PathResolver::resolve_str(&document, "name.first").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "name.first");
        assert_eq!(found[0].value, Some(&json!("Miftah")));

        let missing = PathResolver::resolve_str(&document, "name.last").unwrap();
        assert_eq!(missing.len(), 1);
        assert!(!missing[0].exists());
    }

    #[test]
    fn test_present_null_exists() {
        let document = doc(json!({"nickname": null}));
        let found = PathResolver::resolve_str(&document, "nickname").unwrap();
        assert!(found[0].exists());
        assert_eq!(found[0].value, Some(&Value::Null));
    }

    #[test]
    fn test_wildcard_expands_per_element() {
        let document = doc(json!({
            "address": [{"city": "Bogor"}, {"street": "Jl. Dramaga"}]
        }));

        let found = PathResolver::resolve_str(&document, "address.*.city").unwrap();
        let paths: Vec<&str> = found.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["address.0.city", "address.1.city"]);
        assert!(found[0].exists());
        assert!(!found[1].exists());
    }

    #[test]
    fn test_wildcard_over_absent_or_empty_yields_nothing() {
        let document = doc(json!({"address": [], "name": "x"}));
        assert!(PathResolver::resolve_str(&document, "address.*.city").unwrap().is_empty());
        assert!(PathResolver::resolve_str(&document, "missing.*.city").unwrap().is_empty());
        assert!(PathResolver::resolve_str(&document, "name.*").unwrap().is_empty());
    }

    #[test]
    fn test_multiple_wildcards_unroll_in_document_order() {
        let document = doc(json!({
            "orders": [
                {"items": [{"sku": "a"}, {"sku": "b"}]},
                {"items": [{"sku": "c"}]}
            ]
        }));

        let found = PathResolver::resolve_str(&document, "orders.*.items.*.sku").unwrap();
        let paths: Vec<&str> = found.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["orders.0.items.0.sku", "orders.0.items.1.sku", "orders.1.items.0.sku"]
        );
    }

    #[test]
    fn test_wildcard_over_nested_document_uses_keys() {
        let document = doc(json!({"name": {"first": "Miftah", "last": "Fadilah"}}));
        let found = PathResolver::resolve_str(&document, "name.*").unwrap();
        let paths: Vec<&str> = found.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["name.first", "name.last"]);
    }

    #[test]
    fn test_malformed_patterns_rejected() {
        assert!(PathPattern::parse("").is_err());
        assert!(PathPattern::parse("a..b").is_err());
        assert!(PathPattern::parse(".a").is_err());
        assert!(PathPattern::parse("a.").is_err());
        assert!(PathPattern::parse("a.*.b").unwrap().has_wildcard());
    }
}
