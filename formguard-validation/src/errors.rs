// Validation failures and configuration errors

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use thiserror::Error;

/// A single violated constraint on one concrete attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Concrete attribute path (`address.0.city`)
    pub attribute: String,

    /// Name of the rule that failed (`required`, `max`, `after`, ...)
    pub rule: String,

    /// Type-dependent message variant (`string`, `numeric`, `array`)
    pub variant: Option<String>,

    /// Placeholder values available to the message template
    pub parameters: Vec<(String, String)>,

    /// Rendered message once evaluation finishes. Before rendering this holds
    /// the raw message supplied by a custom rule, if any.
    pub message: String,
}

impl Failure {
    /// Create a new failure with no message
    pub fn new(attribute: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            rule: rule.into(),
            variant: None,
            parameters: Vec::new(),
            message: String::new(),
        }
    }

    /// Set the raw or rendered message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the message variant
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Add a placeholder value
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.attribute, self.message)
    }
}

/// Every failure produced by one evaluation, keyed by concrete attribute path
/// in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    failures: IndexMap<String, Vec<Failure>>,
}

impl ResultSet {
    /// Create an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no attribute failed
    pub fn passes(&self) -> bool {
        self.failures.is_empty()
    }

    /// Logical negation of [`ResultSet::passes`]
    pub fn fails(&self) -> bool {
        !self.passes()
    }

    /// Check if there are any failures
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of failures across all attributes
    pub fn len(&self) -> usize {
        self.failures.values().map(Vec::len).sum()
    }

    /// Append a failure under its attribute
    pub fn add(&mut self, failure: Failure) {
        self.failures
            .entry(failure.attribute.clone())
            .or_default()
            .push(failure);
    }

    /// Failures recorded for an attribute
    pub fn get(&self, attribute: &str) -> &[Failure] {
        self.failures
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First message for an attribute
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).first().map(|f| f.message.as_str())
    }

    /// Check if an attribute has failures
    pub fn has(&self, attribute: &str) -> bool {
        self.failures.contains_key(attribute)
    }

    /// Attributes with failures, in evaluation order
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.failures.keys().map(String::as_str)
    }

    /// Iterate over every failure in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &Failure> {
        self.failures.values().flatten()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Failure> {
        self.failures.values_mut().flatten()
    }

    /// Messages grouped by attribute
    pub fn messages(&self) -> IndexMap<String, Vec<String>> {
        self.failures
            .iter()
            .map(|(attribute, failures)| {
                (
                    attribute.clone(),
                    failures.iter().map(|f| f.message.clone()).collect(),
                )
            })
            .collect()
    }

    /// Convert to the `{attribute: [message, ...]}` JSON shape
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.failures.len()))?;
        for (attribute, failures) in &self.failures {
            let messages: Vec<&str> = failures.iter().map(|f| f.message.as_str()).collect();
            map.serialize_entry(attribute, &messages)?;
        }
        map.end()
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for failure in self.iter() {
            writeln!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl From<Vec<Failure>> for ResultSet {
    fn from(failures: Vec<Failure>) -> Self {
        let mut set = Self::new();
        for failure in failures {
            set.add(failure);
        }
        set
    }
}

/// Programming or configuration defects. These abort an evaluation and are
/// never reported as field-level failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("Unknown validation rule: {0}")]
    UnknownRule(String),

    #[error("Malformed rule set: {0}")]
    MalformedRuleSet(String),

    #[error("Invalid parameter for rule '{rule}': {reason}")]
    InvalidParameter { rule: String, reason: String },

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Rule '{rule}' callback failed: {message}")]
    Callback { rule: String, message: String },
}

impl RuleError {
    pub(crate) fn invalid_parameter(rule: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap an error raised inside a custom rule callback
    pub fn callback(rule: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Callback {
            rule: rule.into(),
            message: message.to_string(),
        }
    }
}

/// Outcome of [`Validation::validate`](crate::Validation::validate) when the
/// input is not accepted.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// The input violated one or more constraints
    #[error("The given data was invalid ({} failures)", .0.len())]
    Failed(ResultSet),

    /// The rule set itself is defective
    #[error(transparent)]
    Rule(#[from] RuleError),
}

impl ValidationError {
    /// Result set of a data failure
    pub fn result_set(&self) -> Option<&ResultSet> {
        match self {
            ValidationError::Failed(results) => Some(results),
            ValidationError::Rule(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_set_passes() {
        let results = ResultSet::new();
        assert!(results.passes());
        assert!(!results.fails());
        assert_eq!(results.len(), 0);
    }

    #[test]
    fn test_failures_grouped_in_insertion_order() {
        let mut results = ResultSet::new();
        results.add(Failure::new("password", "required").with_message("p1"));
        results.add(Failure::new("username", "email").with_message("u1"));
        results.add(Failure::new("password", "min").with_message("p2"));

        assert!(results.fails());
        assert_eq!(results.len(), 3);
        assert_eq!(
            results.attributes().collect::<Vec<_>>(),
            vec!["password", "username"]
        );
        assert_eq!(results.first("password"), Some("p1"));
        assert_eq!(results.get("password").len(), 2);
        assert!(results.get("missing").is_empty());
    }

    #[test]
    fn test_serializes_as_message_map() {
        let mut results = ResultSet::new();
        results.add(Failure::new("username", "required").with_message("required!"));

        let json = serde_json::to_string(&results).unwrap();
        assert_eq!(json, r#"{"username":["required!"]}"#);
        assert_eq!(results.to_json()["username"][0], "required!");
    }

    #[test]
    fn test_rule_error_display() {
        let error = RuleError::UnknownRule("emial".to_string());
        assert_eq!(error.to_string(), "Unknown validation rule: emial");

        let error = RuleError::invalid_parameter("max", "expected a number");
        assert!(error.to_string().contains("max"));
    }
}
