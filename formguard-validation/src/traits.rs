// Validation traits

use crate::{Document, Failure, RuleError};
use formguard_i18n::Locale;
use serde_json::Value;

/// What a rule can see while it runs.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub(crate) attribute: &'a str,
    pub(crate) value: Option<&'a Value>,
    pub(crate) data: Option<&'a Document>,
    pub(crate) locale: &'a Locale,
    pub(crate) numeric: bool,
}

impl<'a> EvaluationContext<'a> {
    /// Build a context by hand, mainly for testing rules in isolation
    pub fn new(attribute: &'a str, value: Option<&'a Value>, locale: &'a Locale) -> Self {
        Self {
            attribute,
            value,
            data: None,
            locale,
            numeric: false,
        }
    }

    /// Give the rule read access to the full document
    pub fn with_data(mut self, data: &'a Document) -> Self {
        self.data = Some(data);
        self
    }

    /// Concrete attribute path under evaluation
    pub fn attribute(&self) -> &'a str {
        self.attribute
    }

    /// Value of the attribute, `None` when absent
    pub fn value(&self) -> Option<&'a Value> {
        self.value
    }

    /// Whether the attribute key is present (even if null)
    pub fn exists(&self) -> bool {
        self.value.is_some()
    }

    /// The value as a string slice, when it is a string
    pub fn as_str(&self) -> Option<&'a str> {
        self.value.and_then(Value::as_str)
    }

    /// Full input document. Only built-in rules and rules that declare
    /// [`ValidationRule::data_aware`] receive it.
    pub fn data(&self) -> Option<&'a Document> {
        self.data
    }

    /// Locale the messages will be rendered in
    pub fn locale(&self) -> &'a Locale {
        self.locale
    }

    /// Whether size rules compare this attribute numerically
    pub fn is_numeric(&self) -> bool {
        self.numeric
    }
}

/// Collects the failures a custom rule reports for its attribute.
#[derive(Debug)]
pub struct Fail {
    attribute: String,
    rule: String,
    failures: Vec<Failure>,
}

impl Fail {
    pub(crate) fn new(attribute: &str, rule: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            rule: rule.to_string(),
            failures: Vec::new(),
        }
    }

    /// Report a failure. `:attribute` in the message is substituted when the
    /// failure is rendered.
    pub fn fail(&mut self, message: impl Into<String>) {
        let failure = Failure::new(&self.attribute, &self.rule).with_message(message);
        self.failures.push(failure);
    }

    /// Report a failure under a message key of its own (`password.min`),
    /// rendered from the message table like a built-in rule.
    pub fn fail_rule<I, K, V>(&mut self, rule: impl Into<String>, parameters: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let failure = parameters
            .into_iter()
            .fold(Failure::new(&self.attribute, rule), |f, (k, v)| {
                f.with_parameter(k, v)
            });
        self.failures.push(failure);
    }

    /// Whether anything was reported
    pub fn failed(&self) -> bool {
        !self.failures.is_empty()
    }

    pub(crate) fn into_failures(self) -> Vec<Failure> {
        self.failures
    }
}

/// Trait for rule objects supplied by the caller.
///
/// ```
/// use formguard_validation::{EvaluationContext, Fail, RuleError, ValidationRule};
///
/// struct Uppercase;
///
/// impl ValidationRule for Uppercase {
///     fn name(&self) -> &str {
///         "uppercase"
///     }
///
///     fn validate(&self, ctx: &EvaluationContext<'_>, fail: &mut Fail) -> Result<(), RuleError> {
///         if let Some(value) = ctx.as_str() {
///             if value.to_uppercase() != value {
///                 fail.fail("The :attribute must be uppercase");
///             }
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait ValidationRule: Send + Sync {
    /// Rule name used in failures and message lookups
    fn name(&self) -> &str {
        "custom"
    }

    /// Implicit rules also run when the attribute is absent or empty
    fn implicit(&self) -> bool {
        false
    }

    /// Rules comparing against sibling fields must opt in to receive the
    /// document through [`EvaluationContext::data`]
    fn data_aware(&self) -> bool {
        false
    }

    /// Check the attribute and report failures through `fail`. An `Err` is a
    /// defect in the rule and aborts the whole evaluation.
    fn validate(&self, ctx: &EvaluationContext<'_>, fail: &mut Fail) -> Result<(), RuleError>;
}
