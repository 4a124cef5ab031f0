// Rule objects shipped with the engine

use crate::validators::literal;
use crate::{EvaluationContext, Fail, RuleError, ValidationRule};
use regex::Regex;
use serde_json::Value;

/// Object form of the `in` rule.
///
/// ```
/// use formguard_validation::{In, RuleSpec};
///
/// let spec = RuleSpec::new().rule("required").object(In::new(["Miftah", "Fadilah", "71"]));
/// assert_eq!(spec.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct In {
    values: Vec<String>,
}

impl In {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            values: values.into_iter().map(|v| v.to_string()).collect(),
        }
    }

    fn contains(&self, value: &Value) -> bool {
        literal(value).is_some_and(|s| self.values.contains(&s))
    }
}

impl ValidationRule for In {
    fn name(&self) -> &str {
        "in"
    }

    fn validate(&self, ctx: &EvaluationContext<'_>, fail: &mut Fail) -> Result<(), RuleError> {
        let accepted = match ctx.value() {
            Some(Value::Array(items)) => items.iter().all(|v| self.contains(v)),
            Some(value) => self.contains(value),
            None => false,
        };
        if !accepted {
            fail.fail_rule("in", [("values", self.values.join(", "))]);
        }
        Ok(())
    }
}

/// Password strength requirements.
///
/// Each enabled requirement that the value misses is reported separately
/// under its own message key (`password.min`, `password.letters`,
/// `password.mixed`, `password.numbers`, `password.symbols`).
///
/// ```
/// use formguard_validation::Password;
///
/// let rule = Password::min(6).letters().numbers().symbols();
/// assert_eq!(rule.min_length(), 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Password {
    min: usize,
    letters: bool,
    mixed_case: bool,
    numbers: bool,
    symbols: bool,
}

impl Password {
    /// Require at least `length` characters
    pub fn min(length: usize) -> Self {
        Self {
            min: length,
            ..Self::default()
        }
    }

    /// Require at least one letter
    pub fn letters(mut self) -> Self {
        self.letters = true;
        self
    }

    /// Require both an upper case and a lower case letter
    pub fn mixed_case(mut self) -> Self {
        self.mixed_case = true;
        self
    }

    /// Require at least one digit
    pub fn numbers(mut self) -> Self {
        self.numbers = true;
        self
    }

    /// Require at least one symbol, punctuation or space character
    pub fn symbols(mut self) -> Self {
        self.symbols = true;
        self
    }

    pub fn min_length(&self) -> usize {
        self.min
    }
}

impl ValidationRule for Password {
    fn name(&self) -> &str {
        "password"
    }

    fn validate(&self, ctx: &EvaluationContext<'_>, fail: &mut Fail) -> Result<(), RuleError> {
        let Some(password) = ctx.as_str() else {
            fail.fail_rule("string", std::iter::empty::<(String, String)>());
            return Ok(());
        };

        let none = std::iter::empty::<(String, String)>;
        if password.chars().count() < self.min {
            fail.fail_rule("password.min", [("min", self.min.to_string())]);
        }
        if self.letters && !password.chars().any(char::is_alphabetic) {
            fail.fail_rule("password.letters", none());
        }
        if self.mixed_case
            && !(password.chars().any(char::is_uppercase) && password.chars().any(char::is_lowercase))
        {
            fail.fail_rule("password.mixed", none());
        }
        if self.numbers && !password.chars().any(|c| c.is_ascii_digit()) {
            fail.fail_rule("password.numbers", none());
        }
        if self.symbols && !password.chars().any(|c| !c.is_alphanumeric()) {
            fail.fail_rule("password.symbols", none());
        }
        Ok(())
    }
}

/// Regex match as a rule object. Unlike the `regex:` string form the pattern
/// is compiled once, when the rule is built.
#[derive(Debug, Clone)]
pub struct Matches {
    pattern: Regex,
    message: Option<String>,
}

impl Matches {
    pub fn new(pattern: &str) -> Result<Self, RuleError> {
        let pattern = Regex::new(pattern).map_err(|e| RuleError::invalid_parameter("regex", e.to_string()))?;
        Ok(Self {
            pattern,
            message: None,
        })
    }

    /// Use a fixed message instead of the `regex` template
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ValidationRule for Matches {
    fn name(&self) -> &str {
        "regex"
    }

    fn validate(&self, ctx: &EvaluationContext<'_>, fail: &mut Fail) -> Result<(), RuleError> {
        if ctx.as_str().is_some_and(|s| self.pattern.is_match(s)) {
            return Ok(());
        }
        match &self.message {
            Some(message) => fail.fail(message.clone()),
            None => fail.fail_rule("regex", std::iter::empty::<(String, String)>()),
        }
        Ok(())
    }
}
