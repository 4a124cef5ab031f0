// Rule set evaluation

use crate::path::{PathResolver, ResolvedAttribute};
use crate::registry::MARKERS;
use crate::validators::{literal, measure};
use crate::{
    Document, ErrorFormatter, EvaluationContext, Fail, Failure, ResultSet, Rule, RuleError,
    RuleRegistry, RuleSet, RuleSpec, ValidationError,
};
use formguard_i18n::{Locale, MessageTable};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

type AfterHook<'a> = Box<dyn Fn(&Document, &mut ErrorAppender) -> Result<(), RuleError> + 'a>;

/// Shared evaluation settings.
///
/// Holds the read-only [`RuleRegistry`] and message table, so one evaluator
/// can be cloned into every request handler.
///
/// ```
/// use formguard_validation::{Document, Evaluator, RuleSet};
/// use serde_json::json;
///
/// let evaluator = Evaluator::default();
/// let document = Document::from_value(json!({"username": "admin", "password": ""})).unwrap();
/// let rules = RuleSet::new()
///     .field("username", "required|email|max:100")
///     .field("password", "required");
///
/// let results = evaluator.make(&document, &rules).evaluate().unwrap();
/// assert!(results.fails());
/// assert_eq!(results.first("password"), Some("The password field is required."));
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    registry: Arc<RuleRegistry>,
    formatter: ErrorFormatter,
    locale: Locale,
    stop_on_first_failure: bool,
}

impl Evaluator {
    /// Create an evaluator rendering messages from `table` in the table's
    /// default locale.
    pub fn new(registry: Arc<RuleRegistry>, table: Arc<MessageTable>) -> Self {
        let locale = table.default_locale().clone();
        Self {
            registry,
            formatter: ErrorFormatter::new(table),
            locale,
            stop_on_first_failure: false,
        }
    }

    /// Default locale for rendered messages
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Stop evaluating an attribute after its first failure
    pub fn stop_on_first_failure(mut self, enabled: bool) -> Self {
        self.stop_on_first_failure = enabled;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn formatter(&self) -> &ErrorFormatter {
        &self.formatter
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Prepare one evaluation of `rules` against `document`
    pub fn make<'a>(&'a self, document: &'a Document, rules: &'a RuleSet) -> Validation<'a> {
        Validation {
            evaluator: self,
            document,
            rules,
            messages: HashMap::new(),
            attributes: HashMap::new(),
            locale: self.locale.clone(),
            stop_on_first_failure: self.stop_on_first_failure,
            after: Vec::new(),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(
            Arc::new(RuleRegistry::with_defaults()),
            Arc::new(MessageTable::empty()),
        )
    }
}

/// Lets after-hooks attach failures once every attribute has been checked.
#[derive(Debug, Default)]
pub struct ErrorAppender {
    failures: Vec<Failure>,
}

impl ErrorAppender {
    /// Add a failure with rule name `after`
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.failures
            .push(Failure::new(attribute, "after").with_message(message));
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A single evaluation of a rule set against a document.
pub struct Validation<'a> {
    evaluator: &'a Evaluator,
    document: &'a Document,
    rules: &'a RuleSet,
    messages: HashMap<String, String>,
    attributes: HashMap<String, String>,
    locale: Locale,
    stop_on_first_failure: bool,
    after: Vec<AfterHook<'a>>,
}

impl<'a> Validation<'a> {
    /// Inline messages keyed by `rule` or `attribute.rule`
    pub fn messages<I, K, V>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.messages
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Display names substituted for `:attribute`
    pub fn attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Render messages in `locale`
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Override the evaluator's stop-on-first-failure policy
    pub fn stop_on_first_failure(mut self, enabled: bool) -> Self {
        self.stop_on_first_failure = enabled;
        self
    }

    /// Run `hook` after all attributes have been evaluated
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Document, &mut ErrorAppender) -> Result<(), RuleError> + 'a,
    {
        self.after.push(Box::new(hook));
        self
    }

    /// Evaluate every rule and collect the rendered failures.
    ///
    /// Configuration errors (unknown rules, malformed patterns, bad
    /// parameters, failing callbacks) abort the evaluation.
    pub fn evaluate(&self) -> Result<ResultSet, RuleError> {
        let compiled = self.rules.compile()?;
        for (_, spec) in &compiled {
            self.check_names(spec)?;
        }

        let mut results = ResultSet::new();
        for (pattern, spec) in &compiled {
            for attribute in PathResolver::resolve(self.document, pattern) {
                for failure in self.evaluate_attribute(&attribute, spec)? {
                    results.add(failure);
                }
            }
        }

        let mut appender = ErrorAppender::default();
        for hook in &self.after {
            hook(self.document, &mut appender)?;
        }
        for failure in appender.failures {
            results.add(failure);
        }

        let formatter = &self.evaluator.formatter;
        for failure in results.iter_mut() {
            failure.message =
                formatter.render_with(failure, &self.locale, &self.messages, &self.attributes);
        }

        Ok(results)
    }

    /// Evaluate and return the validated subset of the document: only the
    /// attributes named by the rule set that are present in the input.
    pub fn validate(&self) -> Result<Document, ValidationError> {
        let results = self.evaluate()?;
        if results.fails() {
            return Err(ValidationError::Failed(results));
        }

        let mut validated = Document::new();
        for (pattern, _) in self.rules.compile()? {
            for attribute in PathResolver::resolve(self.document, &pattern) {
                if let Some(value) = attribute.value {
                    validated.insert(&attribute.path, value.clone());
                }
            }
        }
        Ok(validated)
    }

    pub fn passes(&self) -> Result<bool, RuleError> {
        Ok(self.evaluate()?.passes())
    }

    pub fn fails(&self) -> Result<bool, RuleError> {
        Ok(self.evaluate()?.fails())
    }

    fn check_names(&self, spec: &RuleSpec) -> Result<(), RuleError> {
        for rule in spec.rules() {
            if let Rule::Builtin { name, .. } = rule {
                if !MARKERS.contains(&name.as_str()) {
                    self.evaluator.registry.lookup(name)?;
                }
            }
        }
        Ok(())
    }

    fn evaluate_attribute(
        &self,
        attribute: &ResolvedAttribute<'_>,
        spec: &RuleSpec,
    ) -> Result<Vec<Failure>, RuleError> {
        let value = attribute.value;
        if spec.has("sometimes") && value.is_none() {
            return Ok(Vec::new());
        }

        let bail = self.stop_on_first_failure || spec.has("bail");
        let skip_optional = match value {
            None => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Null) => spec.has("nullable"),
            Some(_) => false,
        };

        let ctx = EvaluationContext {
            attribute: &attribute.path,
            value,
            data: None,
            locale: &self.locale,
            numeric: spec.has("numeric") || spec.has("integer"),
        };
        let with_data = ctx.with_data(self.document);

        let mut failures = Vec::new();
        for rule in spec.rules() {
            let reported = match rule {
                Rule::Builtin { name, params } => {
                    if MARKERS.contains(&name.as_str()) {
                        continue;
                    }
                    let definition = self.evaluator.registry.lookup(name)?;
                    definition.check_arity(name, params)?;
                    if skip_optional && !definition.is_implicit() {
                        continue;
                    }
                    if definition.check(&with_data, params)? {
                        continue;
                    }

                    let mut failure = Failure::new(&attribute.path, name.as_str());
                    if definition.is_sized() {
                        let variant = measure(&ctx).map_or("string", |(_, variant)| variant);
                        failure = failure.with_variant(variant);
                    }
                    failure.parameters = definition.replacements(params);
                    vec![failure]
                }
                Rule::Closure(closure) => {
                    if skip_optional {
                        continue;
                    }
                    let mut fail = Fail::new(&attribute.path, closure.name());
                    closure
                        .call(&attribute.path, value, &mut fail)
                        .map_err(|e| as_callback(closure.name(), e))?;
                    fail.into_failures()
                }
                Rule::Object(object) => {
                    if skip_optional && !object.implicit() {
                        continue;
                    }
                    let ctx = if object.data_aware() { with_data } else { ctx };
                    let mut fail = Fail::new(&attribute.path, object.name());
                    object
                        .validate(&ctx, &mut fail)
                        .map_err(|e| as_callback(object.name(), e))?;
                    fail.into_failures()
                }
            };

            if reported.is_empty() {
                continue;
            }
            failures.extend(reported.into_iter().map(|f| with_value(f, value)));
            if bail {
                failures.truncate(1);
                break;
            }
        }

        Ok(failures)
    }
}

fn as_callback(rule: &str, error: RuleError) -> RuleError {
    match error {
        RuleError::Callback { .. } => error,
        other => RuleError::callback(rule, other),
    }
}

fn with_value(mut failure: Failure, value: Option<&Value>) -> Failure {
    let already = failure.parameters.iter().any(|(name, _)| name == "value");
    if let (false, Some(text)) = (already, value.and_then(literal)) {
        failure.parameters.push(("value".to_string(), text));
    }
    failure
}
