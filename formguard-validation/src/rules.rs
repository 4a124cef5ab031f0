// Rule references, rule specs and rule sets

use crate::path::PathPattern;
use crate::{Fail, RuleError, ValidationRule};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type ClosureFn = Arc<dyn Fn(&str, Option<&Value>, &mut Fail) -> Result<(), RuleError> + Send + Sync>;

/// A caller-supplied function rule.
#[derive(Clone)]
pub struct ClosureRule {
    name: String,
    f: ClosureFn,
}

impl ClosureRule {
    /// Rule name reported in failures
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call(
        &self,
        attribute: &str,
        value: Option<&Value>,
        fail: &mut Fail,
    ) -> Result<(), RuleError> {
        (self.f)(attribute, value, fail)
    }
}

/// One constraint in a [`RuleSpec`].
#[derive(Clone)]
pub enum Rule {
    /// A registry rule addressed by name, with its string parameters
    Builtin { name: String, params: Vec<String> },
    /// A caller-supplied function
    Closure(ClosureRule),
    /// A caller-supplied rule object
    Object(Arc<dyn ValidationRule>),
}

impl Rule {
    /// Parse `name` or `name:p1,p2`. `regex` keeps everything after the first
    /// colon as its only parameter.
    pub fn parse(item: &str) -> Self {
        let item = item.trim();
        let (name, params) = match item.split_once(':') {
            Some((name, raw)) if name == "regex" || name == "not_regex" => {
                (name, vec![raw.to_string()])
            }
            Some((name, raw)) => (name, raw.split(',').map(|p| p.trim().to_string()).collect()),
            None => (item, Vec::new()),
        };

        Rule::Builtin {
            name: name.to_string(),
            params,
        }
    }

    /// A registry rule with explicit parameters
    pub fn builtin<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::Builtin {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// A closure receiving `(attribute, value, fail)`
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&str, Option<&Value>, &mut Fail) -> Result<(), RuleError> + Send + Sync + 'static,
    {
        Self::named_closure("closure", f)
    }

    /// A closure with a custom rule name
    pub fn named_closure<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str, Option<&Value>, &mut Fail) -> Result<(), RuleError> + Send + Sync + 'static,
    {
        Rule::Closure(ClosureRule {
            name: name.into(),
            f: Arc::new(f),
        })
    }

    /// A rule object
    pub fn object(rule: impl ValidationRule + 'static) -> Self {
        Rule::Object(Arc::new(rule))
    }

    /// Name used in failures and message lookups
    pub fn name(&self) -> &str {
        match self {
            Rule::Builtin { name, .. } => name.as_str(),
            Rule::Closure(closure) => closure.name(),
            Rule::Object(object) => object.name(),
        }
    }

    pub(crate) fn is_builtin(&self, wanted: &str) -> bool {
        matches!(self, Rule::Builtin { name, .. } if name == wanted)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Builtin { name, params } if params.is_empty() => write!(f, "{}", name),
            Rule::Builtin { name, params } => write!(f, "{}:{}", name, params.join(",")),
            Rule::Closure(closure) => write!(f, "<closure {}>", closure.name()),
            Rule::Object(object) => write!(f, "<object {}>", object.name()),
        }
    }
}

impl From<&str> for Rule {
    fn from(item: &str) -> Self {
        Rule::parse(item)
    }
}

impl<R: ValidationRule + 'static> From<Arc<R>> for Rule {
    fn from(rule: Arc<R>) -> Self {
        Rule::Object(rule)
    }
}

/// The ordered constraints bound to one attribute pattern.
#[derive(Debug, Clone, Default)]
pub struct RuleSpec {
    rules: Vec<Rule>,
}

impl RuleSpec {
    /// Create an empty spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a pipe-delimited rule string (`required|email|max:100`)
    pub fn parse(rules: &str) -> Self {
        Self {
            rules: rules
                .split('|')
                .filter(|item| !item.trim().is_empty())
                .map(Rule::parse)
                .collect(),
        }
    }

    /// Append a rule
    pub fn rule(mut self, rule: impl Into<Rule>) -> Self {
        self.rules.push(rule.into());
        self
    }

    /// Append a closure rule
    pub fn closure<F>(self, f: F) -> Self
    where
        F: Fn(&str, Option<&Value>, &mut Fail) -> Result<(), RuleError> + Send + Sync + 'static,
    {
        self.rule(Rule::closure(f))
    }

    /// Append a rule object
    pub fn object(self, rule: impl ValidationRule + 'static) -> Self {
        self.rule(Rule::object(rule))
    }

    /// Rules in declared order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether a marker or registry rule is present by name
    pub fn has(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.is_builtin(name))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are declared
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<&str> for RuleSpec {
    fn from(rules: &str) -> Self {
        RuleSpec::parse(rules)
    }
}

impl From<String> for RuleSpec {
    fn from(rules: String) -> Self {
        RuleSpec::parse(&rules)
    }
}

impl From<Rule> for RuleSpec {
    fn from(rule: Rule) -> Self {
        RuleSpec { rules: vec![rule] }
    }
}

impl From<Vec<Rule>> for RuleSpec {
    fn from(rules: Vec<Rule>) -> Self {
        RuleSpec { rules }
    }
}

impl<const N: usize> From<[&str; N]> for RuleSpec {
    fn from(items: [&str; N]) -> Self {
        RuleSpec {
            rules: items.into_iter().map(Rule::parse).collect(),
        }
    }
}

impl<const N: usize> From<[Rule; N]> for RuleSpec {
    fn from(rules: [Rule; N]) -> Self {
        RuleSpec {
            rules: rules.into(),
        }
    }
}

impl FromIterator<Rule> for RuleSpec {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        RuleSpec {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Attribute patterns mapped to their rule specs, in insertion order.
///
/// ```
/// use formguard_validation::{Rule, RuleSet};
///
/// let rules = RuleSet::new()
///     .field("username", "required|email|max:100")
///     .field("password", ["required", "min:6", "max:20"])
///     .field("address.*.city", [Rule::parse("required"), Rule::parse("max:100")]);
///
/// assert_eq!(rules.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    entries: IndexMap<String, RuleSpec>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a spec to an attribute pattern. Binding the same pattern again
    /// replaces the earlier spec but keeps its position.
    pub fn field(mut self, pattern: impl Into<String>, spec: impl Into<RuleSpec>) -> Self {
        self.insert(pattern, spec);
        self
    }

    /// Non-consuming [`RuleSet::field`]
    pub fn insert(&mut self, pattern: impl Into<String>, spec: impl Into<RuleSpec>) {
        self.entries.insert(pattern.into(), spec.into());
    }

    /// Spec bound to a pattern
    pub fn get(&self, pattern: &str) -> Option<&RuleSpec> {
        self.entries.get(pattern)
    }

    /// Patterns and specs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no patterns are bound
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse every pattern, failing on the first malformed one
    pub(crate) fn compile(&self) -> Result<Vec<(PathPattern, &RuleSpec)>, RuleError> {
        self.entries
            .iter()
            .map(|(pattern, spec)| Ok((PathPattern::parse(pattern)?, spec)))
            .collect()
    }
}

impl<K: Into<String>, S: Into<RuleSpec>> FromIterator<(K, S)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        for (pattern, spec) in iter {
            set.insert(pattern, spec);
        }
        set
    }
}
