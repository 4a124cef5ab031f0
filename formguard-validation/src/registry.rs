// Named rule registry

use crate::validators::{self, CheckResult};
use crate::{EvaluationContext, RuleError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type CheckFn = Arc<dyn Fn(&EvaluationContext<'_>, &[String]) -> CheckResult + Send + Sync>;

/// Names that modify evaluation instead of checking anything.
pub const MARKERS: &[&str] = &["bail", "nullable", "sometimes"];

/// How many parameters a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, count: usize) -> bool {
        match self {
            Arity::None => count == 0,
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::None => write!(f, "no parameters"),
            Arity::Exactly(1) => write!(f, "exactly 1 parameter"),
            Arity::Exactly(n) => write!(f, "exactly {} parameters", n),
            Arity::AtLeast(n) => write!(f, "at least {} parameter(s)", n),
        }
    }
}

/// How a rule's parameters are exposed to message placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholders {
    None,
    Positional(&'static [&'static str]),
    List(&'static str),
}

/// A named check with its evaluation properties.
#[derive(Clone)]
pub struct RuleDefinition {
    check: CheckFn,
    implicit: bool,
    sized: bool,
    arity: Arity,
    placeholders: Placeholders,
}

impl RuleDefinition {
    /// A non-implicit rule taking no parameters
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&EvaluationContext<'_>, &[String]) -> CheckResult + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
            implicit: false,
            sized: false,
            arity: Arity::None,
            placeholders: Placeholders::None,
        }
    }

    /// Run even when the attribute is absent or empty
    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    /// Messages are looked up per size variant (`min.string`, `min.numeric`)
    pub fn sized(mut self) -> Self {
        self.sized = true;
        self
    }

    /// Required parameter count
    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    /// Expose parameters to messages by position (`:min`, `:max`)
    pub fn placeholders(mut self, names: &'static [&'static str]) -> Self {
        if self.arity == Arity::None {
            self.arity = Arity::Exactly(names.len());
        }
        self.placeholders = Placeholders::Positional(names);
        self
    }

    /// Expose all parameters joined with `, ` under one placeholder
    pub fn list_placeholder(mut self, name: &'static str) -> Self {
        if self.arity == Arity::None {
            self.arity = Arity::AtLeast(1);
        }
        self.placeholders = Placeholders::List(name);
        self
    }

    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub fn is_sized(&self) -> bool {
        self.sized
    }

    pub fn get_arity(&self) -> Arity {
        self.arity
    }

    /// Verify the parameter count before the rule runs
    pub fn check_arity(&self, rule: &str, params: &[String]) -> Result<(), RuleError> {
        if self.arity.accepts(params.len()) {
            Ok(())
        } else {
            Err(RuleError::invalid_parameter(
                rule,
                format!("expected {}, got {}", self.arity, params.len()),
            ))
        }
    }

    /// Run the check
    pub fn check(&self, ctx: &EvaluationContext<'_>, params: &[String]) -> CheckResult {
        (self.check)(ctx, params)
    }

    /// Placeholder values for a failure of this rule
    pub fn replacements(&self, params: &[String]) -> Vec<(String, String)> {
        match self.placeholders {
            Placeholders::None => Vec::new(),
            Placeholders::Positional(names) => names
                .iter()
                .zip(params)
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            Placeholders::List(name) => vec![(name.to_string(), params.join(", "))],
        }
    }
}

impl fmt::Debug for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDefinition")
            .field("implicit", &self.implicit)
            .field("sized", &self.sized)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Maps rule names to their definitions.
///
/// Built once at startup (usually with [`RuleRegistry::with_defaults`]) and
/// shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, RuleDefinition>,
}

impl RuleRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in rule
    pub fn with_defaults() -> Self {
        use validators as v;

        let mut registry = Self::new();
        registry
            .extend("required", RuleDefinition::new(v::required).implicit())
            .extend("present", RuleDefinition::new(v::present).implicit())
            .extend("filled", RuleDefinition::new(v::filled).implicit())
            .extend("accepted", RuleDefinition::new(v::accepted).implicit())
            .extend(
                "required_with",
                RuleDefinition::new(v::required_with)
                    .implicit()
                    .list_placeholder("values"),
            )
            .extend("email", RuleDefinition::new(v::email))
            .extend("url", RuleDefinition::new(v::url))
            .extend("uuid", RuleDefinition::new(v::uuid))
            .extend("alpha", RuleDefinition::new(v::alpha))
            .extend("alpha_num", RuleDefinition::new(v::alpha_num))
            .extend("alpha_dash", RuleDefinition::new(v::alpha_dash))
            .extend("lowercase", RuleDefinition::new(v::lowercase))
            .extend("uppercase", RuleDefinition::new(v::uppercase))
            .extend("regex", RuleDefinition::new(v::regex).arity(Arity::Exactly(1)))
            .extend("not_regex", RuleDefinition::new(v::not_regex).arity(Arity::Exactly(1)))
            .extend("string", RuleDefinition::new(v::string))
            .extend("numeric", RuleDefinition::new(v::numeric))
            .extend("integer", RuleDefinition::new(v::integer))
            .extend("boolean", RuleDefinition::new(v::boolean))
            .extend("array", RuleDefinition::new(v::array))
            .extend("min", RuleDefinition::new(v::min).sized().placeholders(&["min"]))
            .extend("max", RuleDefinition::new(v::max).sized().placeholders(&["max"]))
            .extend(
                "between",
                RuleDefinition::new(v::between).sized().placeholders(&["min", "max"]),
            )
            .extend("size", RuleDefinition::new(v::size).sized().placeholders(&["size"]))
            .extend("in", RuleDefinition::new(v::in_list).list_placeholder("values"))
            .extend("not_in", RuleDefinition::new(v::not_in_list).list_placeholder("values"))
            .extend("same", RuleDefinition::new(v::same).placeholders(&["other"]))
            .extend("different", RuleDefinition::new(v::different).placeholders(&["other"]))
            .extend("confirmed", RuleDefinition::new(v::confirmed));
        registry
    }

    /// Register (or replace) a rule under `name`
    pub fn extend(&mut self, name: impl Into<String>, definition: RuleDefinition) -> &mut Self {
        self.rules.insert(name.into(), definition);
        self
    }

    /// Find a rule by name
    pub fn lookup(&self, name: &str) -> Result<&RuleDefinition, RuleError> {
        self.rules
            .get(name)
            .ok_or_else(|| RuleError::UnknownRule(name.to_string()))
    }

    /// Check if a rule is registered
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered rule names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formguard_i18n::Locale;
    use serde_json::json;

    #[test]
    fn test_lookup_unknown_rule() {
        let registry = RuleRegistry::with_defaults();
        assert!(registry.lookup("required").is_ok());
        assert_eq!(
            registry.lookup("requird").unwrap_err(),
            RuleError::UnknownRule("requird".to_string())
        );
    }

    #[test]
    fn test_markers_are_not_rules() {
        let registry = RuleRegistry::with_defaults();
        for marker in MARKERS {
            assert!(!registry.contains(marker));
        }
    }

    #[test]
    fn test_implicit_flags() {
        let registry = RuleRegistry::with_defaults();
        assert!(registry.lookup("required").unwrap().is_implicit());
        assert!(registry.lookup("required_with").unwrap().is_implicit());
        assert!(!registry.lookup("email").unwrap().is_implicit());
        assert!(registry.lookup("max").unwrap().is_sized());
    }

    #[test]
    fn test_arity_checked() {
        let registry = RuleRegistry::with_defaults();
        let max = registry.lookup("max").unwrap();
        assert!(max.check_arity("max", &["10".to_string()]).is_ok());
        assert!(matches!(
            max.check_arity("max", &[]),
            Err(RuleError::InvalidParameter { .. })
        ));

        let in_rule = registry.lookup("in").unwrap();
        assert!(in_rule.check_arity("in", &[]).is_err());
        assert!(in_rule
            .check_arity("in", &["a".to_string(), "b".to_string()])
            .is_ok());
    }

    #[test]
    fn test_replacements() {
        let registry = RuleRegistry::with_defaults();
        let params = vec!["2".to_string(), "4".to_string()];
        assert_eq!(
            registry.lookup("between").unwrap().replacements(&params),
            vec![
                ("min".to_string(), "2".to_string()),
                ("max".to_string(), "4".to_string())
            ]
        );
        assert_eq!(
            registry.lookup("in").unwrap().replacements(&params),
            vec![("values".to_string(), "2, 4".to_string())]
        );
    }

    #[test]
    fn test_extend_with_custom_rule() {
        let mut registry = RuleRegistry::with_defaults();
        registry.extend(
            "even",
            RuleDefinition::new(|ctx, _| {
                Ok(ctx.value().and_then(|v| v.as_i64()).is_some_and(|n| n % 2 == 0))
            }),
        );

        let locale = Locale::en();
        let value = json!(4);
        let ctx = EvaluationContext::new("count", Some(&value), &locale);
        assert!(registry.lookup("even").unwrap().check(&ctx, &[]).unwrap());
    }
}
