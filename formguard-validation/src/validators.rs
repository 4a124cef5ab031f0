// Built-in rule checks

use crate::{EvaluationContext, RuleError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHA_NUM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static ALPHA_DASH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

/// Signature shared by every built-in check
pub type CheckResult = Result<bool, RuleError>;

// Presence

/// Non-null, and not an empty (after trimming) string, sequence or document
pub fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

pub fn required(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(is_filled(ctx.value()))
}

pub fn present(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(ctx.exists())
}

pub fn filled(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(!ctx.exists() || is_filled(ctx.value()))
}

pub fn required_with(ctx: &EvaluationContext<'_>, params: &[String]) -> CheckResult {
    let triggered = ctx
        .data()
        .is_some_and(|data| params.iter().any(|other| is_filled(data.get(other))));
    Ok(!triggered || is_filled(ctx.value()))
}

pub fn accepted(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(match ctx.value() {
        Some(Value::String(s)) => matches!(s.as_str(), "yes" | "on" | "1" | "true"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::Bool(b)) => *b,
        _ => false,
    })
}

// Formats

pub fn email(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(ctx.as_str().is_some_and(|s| EMAIL_REGEX.is_match(s)))
}

pub fn url(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(ctx.as_str().is_some_and(|s| URL_REGEX.is_match(s)))
}

pub fn uuid(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(ctx.as_str().is_some_and(|s| UUID_REGEX.is_match(s)))
}

pub fn alpha(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(ctx.as_str().is_some_and(|s| ALPHA_REGEX.is_match(s)))
}

pub fn alpha_num(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(ctx.as_str().is_some_and(|s| ALPHA_NUM_REGEX.is_match(s)))
}

pub fn alpha_dash(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(ctx.as_str().is_some_and(|s| ALPHA_DASH_REGEX.is_match(s)))
}

pub fn lowercase(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(ctx.as_str().is_some_and(|s| s.to_lowercase() == s))
}

pub fn uppercase(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(ctx.as_str().is_some_and(|s| s.to_uppercase() == s))
}

fn compile(rule: &str, pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|e| RuleError::invalid_parameter(rule, e.to_string()))
}

pub fn regex(ctx: &EvaluationContext<'_>, params: &[String]) -> CheckResult {
    let pattern = compile("regex", &params[0])?;
    Ok(ctx.as_str().is_some_and(|s| pattern.is_match(s)))
}

pub fn not_regex(ctx: &EvaluationContext<'_>, params: &[String]) -> CheckResult {
    let pattern = compile("not_regex", &params[0])?;
    Ok(ctx.as_str().is_some_and(|s| !pattern.is_match(s)))
}

// Types

pub fn string(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(matches!(ctx.value(), Some(Value::String(_))))
}

fn parse_numeric(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn numeric(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(match ctx.value() {
        Some(Value::Number(_)) => true,
        Some(Value::String(s)) => parse_numeric(s).is_some(),
        _ => false,
    })
}

pub fn integer(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(match ctx.value() {
        Some(Value::Number(n)) => n.is_i64() || n.is_u64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    })
}

pub fn boolean(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(match ctx.value() {
        Some(Value::Bool(_)) => true,
        Some(Value::Number(n)) => matches!(n.as_i64(), Some(0 | 1)),
        Some(Value::String(s)) => matches!(s.as_str(), "0" | "1" | "true" | "false"),
        _ => false,
    })
}

pub fn array(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    Ok(matches!(ctx.value(), Some(Value::Array(_) | Value::Object(_))))
}

// Sizes

/// How a value is measured by size rules, which also selects the message
/// variant (`max.string`, `max.numeric`, `max.array`).
pub fn measure(ctx: &EvaluationContext<'_>) -> Option<(f64, &'static str)> {
    match ctx.value()? {
        Value::String(s) => match parse_numeric(s) {
            Some(n) if ctx.is_numeric() => Some((n, "numeric")),
            _ => Some((s.chars().count() as f64, "string")),
        },
        Value::Number(n) => n.as_f64().map(|n| (n, "numeric")),
        Value::Array(items) => Some((items.len() as f64, "array")),
        Value::Object(map) => Some((map.len() as f64, "array")),
        Value::Null => Some((0.0, "string")),
        Value::Bool(_) => None,
    }
}

fn number_param(rule: &str, raw: &str) -> Result<f64, RuleError> {
    parse_numeric(raw)
        .ok_or_else(|| RuleError::invalid_parameter(rule, format!("'{}' is not a number", raw)))
}

pub fn min(ctx: &EvaluationContext<'_>, params: &[String]) -> CheckResult {
    let bound = number_param("min", &params[0])?;
    Ok(measure(ctx).is_some_and(|(size, _)| size >= bound))
}

pub fn max(ctx: &EvaluationContext<'_>, params: &[String]) -> CheckResult {
    let bound = number_param("max", &params[0])?;
    Ok(measure(ctx).is_some_and(|(size, _)| size <= bound))
}

pub fn between(ctx: &EvaluationContext<'_>, params: &[String]) -> CheckResult {
    let low = number_param("between", &params[0])?;
    let high = number_param("between", &params[1])?;
    Ok(measure(ctx).is_some_and(|(size, _)| size >= low && size <= high))
}

pub fn size(ctx: &EvaluationContext<'_>, params: &[String]) -> CheckResult {
    let expected = number_param("size", &params[0])?;
    Ok(measure(ctx).is_some_and(|(size, _)| size == expected))
}

// Membership

/// String form used for literal comparisons
pub fn literal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn all_listed(value: Option<&Value>, params: &[String]) -> bool {
    let listed = |v: &Value| literal(v).is_some_and(|s| params.contains(&s));
    match value {
        Some(Value::Array(items)) => items.iter().all(listed),
        Some(v) => listed(v),
        None => false,
    }
}

pub fn in_list(ctx: &EvaluationContext<'_>, params: &[String]) -> CheckResult {
    Ok(all_listed(ctx.value(), params))
}

pub fn not_in_list(ctx: &EvaluationContext<'_>, params: &[String]) -> CheckResult {
    let listed = |v: &Value| literal(v).is_some_and(|s| params.contains(&s));
    Ok(match ctx.value() {
        Some(Value::Array(items)) => !items.iter().any(listed),
        Some(v) => !listed(v),
        None => true,
    })
}

// Cross-field

pub fn same(ctx: &EvaluationContext<'_>, params: &[String]) -> CheckResult {
    let other = ctx.data().and_then(|data| data.get(&params[0]));
    Ok(other.is_some() && other == ctx.value())
}

pub fn different(ctx: &EvaluationContext<'_>, params: &[String]) -> CheckResult {
    let other = ctx.data().and_then(|data| data.get(&params[0]));
    Ok(other.is_some() && other != ctx.value())
}

pub fn confirmed(ctx: &EvaluationContext<'_>, _: &[String]) -> CheckResult {
    let key = format!("{}_confirmation", ctx.attribute());
    let confirmation = ctx.data().and_then(|data| data.get(&key));
    Ok(confirmation.is_some() && confirmation == ctx.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;
    use formguard_i18n::Locale;
    use serde_json::json;

    fn check(
        f: fn(&EvaluationContext<'_>, &[String]) -> CheckResult,
        value: Option<Value>,
        params: &[&str],
    ) -> bool {
        let locale = Locale::en();
        let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        let ctx = EvaluationContext::new("field", value.as_ref(), &locale);
        f(&ctx, &params).unwrap()
    }

    #[test]
    fn test_required() {
        assert!(!check(required, None, &[]));
        assert!(!check(required, Some(Value::Null), &[]));
        assert!(!check(required, Some(json!("")), &[]));
        assert!(!check(required, Some(json!("   ")), &[]));
        assert!(!check(required, Some(json!([])), &[]));
        assert!(check(required, Some(json!("0")), &[]));
        assert!(check(required, Some(json!(0)), &[]));
        assert!(check(required, Some(json!(false)), &[]));
    }

    #[test]
    fn test_email() {
        assert!(check(email, Some(json!("admin@gmail.com")), &[]));
        assert!(check(email, Some(json!("user+tag@example.co.uk")), &[]));
        assert!(!check(email, Some(json!("admin")), &[]));
        assert!(!check(email, Some(json!("admin@localhost")), &[]));
        assert!(!check(email, Some(json!("@example.com")), &[]));
        assert!(!check(email, Some(json!(42)), &[]));
    }

    #[test]
    fn test_size_rules_by_type() {
        assert!(check(max, Some(json!("rahasia")), &["20"]));
        assert!(!check(min, Some(json!("test")), &["6"]));
        assert!(check(min, Some(json!("rahasia")), &["6"]));
        assert!(check(max, Some(json!(100)), &["100"]));
        assert!(!check(max, Some(json!(101)), &["100"]));
        assert!(!check(max, Some(json!([1, 2, 3])), &["2"]));
        assert!(check(between, Some(json!("abcd")), &["2", "4"]));
        assert!(check(size, Some(json!([1, 2])), &["2"]));
    }

    #[test]
    fn test_numeric_strings_measured_as_text_without_hint() {
        // "150" is three characters long unless the attribute is numeric
        assert!(check(max, Some(json!("150")), &["100"]));

        let locale = Locale::en();
        let value = json!("150");
        let mut ctx = EvaluationContext::new("field", Some(&value), &locale);
        ctx.numeric = true;
        assert!(!max(&ctx, &["100".to_string()]).unwrap());
    }

    #[test]
    fn test_bad_numeric_parameter_is_config_error() {
        let locale = Locale::en();
        let value = json!("abc");
        let ctx = EvaluationContext::new("field", Some(&value), &locale);
        assert!(matches!(
            max(&ctx, &["lots".to_string()]),
            Err(RuleError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_in_is_case_sensitive() {
        let list = ["Miftah", "Fadilah", "71"];
        assert!(check(in_list, Some(json!("Miftah")), &list));
        assert!(!check(in_list, Some(json!("miftah")), &list));
        assert!(check(in_list, Some(json!(71)), &list));
        assert!(check(in_list, Some(json!(["Miftah", "71"])), &list));
        assert!(!check(not_in_list, Some(json!("Miftah")), &list));
    }

    #[test]
    fn test_type_rules() {
        assert!(check(numeric, Some(json!("12.5")), &[]));
        assert!(!check(numeric, Some(json!("twelve")), &[]));
        assert!(check(integer, Some(json!("12")), &[]));
        assert!(!check(integer, Some(json!(12.5)), &[]));
        assert!(check(boolean, Some(json!("0")), &[]));
        assert!(!check(boolean, Some(json!("yes")), &[]));
        assert!(check(accepted, Some(json!("yes")), &[]));
        assert!(check(alpha_dash, Some(json!("user_name-1")), &[]));
        assert!(!check(alpha, Some(json!("abc123")), &[]));
        assert!(check(uppercase, Some(json!("EKO@PZN.COM")), &[]));
        assert!(!check(uppercase, Some(json!("eko@pzn.com")), &[]));
        assert!(check(uuid, Some(json!("550E8400-E29B-41D4-A716-446655440000")), &[]));
        assert!(check(url, Some(json!("https://example.com/path")), &[]));
    }

    #[test]
    fn test_cross_field_rules() {
        let data = Document::from_value(json!({
            "username": "eko",
            "password": "eko",
            "password_confirmation": "eko"
        }))
        .unwrap();
        let locale = Locale::en();
        let value = json!("eko");
        let ctx = EvaluationContext::new("password", Some(&value), &locale).with_data(&data);

        assert!(same(&ctx, &["username".to_string()]).unwrap());
        assert!(!different(&ctx, &["username".to_string()]).unwrap());
        assert!(!different(&ctx, &["missing".to_string()]).unwrap());
        assert!(confirmed(&ctx, &[]).unwrap());
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let locale = Locale::en();
        let value = json!("abc");
        let ctx = EvaluationContext::new("field", Some(&value), &locale);
        assert!(regex(&ctx, &["^[a-z]+$".to_string()]).unwrap());
        assert!(regex(&ctx, &["([".to_string()]).is_err());
    }
}
