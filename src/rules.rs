// Application validation rules

use formguard_validation::{EvaluationContext, Fail, RuleError, ValidationRule};

/// Rejects a value equal to the submitted `username`.
///
/// Used on registration passwords. Needs the whole document, so it is
/// declared data-aware.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationRule;

impl ValidationRule for RegistrationRule {
    fn name(&self) -> &str {
        "registration"
    }

    fn data_aware(&self) -> bool {
        true
    }

    fn validate(&self, ctx: &EvaluationContext<'_>, fail: &mut Fail) -> Result<(), RuleError> {
        let username = ctx.data().and_then(|data| data.get("username"));
        if username.is_some() && username == ctx.value() {
            fail.fail(":attribute must be different with username");
        }
        Ok(())
    }
}

/// String values must be fully upper-cased
#[derive(Debug, Clone, Copy, Default)]
pub struct Uppercase;

impl ValidationRule for Uppercase {
    fn name(&self) -> &str {
        "uppercase"
    }

    fn validate(&self, ctx: &EvaluationContext<'_>, fail: &mut Fail) -> Result<(), RuleError> {
        if let Some(value) = ctx.as_str()
            && value.to_uppercase() != value
        {
            fail.fail("The :attribute must be UPPERCASE");
        }
        Ok(())
    }
}
