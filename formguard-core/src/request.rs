//! Form requests
//!
//! A [`FormRequest`] bundles the rules, messages and hooks for one kind of
//! submission. [`FormRequestPipeline`] runs it against an incoming request:
//! authorize, prepare the input, validate, then transform the validated
//! data.

use crate::{Error, HttpRequest};
use formguard_i18n::{Locale, negotiate_locale, parse_accept_language};
use formguard_validation::{Document, Evaluator, RuleSet, ValidationError};
use std::sync::Arc;

/// Declarative description of a validated submission
pub trait FormRequest: Send + Sync {
    /// Rules applied to the prepared input
    fn rules(&self) -> RuleSet;

    /// Inline message overrides (`"password.min"`, `"required"`)
    fn messages(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Display names for attributes
    fn attributes(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Whether the request may proceed at all
    fn authorize(&self, _request: &HttpRequest) -> bool {
        true
    }

    /// Normalize raw input before any rule runs
    fn prepare_for_validation(&self, input: Document) -> Document {
        input
    }

    /// Transform the validated data. Runs after every rule, including
    /// cross-field rules, has seen the prepared input.
    fn passed_validation(&self, validated: Document) -> Result<Document, Error> {
        Ok(validated)
    }
}

/// Locale for messages rendered in response to `request`
pub fn request_locale(request: &HttpRequest, evaluator: &Evaluator) -> Locale {
    let requested = request
        .accept_language()
        .map(parse_accept_language)
        .unwrap_or_default();
    let available = evaluator.formatter().table().locales();
    negotiate_locale(&requested, &available, evaluator.locale()).clone()
}

/// Runs [`FormRequest`]s against incoming requests
#[derive(Debug, Clone)]
pub struct FormRequestPipeline {
    evaluator: Arc<Evaluator>,
}

impl FormRequestPipeline {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Validate `request` with `form` and return the transformed validated
    /// data.
    ///
    /// Rejected input becomes [`Error::Validation`], reported as `422` to
    /// JSON clients and as a redirect back otherwise.
    pub fn run<R: FormRequest + ?Sized>(
        &self,
        form: &R,
        request: &HttpRequest,
    ) -> Result<Document, Error> {
        if !form.authorize(request) {
            return Err(Error::Forbidden("This action is unauthorized.".to_string()));
        }

        let input = form.prepare_for_validation(request.input()?);
        let rules = form.rules();
        let locale = request_locale(request, &self.evaluator);

        let validated = self
            .evaluator
            .make(&input, &rules)
            .messages(form.messages())
            .attributes(form.attributes())
            .locale(locale)
            .validate()
            .map_err(|error| match error {
                ValidationError::Failed(results) => Error::validation_for(request, results),
                ValidationError::Rule(error) => Error::Rule(error),
            })?;

        form.passed_validation(validated)
    }
}
