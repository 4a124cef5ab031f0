// formguard - declarative form validation for Rust hosts
//
// This library wires the validation engine, message tables, configuration
// and an in-process HTTP surface into a small login-form application.

pub mod app;
pub mod controllers;
pub mod hashing;
pub mod lang;
pub mod requests;
pub mod rules;

// Re-export core functionality
pub use formguard_core::*;

// Re-export member crates
pub use formguard_config;
pub use formguard_i18n;
pub use formguard_log;
pub use formguard_validation;

pub use app::{App, AppSettings, BootError};

// Prelude for common imports
pub mod prelude {
    pub use crate::app::{App, AppSettings};
    pub use crate::{
        Error, FormRequest, FormRequestPipeline, HttpMethod, HttpRequest, HttpResponse,
        HttpStatus, Router,
    };
    pub use formguard_validation::{
        Document, EvaluationContext, Evaluator, Fail, ResultSet, RuleRegistry,
        RuleSet, RuleSpec, Validation, ValidationError, ValidationRule,
    };
}
