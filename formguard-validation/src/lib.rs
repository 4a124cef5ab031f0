//! Declarative validation for request documents
//!
//! Rules are declared per attribute pattern (`username`, `address.*.city`)
//! as pipe-delimited strings, arrays, closures or rule objects. An
//! [`Evaluator`] expands the patterns against a [`Document`], runs every
//! rule and renders the failures through a shared message table.
//!
//! # Examples
//!
//! ## Validating a login form
//!
//! ```
//! use formguard_validation::{Document, Evaluator, RuleSet};
//! use serde_json::json;
//!
//! let evaluator = Evaluator::default();
//! let rules = RuleSet::new()
//!     .field("username", "required|email|max:100")
//!     .field("password", "required|min:6|max:20");
//!
//! let document = Document::from_value(json!({
//!     "username": "admin@gmail.com",
//!     "password": "rahasia123"
//! })).unwrap();
//! assert!(evaluator.make(&document, &rules).passes().unwrap());
//!
//! let document = Document::from_value(json!({
//!     "username": "admin",
//!     "password": "rahasia"
//! })).unwrap();
//! let results = evaluator.make(&document, &rules).evaluate().unwrap();
//! assert!(results.has("username"));
//! assert!(!results.has("password"));
//! ```
//!
//! ## Nested attributes
//!
//! ```
//! use formguard_validation::{Document, Evaluator, RuleSet};
//! use serde_json::json;
//!
//! let document = Document::from_value(json!({
//!     "address": [{"street": "Jalan"}, {"street": "Jalan Lagi"}]
//! })).unwrap();
//! let rules = RuleSet::new().field("address.*.city", "required");
//!
//! let results = Evaluator::default().make(&document, &rules).evaluate().unwrap();
//! assert_eq!(results.len(), 2);
//! assert!(results.has("address.0.city"));
//! assert!(results.has("address.1.city"));
//! ```
//!
//! ## Closures
//!
//! ```
//! use formguard_validation::{Document, Evaluator, RuleSet, RuleSpec};
//! use serde_json::json;
//!
//! let rules = RuleSet::new().field(
//!     "username",
//!     RuleSpec::parse("required").closure(|_, value, fail| {
//!         if value.and_then(|v| v.as_str()) != Some("eko") {
//!             fail.fail("The :attribute must be eko");
//!         }
//!         Ok(())
//!     }),
//! );
//!
//! let document = Document::from_value(json!({"username": "budi"})).unwrap();
//! let results = Evaluator::default().make(&document, &rules).evaluate().unwrap();
//! assert_eq!(results.first("username"), Some("The username must be eko"));
//! ```

mod document;
mod errors;
mod evaluator;
mod formatter;
mod objects;
mod path;
mod registry;
mod rules;
mod traits;
pub mod validators;

pub use document::Document;
pub use errors::{Failure, ResultSet, RuleError, ValidationError};
pub use evaluator::{ErrorAppender, Evaluator, Validation};
pub use formatter::ErrorFormatter;
pub use objects::{In, Matches, Password};
pub use path::{PathPattern, PathResolver, ResolvedAttribute, Segment};
pub use registry::{Arity, MARKERS, RuleDefinition, RuleRegistry};
pub use rules::{ClosureRule, Rule, RuleSet, RuleSpec};
pub use traits::{EvaluationContext, Fail, ValidationRule};

pub use formguard_i18n::{Locale, MessageBundle, MessageTable};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        Document, EvaluationContext, Evaluator, Fail, Failure, In, Password, ResultSet, Rule,
        RuleError, RuleRegistry, RuleSet, RuleSpec, ValidationError, ValidationRule,
    };
}
