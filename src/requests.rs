// Form requests

use crate::hashing::PasswordHasher;
use formguard_core::{Error, FormRequest};
use formguard_validation::{Document, Password, RuleSet, RuleSpec};

/// Login form submitted to `POST /form`.
///
/// The username is lower-cased before validation and the password is
/// replaced by its bcrypt hash once every rule has passed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginRequest {
    hasher: PasswordHasher,
}

impl LoginRequest {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self { hasher }
    }
}

impl FormRequest for LoginRequest {
    fn rules(&self) -> RuleSet {
        RuleSet::new()
            .field("username", "required|email|max:100")
            .field(
                "password",
                RuleSpec::parse("required").object(Password::min(6).letters().numbers().symbols()),
            )
    }

    fn prepare_for_validation(&self, input: Document) -> Document {
        match input.get_str("username") {
            Some(username) => input.with("username", username.to_lowercase()),
            None => input,
        }
    }

    fn passed_validation(&self, validated: Document) -> Result<Document, Error> {
        let Some(password) = validated.get_str("password") else {
            return Ok(validated);
        };
        let hashed = self.hasher.hash(password)?;
        Ok(validated.with("password", hashed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashingSettings;
    use formguard_validation::Evaluator;
    use serde_json::json;

    fn request() -> LoginRequest {
        LoginRequest::new(PasswordHasher::new(HashingSettings { bcrypt_cost: 4 }))
    }

    fn document(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_prepare_lowercases_username() {
        let prepared = request().prepare_for_validation(document(json!({
            "username": "Admin@Gmail.COM",
            "password": "x"
        })));
        assert_eq!(prepared.get_str("username"), Some("admin@gmail.com"));
        assert_eq!(prepared.get_str("password"), Some("x"));

        let untouched = request().prepare_for_validation(document(json!({"password": "x"})));
        assert!(!untouched.contains("username"));
    }

    #[test]
    fn test_password_complexity() {
        let login = request();
        let rules = login.rules();
        let evaluator = Evaluator::default();

        let weak = document(json!({"username": "admin@gmail.com", "password": "rahasia"}));
        let results = evaluator.make(&weak, &rules).evaluate().unwrap();
        let failed: Vec<&str> = results.get("password").iter().map(|f| f.rule.as_str()).collect();
        assert_eq!(failed, vec!["password.numbers", "password.symbols"]);

        let strong = document(json!({"username": "admin@gmail.com", "password": "#rahasia123"}));
        assert!(evaluator.make(&strong, &rules).passes().unwrap());
    }

    #[test]
    fn test_passed_validation_hashes_password() {
        let login = request();
        let validated = login
            .passed_validation(document(json!({
                "username": "admin@gmail.com",
                "password": "#rahasia123"
            })))
            .unwrap();

        let hash = validated.get_str("password").unwrap();
        assert!(hash.starts_with("$2"));
        assert!(login.hasher.verify("#rahasia123", hash).unwrap());
        assert_eq!(validated.get_str("username"), Some("admin@gmail.com"));
    }
}
