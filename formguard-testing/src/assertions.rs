// Test assertions for HTTP responses

use crate::TestResponse;
use formguard_core::HttpStatus;
use serde_json::Value;

impl TestResponse {
    /// Assert that the response has a specific status code
    pub fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status(),
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status(),
            self.text()
        );
        self
    }

    /// Assert a `200 OK` response
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(HttpStatus::Ok.code())
    }

    /// Assert a `302` redirect to `location`
    pub fn assert_redirect(&self, location: &str) -> &Self {
        self.assert_status(HttpStatus::Found.code());
        self.assert_header("Location", location)
    }

    /// Assert that the response has a specific header
    pub fn assert_header(&self, key: &str, expected: &str) -> &Self {
        let actual = self.header(key);
        assert_eq!(
            actual,
            Some(expected),
            "Expected header '{}' to be '{}', got {:?}",
            key,
            expected,
            actual
        );
        self
    }

    /// Assert that the body contains a string
    pub fn assert_see(&self, expected: &str) -> &Self {
        let body = self.text();
        assert!(
            body.contains(expected),
            "Expected body to contain '{}', but it didn't. Body: {}",
            expected,
            body
        );
        self
    }

    /// Assert that the JSON body has a top-level key
    pub fn assert_json_has(&self, key: &str) -> &Self {
        let body = self.json_body();
        assert!(
            body.get(key).is_some(),
            "Expected JSON body to have key '{}'. Body: {}",
            key,
            body
        );
        self
    }

    /// Assert that the JSON body lacks a top-level key
    pub fn assert_json_missing(&self, key: &str) -> &Self {
        let body = self.json_body();
        assert!(
            body.get(key).is_none(),
            "Expected JSON body not to have key '{}'. Body: {}",
            key,
            body
        );
        self
    }

    /// Assert the first message reported for a failed attribute
    pub fn assert_error_message(&self, attribute: &str, expected: &str) -> &Self {
        let body = self.json_body();
        let errors = body.get("errors").unwrap_or(&body);
        assert_eq!(
            errors[attribute][0].as_str(),
            Some(expected),
            "Unexpected message for '{}'. Body: {}",
            attribute,
            body
        );
        self
    }

    fn json_body(&self) -> Value {
        match self.json::<Value>() {
            Ok(value) => value,
            Err(e) => panic!("Expected a JSON body ({}). Body: {}", e, self.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formguard_core::HttpResponse;

    #[test]
    fn test_json_assertions() {
        let response = TestResponse::new(
            HttpResponse::bad_request()
                .with_json(&serde_json::json!({"password": ["The password field is required."]}))
                .unwrap(),
        );

        response
            .assert_status(400)
            .assert_json_has("password")
            .assert_json_missing("username")
            .assert_error_message("password", "The password field is required.");
    }

    #[test]
    fn test_redirect_assertion() {
        let response = TestResponse::new(HttpResponse::redirect("/form"));
        response.assert_redirect("/form");
    }

    #[test]
    #[should_panic(expected = "Expected status 200, got 400")]
    fn test_status_mismatch_panics() {
        TestResponse::new(HttpResponse::bad_request()).assert_ok();
    }
}
