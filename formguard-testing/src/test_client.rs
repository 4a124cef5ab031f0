// Test HTTP Client

use formguard_core::{HttpMethod, HttpRequest, HttpResponse, Router};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Test HTTP client for making requests to the application
#[derive(Clone)]
pub struct TestClient {
    router: Arc<Router>,
    headers: HashMap<String, String>,
}

impl TestClient {
    /// Create a new test client
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            headers: HashMap::new(),
        }
    }

    /// Send `key: value` with every request
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::GET, path).build())
            .await
    }

    /// POST a browser form (`application/x-www-form-urlencoded`)
    pub async fn post_form<K, V>(&self, path: &str, fields: &[(K, V)]) -> TestResponse
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let request = TestRequestBuilder::new(HttpMethod::POST, path)
            .form(fields)
            .build();
        self.send(request).await
    }

    /// POST a JSON body
    pub async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> TestResponse {
        let request = TestRequestBuilder::new(HttpMethod::POST, path)
            .json(body)
            .build();
        self.send(request).await
    }

    /// Send a prepared request. Routing errors are rendered the way the
    /// host would render them.
    pub async fn send(&self, mut request: HttpRequest) -> TestResponse {
        for (key, value) in &self.headers {
            if request.header(key).is_none() {
                request.headers.insert(key.clone(), value.clone());
            }
        }
        TestResponse::new(self.router.handle(request).await)
    }
}

/// Builder for test requests
pub struct TestRequestBuilder {
    method: HttpMethod,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl TestRequestBuilder {
    /// Create a new request builder
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set the body
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Set a form-encoded body
    pub fn form<K: AsRef<str>, V: AsRef<str>>(mut self, fields: &[(K, V)]) -> Self {
        let pairs: Vec<(&str, &str)> = fields
            .iter()
            .map(|(key, value)| (key.as_ref(), value.as_ref()))
            .collect();
        self.body = serde_urlencoded::to_string(pairs)
            .unwrap_or_default()
            .into_bytes();
        self.header("Content-Type", "application/x-www-form-urlencoded")
    }

    /// Set JSON body
    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = serde_json::to_vec(data).unwrap_or_default();
        self.header("Content-Type", "application/json")
            .header("Accept", "application/json")
    }

    /// Build the request
    pub fn build(self) -> HttpRequest {
        let mut request = HttpRequest::new(self.method, self.path).with_body(self.body);
        request.headers = self.headers;
        request
    }
}

/// Response from a test request
#[derive(Debug, Clone)]
pub struct TestResponse {
    response: HttpResponse,
}

impl TestResponse {
    pub fn new(response: HttpResponse) -> Self {
        Self { response }
    }

    /// Get the status code
    pub fn status(&self) -> u16 {
        self.response.status
    }

    /// Get a header value
    pub fn header(&self, key: &str) -> Option<&str> {
        self.response.header(key)
    }

    /// Get the response body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.response.body).into_owned()
    }

    /// Get the response body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, String> {
        serde_json::from_slice(&self.response.body)
            .map_err(|e| format!("Serialization error: {}", e))
    }

    /// The underlying response
    pub fn into_inner(self) -> HttpResponse {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_form() {
        let req = TestRequestBuilder::new(HttpMethod::POST, "/form")
            .header("Referer", "/form")
            .form(&[("username", "admin@gmail.com"), ("password", "#rahasia123")])
            .build();

        assert_eq!(req.method, HttpMethod::POST);
        assert_eq!(req.referer(), Some("/form"));
        assert_eq!(
            String::from_utf8(req.body.clone()).unwrap(),
            "username=admin%40gmail.com&password=%23rahasia123"
        );
        assert_eq!(req.input().unwrap().get_str("password"), Some("#rahasia123"));
    }

    #[test]
    fn test_request_builder_json() {
        let req = TestRequestBuilder::new(HttpMethod::POST, "/form")
            .json(&serde_json::json!({"username": "eko"}))
            .build();

        assert!(req.is_json());
        assert!(req.expects_json());
        assert_eq!(req.input().unwrap().get_str("username"), Some("eko"));
    }
}
