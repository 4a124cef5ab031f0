// HTTP request and response types

use crate::{Error, HttpStatus, form};
use formguard_validation::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP methods
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP request wrapper
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: Vec::new(),
            path_params: HashMap::new(),
            query_params: HashMap::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a header value, ignoring the case of the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Media type of the body without parameters
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
            .map(|value| value.split(';').next().unwrap_or(value).trim())
    }

    /// Check if the body is JSON
    pub fn is_json(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct == "application/json" || ct.ends_with("+json"))
    }

    /// Check if the client wants a JSON response
    pub fn expects_json(&self) -> bool {
        self.is_json()
            || self
                .header("Accept")
                .is_some_and(|accept| accept.contains("application/json"))
    }

    /// Page the request came from
    pub fn referer(&self) -> Option<&str> {
        self.header("Referer")
    }

    /// Raw `Accept-Language` header
    pub fn accept_language(&self) -> Option<&str> {
        self.header("Accept-Language")
    }

    /// Parse the request body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Submitted input as a validation document.
    ///
    /// JSON bodies must be objects. Any other body is decoded as
    /// `application/x-www-form-urlencoded` with bracket notation
    /// (`address[0][city]=Bogor`, `tags[]=a`). An empty body yields the
    /// query parameters.
    pub fn input(&self) -> Result<Document, Error> {
        if self.is_json() {
            if self.body.is_empty() {
                return Ok(Document::new());
            }
            let value: serde_json::Value = self.json()?;
            return Document::from_value(value).map_err(|e| Error::BadRequest(e.to_string()));
        }

        if self.body.is_empty() {
            let mut pairs: Vec<(&String, &String)> = self.query_params.iter().collect();
            pairs.sort();
            return Ok(form::document_from_pairs(
                pairs.into_iter().map(|(k, v)| (k.clone(), v.clone())),
            ));
        }

        form::parse_form_document(&self.body)
    }

    /// Get a path parameter by name
    pub fn param(&self, name: &str) -> Option<&String> {
        self.path_params.get(name)
    }

    /// Get a query parameter by name
    pub fn query(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }
}

/// HTTP response wrapper
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_status(status: HttpStatus) -> Self {
        Self::new(status.code())
    }

    pub fn ok() -> Self {
        Self::with_status(HttpStatus::Ok)
    }

    pub fn bad_request() -> Self {
        Self::with_status(HttpStatus::BadRequest)
    }

    pub fn not_found() -> Self {
        Self::with_status(HttpStatus::NotFound)
    }

    pub fn internal_server_error() -> Self {
        Self::with_status(HttpStatus::InternalServerError)
    }

    /// `302 Found` pointing at `location`
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::with_status(HttpStatus::Found).with_header("Location", location)
    }

    /// Plain text response
    pub fn text(status: HttpStatus, body: impl Into<String>) -> Self {
        Self::with_status(status)
            .with_body(body.into().into_bytes())
            .with_header("Content-Type", "text/plain; charset=utf-8")
    }

    /// HTML response
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .with_body(body.into().into_bytes())
            .with_header("Content-Type", "text/html; charset=utf-8")
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, Error> {
        self.body = serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Get a header value, ignoring the case of the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body as UTF-8 text
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }
}
