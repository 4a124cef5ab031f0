// Error types for formguard hosts

use crate::{HttpRequest, HttpResponse, HttpStatus};
use formguard_validation::{ResultSet, RuleError, ValidationError};
use serde_json::json;
use thiserror::Error;

/// How a rejected submission is reported to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// `400` with the `{attribute: [message, ...]}` map as the body
    Errors,

    /// `422` with `{"message": ..., "errors": {...}}`
    Json,

    /// `302` back to the given location
    Redirect(String),
}

impl Rejection {
    /// Pick the reporting style for a form request: JSON clients get a
    /// `422`, browsers are sent back to the page they came from.
    pub fn for_request(request: &HttpRequest) -> Self {
        if request.expects_json() {
            Rejection::Json
        } else {
            Rejection::Redirect(request.referer().unwrap_or("/").to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("The given data was invalid")]
    Validation {
        results: ResultSet,
        rejection: Rejection,
    },

    #[error("Rule configuration error: {0}")]
    Rule(#[from] RuleError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// A failed manual validation, reported as `400`
    pub fn validation(results: ResultSet) -> Self {
        Error::Validation {
            results,
            rejection: Rejection::Errors,
        }
    }

    /// A failed form request, reported the way `request` expects
    pub fn validation_for(request: &HttpRequest, results: ResultSet) -> Self {
        Error::Validation {
            results,
            rejection: Rejection::for_request(request),
        }
    }

    /// Failures carried by a validation error
    pub fn result_set(&self) -> Option<&ResultSet> {
        match self {
            Error::Validation { results, .. } => Some(results),
            _ => None,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.http_status().code()
    }

    /// Get the HttpStatus enum for this error
    pub fn http_status(&self) -> HttpStatus {
        match self {
            Error::RouteNotFound(_) => HttpStatus::NotFound,
            Error::MethodNotAllowed(_) => HttpStatus::MethodNotAllowed,
            Error::Deserialization(_) => HttpStatus::BadRequest,
            Error::BadRequest(_) => HttpStatus::BadRequest,
            Error::Forbidden(_) => HttpStatus::Forbidden,
            Error::Validation { rejection, .. } => match rejection {
                Rejection::Errors => HttpStatus::BadRequest,
                Rejection::Json => HttpStatus::UnprocessableEntity,
                Rejection::Redirect(_) => HttpStatus::Found,
            },
            Error::Serialization(_) | Error::Rule(_) | Error::Internal(_) => {
                HttpStatus::InternalServerError
            }
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.http_status().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.http_status().is_server_error()
    }

    /// Render the error for the client. Server-side failures never expose
    /// their details.
    pub fn into_response(self) -> HttpResponse {
        let status = self.http_status();
        match self {
            Error::Validation { results, rejection } => match rejection {
                Rejection::Errors => json_response(status, results.to_json()),
                Rejection::Json => json_response(
                    status,
                    json!({
                        "message": summary(&results),
                        "errors": results.to_json(),
                    }),
                ),
                Rejection::Redirect(location) => {
                    json_response(status, results.to_json()).with_header("Location", location)
                }
            },
            error if error.is_server_error() => HttpResponse::text(status, status.reason()),
            error => HttpResponse::text(status, error.to_string()),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::Failed(results) => Error::validation(results),
            ValidationError::Rule(error) => Error::Rule(error),
        }
    }
}

fn json_response(status: HttpStatus, body: serde_json::Value) -> HttpResponse {
    HttpResponse::with_status(status)
        .with_body(body.to_string().into_bytes())
        .with_header("Content-Type", "application/json")
}

/// `"<first message> (and N more errors)"`
fn summary(results: &ResultSet) -> String {
    let first = results
        .iter()
        .next()
        .map(|failure| failure.message.clone())
        .unwrap_or_else(|| "The given data was invalid.".to_string());

    match results.len().saturating_sub(1) {
        0 => first,
        1 => format!("{} (and 1 more error)", first),
        more => format!("{} (and {} more errors)", first, more),
    }
}
