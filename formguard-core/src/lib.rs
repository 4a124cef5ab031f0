//! Host plumbing for formguard applications.
//!
//! Request and response types, an in-process [`Router`], bracket-notation
//! form decoding and the [`FormRequest`] pipeline that ties submissions to
//! the validation engine.
//!
//! ## Quick Start
//!
//! ```
//! use formguard_core::*;
//!
//! # tokio_test::block_on(async {
//! let mut router = Router::new();
//! router.post("/form/login", |req| async move {
//!     let input = req.input()?;
//!     let greeting = format!("Hello, {}", input.get_str("username").unwrap_or("guest"));
//!     Ok(HttpResponse::text(HttpStatus::Ok, greeting))
//! });
//!
//! let request = HttpRequest::new(HttpMethod::POST, "/form/login")
//!     .with_header("Content-Type", "application/x-www-form-urlencoded")
//!     .with_body("username=eko");
//! let response = router.handle(request).await;
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body_string().as_deref(), Some("Hello, eko"));
//! # });
//! ```

pub mod error;
pub mod form;
pub mod http;
pub mod request;
pub mod routing;
pub mod status;

pub use error::{Error, Rejection};
pub use form::{document_from_pairs, parse_form_document, parse_form_pairs};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::{FormRequest, FormRequestPipeline, request_locale};
pub use routing::{HandlerFn, Route, Router};
pub use status::HttpStatus;
