//! Testing utilities for formguard applications.
//!
//! A [`TestClient`] dispatches requests to a [`Router`](formguard_core::Router)
//! in-process, so feature tests exercise routing, input decoding,
//! validation and error rendering without opening a socket.
//!
//! ## Quick Start
//!
//! ```
//! use formguard_core::{HttpResponse, HttpStatus, Router};
//! use formguard_testing::TestClient;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let mut router = Router::new();
//! router.post("/form/login", |req| async move {
//!     let input = req.input()?;
//!     match input.get_str("username") {
//!         Some(name) if !name.is_empty() => Ok(HttpResponse::text(HttpStatus::Ok, "OK")),
//!         _ => Ok(HttpResponse::text(HttpStatus::BadRequest, "missing username")),
//!     }
//! });
//!
//! let client = TestClient::new(Arc::new(router));
//! client
//!     .post_form("/form/login", &[("username", "eko")])
//!     .await
//!     .assert_ok();
//! client
//!     .post_form("/form/login", &[("username", "")])
//!     .await
//!     .assert_status(400)
//!     .assert_see("missing");
//! # });
//! ```

mod assertions;
mod test_client;

pub use test_client::{TestClient, TestRequestBuilder, TestResponse};

// Re-export common testing utilities
pub use tokio::test as tokio_test;
