//! Integration tests for formguard-core

use formguard_core::*;
use formguard_validation::{Document, Evaluator, RuleSet};
use std::sync::Arc;

struct AddressRequest;

impl FormRequest for AddressRequest {
    fn rules(&self) -> RuleSet {
        RuleSet::new()
            .field("address.*.city", "required|max:100")
            .field("address.*.country", "required")
    }

    fn messages(&self) -> Vec<(String, String)> {
        vec![("required".to_string(), ":attribute wajib diisi".to_string())]
    }
}

fn router(pipeline: FormRequestPipeline) -> Router {
    let mut router = Router::new();
    router.post("/address", move |req| {
        let pipeline = pipeline.clone();
        async move {
            let validated: Document = pipeline.run(&AddressRequest, &req)?;
            HttpResponse::ok().with_json(&validated)
        }
    });
    router
}

fn form_post(body: &str) -> HttpRequest {
    HttpRequest::new(HttpMethod::POST, "/address")
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_body(body)
}

#[tokio::test]
async fn test_bracket_notation_reaches_wildcard_rules() {
    let router = router(FormRequestPipeline::new(Arc::new(Evaluator::default())));

    let response = router
        .handle(
            form_post("address[0][city]=Bogor&address[1][country]=Indonesia")
                .with_header("Referer", "/address/new"),
        )
        .await;

    assert_eq!(response.status, 302);
    assert_eq!(response.header("Location"), Some("/address/new"));

    let errors: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(errors["address.0.country"][0], "address.0.country wajib diisi");
    assert_eq!(errors["address.1.city"][0], "address.1.city wajib diisi");
    assert!(errors.get("address.0.city").is_none());
}

#[tokio::test]
async fn test_json_client_gets_unprocessable_entity() {
    let router = router(FormRequestPipeline::new(Arc::new(Evaluator::default())));

    let request = HttpRequest::new(HttpMethod::POST, "/address")
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"address": [{"city": "Bogor"}]}"#);
    let response = router.handle(request).await;

    assert_eq!(response.status, 422);
    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["message"], "address.0.country wajib diisi");
    assert_eq!(body["errors"]["address.0.country"][0], "address.0.country wajib diisi");
}

#[tokio::test]
async fn test_valid_submission_returns_validated_subset() {
    let router = router(FormRequestPipeline::new(Arc::new(Evaluator::default())));

    let response = router
        .handle(form_post(
            "address[0][city]=Bogor&address[0][country]=Indonesia&address[0][zip]=16111&token=x",
        ))
        .await;

    assert_eq!(response.status, 200);
    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"address": [{"city": "Bogor", "country": "Indonesia"}]})
    );
}

#[tokio::test]
async fn test_malformed_rule_set_is_server_error() {
    struct Broken;

    impl FormRequest for Broken {
        fn rules(&self) -> RuleSet {
            RuleSet::new().field("username", "required|emial")
        }
    }

    let pipeline = FormRequestPipeline::new(Arc::new(Evaluator::default()));
    let error = pipeline
        .run(&Broken, &form_post("username=eko"))
        .unwrap_err();
    assert!(error.is_server_error());
    assert_eq!(error.into_response().status, 500);
}
