//! `POST /form/login`: plain validation answered with `400` and the error map.

use formguard::hashing::HashingSettings;
use formguard::{App, AppSettings};
use formguard_testing::TestClient;
use serde_json::{Value, json};
use std::sync::Arc;

fn client() -> TestClient {
    let settings = AppSettings {
        hashing: HashingSettings { bcrypt_cost: 4 },
        ..AppSettings::default()
    };
    TestClient::new(Arc::new(App::new(settings).unwrap().router()))
}

#[tokio::test]
async fn test_login_success() {
    client()
        .post_form("/form/login", &[("username", "miftah"), ("password", "miftah")])
        .await
        .assert_ok()
        .assert_see("OK");
}

#[tokio::test]
async fn test_login_failed() {
    let response = client()
        .post_form("/form/login", &[("username", "Miftah"), ("password", "")])
        .await;

    response
        .assert_status(400)
        .assert_header("Content-Type", "application/json")
        .assert_json_missing("username")
        .assert_error_message("password", "The password field is required.");

    let body: Value = response.json().unwrap();
    assert_eq!(body, json!({"password": ["The password field is required."]}));
}

#[tokio::test]
async fn test_login_missing_fields() {
    let response = client().post_form::<&str, &str>("/form/login", &[]).await;

    let body: Value = response.assert_status(400).json().unwrap();
    assert_eq!(
        body,
        json!({
            "username": ["The username field is required."],
            "password": ["The password field is required."]
        })
    );
}

#[tokio::test]
async fn test_login_json_body() {
    client()
        .post_json("/form/login", &json!({"username": "miftah", "password": "miftah"}))
        .await
        .assert_ok();

    client()
        .post_json("/form/login", &json!({"username": "miftah", "password": null}))
        .await
        .assert_status(400)
        .assert_error_message("password", "The password field is required.");
}

#[tokio::test]
async fn test_login_query_string() {
    client()
        .send(
            formguard_testing::TestRequestBuilder::new(
                formguard::HttpMethod::POST,
                "/form/login?username=miftah&password=miftah",
            )
            .build(),
        )
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_login_localized_messages() {
    client()
        .with_header("Accept-Language", "id-ID,id;q=0.9,en;q=0.8")
        .post_form("/form/login", &[("username", ""), ("password", "")])
        .await
        .assert_status(400)
        .assert_error_message("username", "nama pengguna wajib diisi.")
        .assert_error_message("password", "kata sandi wajib diisi.");
}

#[tokio::test]
async fn test_login_unknown_language_uses_default() {
    client()
        .with_header("Accept-Language", "fr-FR")
        .post_form("/form/login", &[("username", "miftah"), ("password", "")])
        .await
        .assert_status(400)
        .assert_error_message("password", "The password field is required.");
}

#[tokio::test]
async fn test_login_rejects_non_object_json() {
    client()
        .post_json("/form/login", &json!(["miftah", "miftah"]))
        .await
        .assert_status(400);
}
