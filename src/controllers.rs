// Form controllers

use crate::app::App;
use crate::requests::LoginRequest;
use formguard_core::{Error, FormRequest, HttpRequest, HttpResponse, HttpStatus, request_locale};
use formguard_log::{debug, info};
use formguard_validation::{Document, ResultSet, RuleSet, ValidationError};

const FORM_VIEW: &str = include_str!("../resources/views/form.html");

/// Handlers for the `/form` routes
#[derive(Debug, Clone)]
pub struct FormController {
    app: App,
}

impl FormController {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// `POST /form/login`: both fields required. Rejections are answered
    /// with `400` and the error map.
    pub async fn login(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let input = request.input()?;
        let rules = RuleSet::new()
            .field("username", "required")
            .field("password", "required");
        let locale = request_locale(&request, self.app.evaluator());

        match self.app.evaluator().make(&input, &rules).locale(locale).validate() {
            Ok(_data) => Ok(HttpResponse::text(HttpStatus::Ok, "OK")),
            Err(ValidationError::Failed(results)) => {
                self.log_rejection(&request, &results);
                HttpResponse::bad_request().with_json(&results)
            }
            Err(ValidationError::Rule(error)) => Err(error.into()),
        }
    }

    /// `GET /form`
    pub async fn form(&self, _request: HttpRequest) -> Result<HttpResponse, Error> {
        Ok(HttpResponse::html(FORM_VIEW))
    }

    /// `POST /form`: validated through [`LoginRequest`], logs every submitted
    /// field with the password already hashed.
    pub async fn submit_form(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let form = LoginRequest::new(*self.app.hasher());
        let data = self
            .app
            .pipeline()
            .run(&form, &request)
            .inspect_err(|error| {
                if let Some(results) = error.result_set() {
                    self.log_rejection(&request, results);
                }
            })?;

        // All submitted input, with the validated (hashed) fields over it
        let mut submitted = form.prepare_for_validation(request.input()?).fields().clone();
        for (key, value) in data.fields() {
            submitted.insert(key.clone(), value.clone());
        }

        let pretty = serde_json::to_string_pretty(&Document::from(submitted))
            .map_err(|e| Error::Serialization(e.to_string()))?;
        info!(target: "formguard::form", "{}", pretty);

        Ok(HttpResponse::text(HttpStatus::Ok, "OK"))
    }

    fn log_rejection(&self, request: &HttpRequest, results: &ResultSet) {
        if self.app.settings().validation.log_rejections {
            debug!(
                target: "formguard::validation",
                fields: ["path" => request.path, "errors" => results],
                "Validation failed"
            );
        }
    }
}
