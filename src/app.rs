// Application wiring

use crate::controllers::FormController;
use crate::hashing::{HashingSettings, PasswordHasher};
use crate::lang;
use formguard_config::{ConfigError, ConfigManager, ValidationSettings};
use formguard_core::{FormRequestPipeline, Router};
use formguard_i18n::I18nError;
use formguard_log::info;
use formguard_validation::{Evaluator, RuleRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Config files read by [`AppSettings::load`], in merge order
pub const CONFIG_FILES: &[&str] = &["formguard.json", "formguard.toml"];

/// Errors raised while starting the application
#[derive(Debug, Error)]
pub enum BootError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load message tables: {0}")]
    Messages(#[from] I18nError),
}

/// Every settings section the application reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub validation: ValidationSettings,
    pub hashing: HashingSettings,
}

impl AppSettings {
    /// Read settings from the working directory: config files, then
    /// `.env`, then `FORMGUARD_*` variables.
    pub fn load() -> Result<Self, BootError> {
        let mut config = ConfigManager::new();
        for file in CONFIG_FILES {
            if Path::new(file).exists() {
                config.load_file(file)?;
            }
        }
        config.load_dotenv(".env")?;
        config.load_env();
        Self::from_config(&config)
    }

    /// Extract and check every section
    pub fn from_config(config: &ConfigManager) -> Result<Self, BootError> {
        Ok(Self {
            validation: config.load_validated("validation")?,
            hashing: config.load_validated("hashing")?,
        })
    }
}

/// Shared, immutable application state
#[derive(Debug, Clone)]
pub struct App {
    settings: Arc<AppSettings>,
    evaluator: Arc<Evaluator>,
    pipeline: FormRequestPipeline,
    hasher: PasswordHasher,
}

impl App {
    /// Build the message table and evaluator once for the process
    pub fn new(settings: AppSettings) -> Result<Self, BootError> {
        let table = lang::message_table(&settings.validation)?;
        let locales: Vec<String> = table.locales().iter().map(|l| l.tag()).collect();

        let evaluator = Arc::new(
            Evaluator::new(Arc::new(RuleRegistry::with_defaults()), Arc::new(table))
                .stop_on_first_failure(settings.validation.stop_on_first_failure),
        );

        info!(
            target: "formguard::app",
            fields: [
                "locales" => locales,
                "default_locale" => evaluator.locale().tag(),
                "stop_on_first_failure" => settings.validation.stop_on_first_failure
            ],
            "Application initialized"
        );

        Ok(Self {
            hasher: PasswordHasher::new(settings.hashing),
            pipeline: FormRequestPipeline::new(Arc::clone(&evaluator)),
            settings: Arc::new(settings),
            evaluator,
        })
    }

    /// Load settings from the environment and build the application
    pub fn from_env() -> Result<Self, BootError> {
        Self::new(AppSettings::load()?)
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn pipeline(&self) -> &FormRequestPipeline {
        &self.pipeline
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Routes:
    ///
    /// - `POST /form/login`
    /// - `GET /form`
    /// - `POST /form`
    pub fn router(&self) -> Router {
        let controller = Arc::new(FormController::new(self.clone()));
        let mut router = Router::new();

        let c = Arc::clone(&controller);
        router.post("/form/login", move |req| {
            let c = Arc::clone(&c);
            async move { c.login(req).await }
        });

        let c = Arc::clone(&controller);
        router.get("/form", move |req| {
            let c = Arc::clone(&c);
            async move { c.form(req).await }
        });

        let c = Arc::clone(&controller);
        router.post("/form", move |req| {
            let c = Arc::clone(&c);
            async move { c.submit_form(req).await }
        });

        router
    }
}
