//! Integration tests for formguard-config

use formguard_config::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("formguard.toml");
    fs::write(
        &path,
        r#"
        [validation]
        default_locale = "id"
        stop_on_first_failure = true
        "#,
    )
    .unwrap();

    let mut config = ConfigManager::new();
    config.load_file(&path).unwrap();

    let settings: ValidationSettings = config.section("validation").unwrap();
    assert_eq!(settings.default_locale, "id");
    assert!(settings.stop_on_first_failure);
    assert!(settings.log_rejections);
}

#[test]
fn test_dotenv_overrides_file() {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("formguard.json");
    fs::write(&json, r#"{"validation": {"default_locale": "id", "fallback_locale": "id"}}"#).unwrap();

    let dotenv = dir.path().join(".env");
    fs::write(
        &dotenv,
        "FORMGUARD_VALIDATION__DEFAULT_LOCALE=en\nUNRELATED=1\n",
    )
    .unwrap();

    let mut config = ConfigManager::new();
    config.load_file(&json).unwrap();
    config.load_dotenv(&dotenv).unwrap();

    assert_eq!(config.get::<String>("validation.default_locale").unwrap(), "en");
    assert_eq!(config.get::<String>("validation.fallback_locale").unwrap(), "id");
    assert!(!config.has("unrelated"));
}

#[test]
fn test_missing_dotenv_is_ignored() {
    let dir = TempDir::new().unwrap();
    let mut config = ConfigManager::new();
    assert!(config.load_dotenv(dir.path().join(".env")).is_ok());
}

#[test]
fn test_unsupported_file_format() {
    let mut config = ConfigManager::new();
    assert!(matches!(
        config.load_file("settings.yaml"),
        Err(ConfigError::LoadError(_))
    ));
}

#[test]
fn test_load_validated_checks_lang_dir() {
    let dir = TempDir::new().unwrap();
    let mut config = ConfigManager::new();
    config
        .set_default("validation.lang_dir", dir.path().join("lang"))
        .unwrap();

    assert!(config
        .load_validated::<ValidationSettings>("validation")
        .is_err());

    fs::create_dir(dir.path().join("lang")).unwrap();
    let settings: ValidationSettings = config.load_validated("validation").unwrap();
    assert_eq!(settings.lang_dir, Some(dir.path().join("lang")));
}

#[test]
fn test_mistyped_value_is_invalid() {
    let mut config = ConfigManager::new();
    config
        .merge_str("[validation]\nstop_on_first_failure = \"sometimes\"", FileFormat::Toml)
        .unwrap();

    assert!(matches!(
        config.section::<ValidationSettings>("validation"),
        Err(ConfigError::InvalidValue { .. })
    ));
}
