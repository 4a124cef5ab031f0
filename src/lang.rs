// Bundled message tables

use formguard_config::ValidationSettings;
use formguard_i18n::{I18nError, Locale, MessageTable};

const EN: &str = include_str!("../resources/lang/en.json");
const ID: &str = include_str!("../resources/lang/id.json");

/// Build the shared message table: the bundled `en` and `id` tables, then
/// any `<locale>.json` files in the configured `lang_dir`, which override
/// bundled entries key by key.
pub fn message_table(settings: &ValidationSettings) -> Result<MessageTable, I18nError> {
    let default_locale = Locale::parse(&settings.default_locale)?;
    let fallback_locale = Locale::parse(&settings.fallback_locale)?;

    let mut builder = MessageTable::builder()
        .json(&Locale::en(), EN)?
        .json(&Locale::id(), ID)?;

    if let Some(dir) = &settings.lang_dir {
        builder = builder.load_dir(dir)?;
    }

    Ok(builder
        .default_locale(default_locale)
        .fallback(fallback_locale)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_bundled_tables() {
        let table = message_table(&ValidationSettings::default()).unwrap();

        assert_eq!(table.locales(), vec![Locale::en(), Locale::id()]);
        assert_eq!(
            table.lookup("required", &Locale::id()),
            Some(":attribute wajib diisi.")
        );
        assert_eq!(
            table.lookup("max.string", &Locale::en()),
            Some("The :attribute field must not be greater than :max characters.")
        );
        assert_eq!(
            table.lookup("attributes.password", &Locale::id()),
            Some("kata sandi")
        );
    }

    #[test]
    fn test_missing_template_falls_back_to_default_locale() {
        let table = message_table(&ValidationSettings::default()).unwrap();
        assert_eq!(
            table.lookup("password.symbols", &Locale::parse("fr").unwrap()),
            Some("The :attribute field must contain at least one symbol.")
        );
    }

    #[test]
    fn test_lang_dir_overrides_and_adds_locales() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(
            dir.path().join("id.json"),
            r#"{"required": ":attribute harus diisi"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("fr.json"),
            r#"{"required": "Le champ :attribute est obligatoire."}"#,
        )
        .unwrap();

        let settings = ValidationSettings {
            lang_dir: Some(dir.path().to_path_buf()),
            ..ValidationSettings::default()
        };
        let table = message_table(&settings).unwrap();

        assert_eq!(table.lookup("required", &Locale::id()), Some(":attribute harus diisi"));
        assert_eq!(table.lookup("email", &Locale::id()), Some(":attribute harus berupa alamat surel yang valid."));
        assert!(table.locales().contains(&Locale::parse("fr").unwrap()));
    }

    #[test]
    fn test_invalid_default_locale() {
        let settings = ValidationSettings {
            default_locale: "!!".to_string(),
            ..ValidationSettings::default()
        };
        assert!(matches!(message_table(&settings), Err(I18nError::InvalidLocale(_))));
    }
}
