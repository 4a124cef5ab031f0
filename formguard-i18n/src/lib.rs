//! Localization support for formguard
//!
//! Provides the pieces a host needs to hand localized message templates to
//! the validation engine:
//!
//! - **Locales**: BCP 47 parsing and language-only fallback
//! - **Accept-Language**: header parsing and negotiation
//! - **Message tables**: per-locale templates, immutable once built
//!
//! # Quick Start
//!
//! ```
//! use formguard_i18n::{Locale, MessageBundle, MessageTable};
//!
//! let table = MessageTable::builder()
//!     .bundle(&Locale::en(), MessageBundle::new().with("required", "The :attribute field is required."))
//!     .bundle(&Locale::id(), MessageBundle::new().with("required", ":attribute wajib diisi."))
//!     .default_locale(Locale::en())
//!     .build();
//!
//! assert_eq!(table.lookup("required", &Locale::id_id()), Some(":attribute wajib diisi."));
//! assert_eq!(table.lookup("required", &Locale::parse("fr").unwrap()), Some("The :attribute field is required."));
//! ```

mod error;
mod locale;
mod messages;

pub use error::I18nError;
pub use locale::{Locale, negotiate_locale, parse_accept_language};
pub use messages::{MessageBundle, MessageTable, MessageTableBuilder};

/// Result type for i18n operations
pub type Result<T> = std::result::Result<T, I18nError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        I18nError, Locale, MessageBundle, MessageTable, Result, negotiate_locale,
        parse_accept_language,
    };
}
