//! Display locale
//!
//! Two locales are supported. Everything derived from the locale (copy,
//! text direction) is a pure lookup; nothing sent to the provider depends
//! on it.

pub mod preferences;
mod store;
pub mod translations;

pub use preferences::{FilePreferences, MemoryPreferences, PreferenceError, PreferenceStore};
pub use store::{ListenerId, LocaleStore, LOCALE_KEY};
pub use translations::{suggested_questions, text, TranslationKey};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English, the primary locale
    #[default]
    En,
    /// Arabic, the secondary locale
    Ar,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ar];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }

    /// Parse a stored or broadcast value. Anything other than the two
    /// codes is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en" => Some(Locale::En),
            "ar" => Some(Locale::Ar),
            _ => None,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Locale::En => Direction::Ltr,
            Locale::Ar => Direction::Rtl,
        }
    }

    /// Native name, as shown in the language picker
    pub fn native_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Ar => "العربية",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Text direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}
