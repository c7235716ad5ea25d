//! Localized string tables
//!
//! Tables are compiled into the binary from `locales/*.yml`. Lookups fall back
//! from the selected language to English, and from English to the key itself,
//! so a missing translation never hides text from the user.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

/// English table
const EN: &str = include_str!("../locales/en.yml");

/// Korean table
const KO: &str = include_str!("../locales/ko.yml");

/// Languages with an embedded string table
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "ko"];

/// Default language
pub const DEFAULT_LANGUAGE: &str = "en";

/// Errors from loading string tables
#[derive(Debug, Error)]
pub enum I18nError {
    #[error("Unsupported language: {0} (available: {available})", available = SUPPORTED_LANGUAGES.join(", "))]
    UnsupportedLanguage(String),

    #[error("Failed to parse {lang} string table: {source}")]
    Parse {
        lang: String,
        #[source]
        source: serde_yaml::Error,
    },
}

fn embedded(lang: &str) -> Option<&'static str> {
    match lang {
        "en" => Some(EN),
        "ko" => Some(KO),
        _ => None,
    }
}

fn parse_table(lang: &str) -> Result<HashMap<String, String>, I18nError> {
    let raw = embedded(lang).ok_or_else(|| I18nError::UnsupportedLanguage(lang.to_string()))?;
    serde_yaml::from_str(raw).map_err(|source| I18nError::Parse {
        lang: lang.to_string(),
        source,
    })
}

/// Translation handle, passed explicitly to whoever renders text
#[derive(Debug, Clone)]
pub struct Translator {
    lang: String,
    table: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl Translator {
    /// Load the table for `lang`
    pub fn new(lang: &str) -> Result<Self, I18nError> {
        debug!(%lang, "Translator::new: called");
        let lang = lang.trim().to_lowercase();
        let table = parse_table(&lang)?;
        let fallback = if lang == DEFAULT_LANGUAGE {
            HashMap::new()
        } else {
            parse_table(DEFAULT_LANGUAGE)?
        };
        Ok(Self { lang, table, fallback })
    }

    /// English translator
    pub fn english() -> Self {
        Self::new(DEFAULT_LANGUAGE).unwrap_or_else(|e| {
            warn!(error = %e, "Embedded English table failed to load, showing raw keys");
            Self {
                lang: DEFAULT_LANGUAGE.to_string(),
                table: HashMap::new(),
                fallback: HashMap::new(),
            }
        })
    }

    /// Selected language code
    pub fn language(&self) -> &str {
        &self.lang
    }

    /// Translation if one exists in the selected language or English
    pub fn get(&self, key: &str) -> Option<&str> {
        self.table
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(String::as_str)
    }

    /// Translation, or the key itself
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).unwrap_or(key)
    }

    /// Translation with `{name}` placeholders substituted
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut out = self.text(key).to_string();
        for (name, value) in args {
            out = out.replace(&format!("{{{}}}", name), value);
        }
        out
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_table_parses() {
        for lang in SUPPORTED_LANGUAGES {
            assert!(Translator::new(lang).is_ok(), "table {} should parse", lang);
        }
    }

    #[test]
    fn test_unsupported_language() {
        let err = Translator::new("fr").unwrap_err();
        assert!(matches!(err, I18nError::UnsupportedLanguage(_)));
        assert!(err.to_string().contains("ko"));
    }

    #[test]
    fn test_korean_falls_back_to_english() {
        let ko = Translator::new("ko").unwrap();
        assert_eq!(ko.language(), "ko");
        assert_eq!(ko.text("menu.title"), "Kickstart 튜토리얼");
        // Tutorial body text is only authored in English
        assert_eq!(ko.text("make_server.missing"), Translator::english().text("make_server.missing"));
    }

    #[test]
    fn test_missing_key_returns_key() {
        let en = Translator::english();
        assert!(en.get("no.such.key").is_none());
        assert_eq!(en.text("no.such.key"), "no.such.key");
    }

    #[test]
    fn test_format_substitutes_placeholders() {
        let en = Translator::english();
        let msg = en.format("runner.step_done", &[("step", "2"), ("total", "3")]);
        assert_eq!(msg, "You've completed step 2 of 3.");
    }

    #[test]
    fn test_korean_keys_exist_in_english() {
        let en = parse_table("en").unwrap();
        let ko = parse_table("ko").unwrap();
        for key in ko.keys() {
            assert!(en.contains_key(key), "ko key {} missing from en", key);
        }
    }

    #[test]
    fn test_language_code_is_normalized() {
        assert_eq!(Translator::new(" EN ").unwrap().language(), "en");
    }
}
