//! Supported language registry.
//!
//! The set is closed and fixed at compile time. Declaration order is the
//! iteration order exposed to callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "te")]
    Telugu,
    #[serde(rename = "kn")]
    Kannada,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Hindi,
        Language::Telugu,
        Language::Kannada,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Telugu => "te",
            Self::Kannada => "kn",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Telugu => "Telugu",
            Self::Kannada => "Kannada",
        }
    }

    /// Look up a language by code. Surrounding whitespace and case are ignored.
    pub fn validate(code: &str) -> Result<Self, PipelineError> {
        let normalized = code.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == normalized)
            .ok_or_else(|| PipelineError::InvalidLanguage {
                code: code.to_string(),
                supported: supported_codes_list(),
            })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::validate(s)
    }
}

/// Supported languages in declaration order.
pub fn supported() -> &'static [Language] {
    &Language::ALL
}

/// Display name for a raw code, if it is supported.
pub fn display_name(code: &str) -> Option<&'static str> {
    Language::validate(code).ok().map(Language::display_name)
}

/// Comma-separated list of supported codes, e.g. "en, hi, te, kn".
pub fn supported_codes_list() -> String {
    Language::ALL
        .iter()
        .map(|l| l.code())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every ordered (source, target) pair with distinct languages.
pub fn translation_pairs() -> Vec<(Language, Language)> {
    let mut pairs = Vec::new();
    for source in Language::ALL {
        for target in Language::ALL {
            if source != target {
                pairs.push((source, target));
            }
        }
    }
    pairs
}

/// Render a pair for display, e.g. "English to Hindi".
pub fn format_pair(source: Language, target: Language) -> String {
    format!("{} to {}", source.display_name(), target.display_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_known_codes() {
        assert_eq!(Language::validate("en").unwrap(), Language::English);
        assert_eq!(Language::validate(" KN ").unwrap(), Language::Kannada);
        assert_eq!("te".parse::<Language>().unwrap(), Language::Telugu);
    }

    #[test]
    fn test_validate_rejects_unknown() {
        let err = Language::validate("fr").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidLanguage { ref code, .. } if code == "fr"));
        assert_eq!(
            err.to_string(),
            "Unsupported language: fr. Supported: en, hi, te, kn"
        );
        assert!(Language::validate("").is_err());
    }

    #[test]
    fn test_declaration_order() {
        let codes: Vec<_> = supported().iter().map(|l| l.code()).collect();
        assert_eq!(codes, ["en", "hi", "te", "kn"]);
    }

    #[test]
    fn test_display_names_total() {
        for lang in supported() {
            assert_eq!(display_name(lang.code()), Some(lang.display_name()));
        }
        assert_eq!(display_name("de"), None);
    }

    #[test]
    fn test_translation_pairs_exclude_identity() {
        let pairs = translation_pairs();
        assert_eq!(pairs.len(), 12);
        assert!(pairs.iter().all(|(s, t)| s != t));
        assert_eq!(pairs[0], (Language::English, Language::Hindi));
    }

    #[test]
    fn test_format_pair() {
        assert_eq!(
            format_pair(Language::Telugu, Language::English),
            "Telugu to English"
        );
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Language::Hindi).unwrap();
        assert_eq!(json, "\"hi\"");
        let back: Language = serde_json::from_str("\"kn\"").unwrap();
        assert_eq!(back, Language::Kannada);
    }
}
