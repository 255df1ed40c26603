//! Language profiles for chat prompts
//!
//! A closed set of languages the gateway can answer in. Each profile
//! carries the prompt wording and search-trigger keywords for that
//! language; the table is static and never mutated after startup.

mod detect;
mod profiles;

pub use detect::detect_language;

use serde::Serialize;
use utoipa::ToSchema;

/// Supported language codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    Vi,
    En,
    Zh,
}

impl LanguageCode {
    /// All codes in table order
    pub const ALL: [LanguageCode; 3] = [LanguageCode::Vi, LanguageCode::En, LanguageCode::Zh];

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::Vi => "vi",
            LanguageCode::En => "en",
            LanguageCode::Zh => "zh",
        }
    }

    /// Exact, case-sensitive lookup of a supplied code
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }

    pub fn profile(&self) -> &'static LanguageProfile {
        match self {
            LanguageCode::Vi => &profiles::VIETNAMESE,
            LanguageCode::En => &profiles::ENGLISH,
            LanguageCode::Zh => &profiles::CHINESE,
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prompt wording and search heuristics for one language
#[derive(Debug)]
pub struct LanguageProfile {
    pub code: LanguageCode,
    pub name: &'static str,
    /// Text-mode template; placeholders `{search_context}` and `{message}`
    pub system_prompt: &'static str,
    /// Vision-mode template; placeholder `{message}` only
    pub vision_prompt: &'static str,
    /// Prompt used when an image arrives without a question
    pub describe_image_prompt: &'static str,
    /// Lowercase substrings that make a message worth a web search
    pub search_keywords: &'static [&'static str],
    /// strftime pattern for the date stamped on the search context header
    pub search_date_format: &'static str,
    /// Header line of the search context; `{date}` is replaced by the formatted date
    pub search_header: &'static str,
    pub search_closing: &'static str,
}

/// Iterate the whole table in `LanguageCode::ALL` order
pub fn profiles() -> impl Iterator<Item = &'static LanguageProfile> {
    LanguageCode::ALL.into_iter().map(|c| c.profile())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown_codes() {
        assert_eq!(LanguageCode::parse("vi"), Some(LanguageCode::Vi));
        assert_eq!(LanguageCode::parse("en"), Some(LanguageCode::En));
        assert_eq!(LanguageCode::parse("zh"), Some(LanguageCode::Zh));
        assert_eq!(LanguageCode::parse("EN"), None);
        assert_eq!(LanguageCode::parse("fr"), None);
        assert_eq!(LanguageCode::parse(""), None);
    }

    #[test]
    fn test_profiles_are_consistent() {
        for profile in profiles() {
            assert_eq!(profile.code.profile().name, profile.name);
            assert!(profile.system_prompt.contains("{message}"));
            assert!(profile.system_prompt.contains("{search_context}"));
            assert!(profile.vision_prompt.contains("{message}"));
            assert!(!profile.vision_prompt.contains("{search_context}"));
            assert!(profile.search_header.contains("{date}"));
            assert!(!profile.search_keywords.is_empty());
            // Keywords are matched against a lowercased message
            for keyword in profile.search_keywords {
                assert_eq!(*keyword, keyword.to_lowercase());
            }
        }
    }

    #[test]
    fn test_serializes_as_lowercase_code() {
        assert_eq!(serde_json::to_string(&LanguageCode::Zh).unwrap(), "\"zh\"");
    }
}
