//! Prompt composition
//!
//! Fills a language profile's template with the user message and, in
//! text mode, the web search context. Templates use `{name}` placeholders;
//! a placeholder with no supplied value is a configuration defect and is
//! reported instead of being left in the prompt.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use super::language::LanguageProfile;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PromptError {
    #[error("Prompt template references '{{{0}}}' but no value was supplied")]
    MissingValue(String),
}

/// Substitute every `{name}` in `template` with its value from `values`.
pub fn render(template: &str, values: &[(&str, &str)]) -> Result<String, PromptError> {
    let mut missing = None;
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        let name = &caps[1];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => value.to_string(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            },
        }
    });

    match missing {
        Some(name) => Err(PromptError::MissingValue(name)),
        None => Ok(rendered.into_owned()),
    }
}

/// Final prompt for the text model.
pub fn compose_text_prompt(
    profile: &LanguageProfile,
    message: &str,
    search_context: &str,
) -> Result<String, PromptError> {
    render(profile.system_prompt, &[("message", message), ("search_context", search_context)])
}

/// Final prompt for the vision model. Search context is never offered here.
pub fn compose_vision_prompt(
    profile: &LanguageProfile,
    message: &str,
) -> Result<String, PromptError> {
    render(profile.vision_prompt, &[("message", message)])
}

/// Search context block appended to the text prompt.
///
/// Empty when there are no result URLs. Otherwise: a blank line, the
/// dated header, one `- url` line per result, a blank line and the
/// closing instruction.
pub fn build_search_context(
    profile: &LanguageProfile,
    urls: &[String],
    today: NaiveDate,
) -> Result<String, PromptError> {
    if urls.is_empty() {
        return Ok(String::new());
    }

    let date = today.format(profile.search_date_format).to_string();
    let header = render(profile.search_header, &[("date", &date)])?;
    let bullets = urls.iter().map(|url| format!("- {}", url)).collect::<Vec<_>>().join("\n");

    Ok(format!("\n\n{}\n{}\n\n{}", header, bullets, profile.search_closing))
}
