//! Chat orchestration
//!
//! Drives one chat request from parsed input to reply:
//! validate message → resolve language → (text only) maybe search →
//! compose prompt → one upstream call → format response.
//! Nothing is retried and nothing is shared between requests.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::inference::{GenerateOptions, GenerateRequest, InferenceClient};
use super::language::{LanguageCode, detect_language};
use super::prompt::{build_search_context, compose_text_prompt, compose_vision_prompt};
use super::search::{SearchProvider, fetch_search_results, should_search};
use crate::config::Config;
use crate::models::{ChatInput, ChatMode, ChatResponse, ImageUpload};
use crate::utils::{ApiError, ApiResult};

/// Fixed sampling for the text model
pub const TEXT_OPTIONS: GenerateOptions =
    GenerateOptions { temperature: 0.2, top_p: 0.9, top_k: Some(40), num_predict: 400 };

/// Fixed sampling for the vision model
pub const VISION_OPTIONS: GenerateOptions =
    GenerateOptions { temperature: 0.3, top_p: 0.9, top_k: None, num_predict: 500 };

/// Per-deployment knobs of the chat flow
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub text_model: String,
    pub vision_model: String,
    pub default_language: LanguageCode,
    pub text_timeout: Duration,
    pub vision_timeout: Duration,
    pub search_results: usize,
}

impl ChatSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            text_model: config.inference.text_model.clone(),
            vision_model: config.inference.vision_model.clone(),
            default_language: config.default_language(),
            text_timeout: config.inference.text_timeout(),
            vision_timeout: config.inference.vision_timeout(),
            search_results: config.search.num_results,
        }
    }
}

/// How the request language was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageSource {
    Supplied,
    Detected,
    /// A code was supplied but is not in the table
    UnknownFallback,
}

impl LanguageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageSource::Supplied => "supplied",
            LanguageSource::Detected => "detected",
            LanguageSource::UnknownFallback => "unknown code, default used",
        }
    }
}

/// Settle the response language.
///
/// A known supplied code is used as is. A missing or blank one is
/// detected from the message. An unknown non-empty code falls back to
/// the default with a warning; that hides caller typos, so it is logged.
pub fn resolve_language(
    supplied: Option<&str>,
    message: &str,
    default: LanguageCode,
) -> (LanguageCode, LanguageSource) {
    match supplied.map(str::trim).filter(|code| !code.is_empty()) {
        None => {
            let detected = detect_language(message, default);
            tracing::info!(
                "Auto-detected language: {} ({})",
                detected,
                detected.profile().name
            );
            (detected, LanguageSource::Detected)
        },
        Some(code) => match LanguageCode::parse(code) {
            Some(known) => (known, LanguageSource::Supplied),
            None => {
                tracing::warn!("Unknown language '{}', using default: {}", code, default);
                (default, LanguageSource::UnknownFallback)
            },
        },
    }
}

pub struct ChatService {
    inference: Arc<dyn InferenceClient>,
    search: Option<Arc<dyn SearchProvider>>,
    settings: ChatSettings,
}

impl ChatService {
    pub fn new(
        inference: Arc<dyn InferenceClient>,
        search: Option<Arc<dyn SearchProvider>>,
        settings: ChatSettings,
    ) -> Self {
        Self { inference, search, settings }
    }

    pub fn search_enabled(&self) -> bool {
        self.search.is_some()
    }

    /// Run one chat request to completion.
    pub async fn chat(&self, input: ChatInput) -> ApiResult<ChatResponse> {
        let started = Instant::now();

        let trimmed = input.message().trim().to_string();
        let (language, source) =
            resolve_language(input.language(), &trimmed, self.settings.default_language);
        let profile = language.profile();
        tracing::info!("Language: {} ({}, {})", language, profile.name, source.as_str());

        let image = input.into_image();
        let message = if !trimmed.is_empty() {
            trimmed
        } else if image.is_some() {
            tracing::info!("Image without a question, using default prompt ({})", language);
            profile.describe_image_prompt.to_string()
        } else {
            return Err(ApiError::MessageRequired);
        };
        tracing::info!("Message: {}", preview(&message, 100));

        let mut response = match image {
            Some(image) => self.vision_chat(language, &message, image).await?,
            None => self.text_chat(language, &message).await?,
        };

        response.processing_time = round_secs(started.elapsed());
        tracing::info!(
            "{} response ready in {:.2}s: {}",
            response.mode.as_str(),
            response.processing_time,
            preview(&response.reply, 100)
        );
        Ok(response)
    }

    async fn text_chat(&self, language: LanguageCode, message: &str) -> ApiResult<ChatResponse> {
        let model = &self.settings.text_model;
        tracing::info!("MODE: TEXT, model={}", model);
        let profile = language.profile();

        let search_results = match &self.search {
            Some(provider) if should_search(message, language) => {
                tracing::info!("Search is needed for this query");
                fetch_search_results(provider.as_ref(), message, self.settings.search_results)
                    .await
            },
            _ => Vec::new(),
        };
        let today = chrono::Local::now().date_naive();
        let search_context = build_search_context(profile, &search_results, today)?;
        if !search_results.is_empty() {
            tracing::info!("Added {} search results to context", search_results.len());
        }

        let request = GenerateRequest {
            model: model.clone(),
            prompt: compose_text_prompt(profile, message, &search_context)?,
            images: None,
            stream: false,
            options: TEXT_OPTIONS,
        };
        let generation = self
            .inference
            .generate(&request, self.settings.text_timeout)
            .await
            .map_err(|e| with_mode(e.into(), ChatMode::Text))?;

        Ok(ChatResponse {
            reply: generation.text,
            model: model.clone(),
            mode: ChatMode::Text,
            language,
            language_name: profile.name.to_string(),
            searched: !search_results.is_empty(),
            search_results,
            has_image: false,
            image_filename: None,
            processing_time: 0.0,
        })
    }

    async fn vision_chat(
        &self,
        language: LanguageCode,
        message: &str,
        image: ImageUpload,
    ) -> ApiResult<ChatResponse> {
        let model = &self.settings.vision_model;
        tracing::info!("MODE: VISION, model={}", model);
        let profile = language.profile();

        let request = GenerateRequest {
            model: model.clone(),
            prompt: compose_vision_prompt(profile, message)?,
            images: Some(vec![BASE64.encode(&image.bytes)]),
            stream: false,
            options: VISION_OPTIONS,
        };
        let generation = self
            .inference
            .generate(&request, self.settings.vision_timeout)
            .await
            .map_err(|e| with_mode(e.into(), ChatMode::Vision))?;

        Ok(ChatResponse {
            reply: generation.text,
            model: model.clone(),
            mode: ChatMode::Vision,
            language,
            language_name: profile.name.to_string(),
            searched: false,
            search_results: Vec::new(),
            has_image: true,
            image_filename: Some(image.filename),
            processing_time: 0.0,
        })
    }
}

fn with_mode(err: ApiError, mode: ChatMode) -> ApiError {
    match err {
        ApiError::UpstreamBadStatus { status, body, .. } => {
            ApiError::UpstreamBadStatus { mode, status, body }
        },
        other => other,
    }
}

/// Seconds rounded to two decimals
fn round_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}
