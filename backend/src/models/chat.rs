use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::language::LanguageCode;

/// JSON body of `POST /chat`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ChatJsonRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// A non-string value is kept as its JSON text and later treated as an unknown code
    #[serde(default, deserialize_with = "lenient_code")]
    pub language: Option<String>,
}

fn lenient_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(code) => Some(code),
        other => Some(other.to_string()),
    })
}

/// Uploaded image, already validated against the allowed formats
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Sanitised file name, echoed back to the caller
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Chat input, resolved once from the request payload shape
#[derive(Debug, Clone)]
pub enum ChatInput {
    Json { message: String, language: Option<String> },
    Multipart { message: String, language: Option<String>, image: Option<ImageUpload> },
}

impl ChatInput {
    pub fn message(&self) -> &str {
        match self {
            ChatInput::Json { message, .. } | ChatInput::Multipart { message, .. } => message,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            ChatInput::Json { language, .. } | ChatInput::Multipart { language, .. } => {
                language.as_deref()
            },
        }
    }

    pub fn image(&self) -> Option<&ImageUpload> {
        match self {
            ChatInput::Json { .. } => None,
            ChatInput::Multipart { image, .. } => image.as_ref(),
        }
    }

    pub fn into_image(self) -> Option<ImageUpload> {
        match self {
            ChatInput::Json { .. } => None,
            ChatInput::Multipart { image, .. } => image,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    Text,
    Vision,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Text => "text",
            ChatMode::Vision => "vision",
        }
    }
}

/// Successful `POST /chat` reply
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
    pub model: String,
    pub mode: ChatMode,
    #[schema(value_type = String, example = "vi")]
    pub language: LanguageCode,
    pub language_name: String,
    pub searched: bool,
    pub search_results: Vec<String>,
    pub has_image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_filename: Option<String>,
    /// Wall-clock seconds, two decimals
    pub processing_time: f64,
}
