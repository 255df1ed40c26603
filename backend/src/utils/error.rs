use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use thiserror::Error;

use super::upload::ALLOWED_EXTENSIONS;
use crate::models::ChatMode;
use crate::services::inference::InferenceError;
use crate::services::prompt::PromptError;

/// API Error returned by every handler
///
/// Each variant renders as `{"error": <headline>, ...context}` with the
/// status code the chat contract assigns to it.
#[derive(Error, Debug)]
pub enum ApiError {
    // Client input errors 4xx
    #[error("No data provided")]
    NoData,

    #[error("Message is required")]
    MessageRequired,

    #[error("Invalid file format")]
    InvalidImageFormat,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large")]
    PayloadTooLarge { max_bytes: usize },

    // Upstream errors
    #[error("Request timeout")]
    UpstreamTimeout,

    #[error("Cannot connect to inference service: {0}")]
    UpstreamUnavailable(String),

    #[error("Inference service returned HTTP {status}")]
    UpstreamBadStatus { mode: ChatMode, status: u16, body: String },

    // System errors 5xx
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// Helper to create internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// Helper to create invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoData | Self::MessageRequired | Self::InvalidImageFormat | Self::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            },
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamBadStatus { .. } | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// JSON error body: headline under `error` plus variant-specific context
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        let mut put = |key: &str, value: Value| {
            body.insert(key.to_string(), value);
        };

        match self {
            Self::NoData | Self::MessageRequired => put("error", json!(self.to_string())),
            Self::InvalidImageFormat => {
                put("error", json!(self.to_string()));
                put("allowed_formats", json!(ALLOWED_EXTENSIONS));
            },
            Self::InvalidInput(details) => {
                put("error", json!("Invalid input"));
                put("details", json!(details));
            },
            Self::PayloadTooLarge { max_bytes } => {
                put("error", json!(self.to_string()));
                put("max_size", json!(format_size(*max_bytes)));
                put("hint", json!("Please upload a smaller image"));
            },
            Self::UpstreamTimeout => {
                put("error", json!(self.to_string()));
                put(
                    "hint",
                    json!("The AI model took too long to respond. Try a shorter message."),
                );
            },
            Self::UpstreamUnavailable(_) => {
                put("error", json!("Cannot connect to inference service"));
                put("hint", json!("Make sure the inference server is running: ollama serve"));
            },
            Self::UpstreamBadStatus { mode, status, body: upstream } => {
                let headline = match mode {
                    ChatMode::Text => "AI service error",
                    ChatMode::Vision => "Vision AI service error",
                };
                put("error", json!(headline));
                put("status", json!(status));
                put("details", json!(upstream));
            },
            Self::InternalError(message) => {
                put("error", json!("Internal server error"));
                put("details", json!(message));
            },
        }

        Value::Object(body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed with {}: {:?}", status, self);
        } else {
            tracing::warn!("Rejected request with {}: {}", status, self);
        }

        (status, Json(self.body())).into_response()
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Timeout => ApiError::UpstreamTimeout,
            InferenceError::Unreachable(reason) => ApiError::UpstreamUnavailable(reason),
            // Mode is rewritten by the chat service once it is known
            InferenceError::BadStatus { status, body } => {
                ApiError::UpstreamBadStatus { mode: ChatMode::Text, status, body }
            },
            other @ (InferenceError::Transport(_) | InferenceError::Decode(_)) => {
                ApiError::internal_error(other.to_string())
            },
        }
    }
}

impl From<PromptError> for ApiError {
    fn from(err: PromptError) -> Self {
        ApiError::internal_error(err.to_string())
    }
}

fn format_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{}KB", bytes.div_ceil(1024))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
