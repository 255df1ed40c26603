use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::AppState;
use crate::services::language::{LanguageCode, profiles};
use crate::utils::upload::ALLOWED_EXTENSIONS;

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub status: String,
    pub message: String,
    pub version: String,
    pub models: ModelNames,
    pub supported_languages: Vec<String>,
    pub features: Vec<String>,
    pub endpoints: BTreeMap<String, String>,
    pub image_support: ImageSupport,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModelNames {
    pub text: String,
    pub vision: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageSupport {
    pub enabled: bool,
    pub formats: Vec<String>,
    pub max_size: String,
    pub usage: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LanguagesResponse {
    pub languages: BTreeMap<String, LanguageName>,
    #[schema(value_type = String, example = "vi")]
    pub default: LanguageCode,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LanguageName {
    pub name: String,
}

pub(crate) fn endpoint_map() -> BTreeMap<String, String> {
    [
        ("GET /", "API information"),
        ("GET /health", "Health check"),
        ("GET /languages", "Supported languages"),
        ("POST /chat", "Send message (JSON for text, multipart form for image)"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Service metadata
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service metadata", body = ServiceInfo)),
    tag = "Info"
)]
pub async fn home(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    let config = &state.config;
    let max_mib = config.server.max_body_bytes / (1024 * 1024);

    let mut features = vec!["Multi-language support".to_string()];
    if state.chat_service.search_enabled() {
        features.push("Web search integration".to_string());
    }
    features.extend(
        ["Image understanding (vision AI)", "Auto language detection", "Dual-model system (fast text + vision)"]
            .map(str::to_string),
    );

    Json(ServiceInfo {
        status: "online".to_string(),
        message: "AI Chat API with Dual-Model System".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        models: ModelNames {
            text: config.inference.text_model.clone(),
            vision: config.inference.vision_model.clone(),
        },
        supported_languages: LanguageCode::ALL.iter().map(|c| c.as_str().to_string()).collect(),
        features,
        endpoints: endpoint_map(),
        image_support: ImageSupport {
            enabled: true,
            formats: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_size: format!("{}MB", max_mib.max(1)),
            usage: "Send as multipart/form-data with fields: message, language (optional), image (file)"
                .to_string(),
        },
    })
}

/// Supported languages and the default
#[utoipa::path(
    get,
    path = "/languages",
    responses((status = 200, description = "Supported languages", body = LanguagesResponse)),
    tag = "Info"
)]
pub async fn languages(State(state): State<Arc<AppState>>) -> Json<LanguagesResponse> {
    let languages = profiles()
        .map(|p| (p.code.as_str().to_string(), LanguageName { name: p.name.to_string() }))
        .collect();

    Json(LanguagesResponse { languages, default: state.config.default_language() })
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Endpoint not found",
            "available_endpoints": endpoint_map(),
        })),
    )
}
