use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::AppState;
use crate::services::inference::InferenceError;
use crate::services::language::LanguageCode;

/// Reachability of the inference backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum BackendStatus {
    #[serde(rename = "running")]
    Running,
    /// Reachable but answered with a non-success status
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "not running")]
    NotRunning,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub inference: BackendInfo,
    pub models: ModelsAvailability,
    pub available_models: Vec<String>,
    pub languages: Vec<String>,
    pub features: HealthFeatures,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BackendInfo {
    pub status: BackendStatus,
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModelsAvailability {
    pub text: ModelAvailability,
    pub vision: ModelAvailability,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModelAvailability {
    pub name: String,
    pub available: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthFeatures {
    pub web_search: bool,
    pub vision: bool,
    pub multi_language: bool,
}

/// A configured model counts as available if any installed tag contains its name
pub fn model_available(model: &str, installed: &[String]) -> bool {
    installed.iter().any(|name| name.contains(model))
}

/// Liveness of the inference backend
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Backend status and model availability", body = HealthResponse)),
    tag = "Info"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let config = &state.config;

    let (status, available_models) =
        match state.inference.list_models(config.inference.health_timeout()).await {
            Ok(models) => (BackendStatus::Running, models),
            Err(InferenceError::BadStatus { status, .. }) => {
                tracing::warn!("Health check: inference service answered HTTP {}", status);
                (BackendStatus::Error, Vec::new())
            },
            Err(e) => {
                tracing::error!("Health check error: {}", e);
                (BackendStatus::NotRunning, Vec::new())
            },
        };

    let availability = |name: &str| ModelAvailability {
        name: name.to_string(),
        available: model_available(name, &available_models),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Local::now().to_rfc3339(),
        inference: BackendInfo { status, url: state.inference.generate_url() },
        models: ModelsAvailability {
            text: availability(&config.inference.text_model),
            vision: availability(&config.inference.vision_model),
        },
        available_models: available_models.clone(),
        languages: LanguageCode::ALL.iter().map(|c| c.as_str().to_string()).collect(),
        features: HealthFeatures {
            web_search: state.chat_service.search_enabled(),
            vision: true,
            multi_language: true,
        },
    })
}
