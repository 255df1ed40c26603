//! AI chat gateway
//!
//! Stateless HTTP front for a local inference server: detects the
//! message language, optionally grounds text questions with web search
//! results, and routes to a text or vision model.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::services::{
    ChatService, ChatSettings, DuckDuckGoSearch, InferenceClient, OllamaClient, SearchProvider,
};

/// Shared, read-only application state
pub struct AppState {
    pub config: Arc<Config>,
    pub inference: Arc<dyn InferenceClient>,
    pub chat_service: ChatService,
}

impl AppState {
    /// Wire the real inference backend and search provider from configuration
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let inference: Arc<dyn InferenceClient> =
            Arc::new(OllamaClient::new(config.inference.base_url.clone())?);

        let search: Option<Arc<dyn SearchProvider>> = if config.search.enabled {
            let provider = DuckDuckGoSearch::new(
                config.search.endpoint.clone(),
                std::time::Duration::from_secs(config.search.timeout_secs),
            )?;
            Some(Arc::new(provider))
        } else {
            tracing::info!("Web search enrichment disabled");
            None
        };

        let chat_service = ChatService::new(inference.clone(), search, ChatSettings::from_config(&config));

        Ok(Self { config: Arc::new(config), inference, chat_service })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::info::home,
        handlers::info::languages,
        handlers::health::health,
        handlers::chat::chat,
    ),
    components(schemas(
        handlers::info::ServiceInfo,
        handlers::info::ModelNames,
        handlers::info::ImageSupport,
        handlers::info::LanguagesResponse,
        handlers::info::LanguageName,
        handlers::health::HealthResponse,
        handlers::health::BackendInfo,
        handlers::health::BackendStatus,
        handlers::health::ModelsAvailability,
        handlers::health::ModelAvailability,
        handlers::health::HealthFeatures,
        models::ChatJsonRequest,
        models::ChatResponse,
        models::ChatMode,
    )),
    tags(
        (name = "Chat", description = "Text and vision chat"),
        (name = "Info", description = "Service metadata and health")
    )
)]
pub struct ApiDoc;

/// Build the HTTP router with all routes and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.server.max_body_bytes;
    let max_concurrent = state.config.server.max_concurrent_requests;

    Router::new()
        .route("/", get(handlers::info::home))
        .route("/languages", get(handlers::info::languages))
        .route("/health", get(handlers::health::health))
        .route("/chat", post(handlers::chat::chat))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(handlers::info::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
