//! Chat endpoint
//!
//! `POST /chat` accepts either a JSON body (text only) or a multipart form
//! that may carry an image. The payload shape is resolved into a
//! [`ChatInput`] before any chat logic runs.

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State, multipart::MultipartError},
    http::{StatusCode, header::CONTENT_TYPE},
};
use std::sync::Arc;

use crate::AppState;
use crate::models::{ChatInput, ChatJsonRequest, ChatResponse, ImageUpload};
use crate::utils::upload::{allowed_file, secure_filename};
use crate::utils::{ApiError, ApiResult};

/// Send a chat message, optionally with an image
#[utoipa::path(
    post,
    path = "/chat",
    request_body(
        content = ChatJsonRequest,
        description = "JSON for text chat; multipart/form-data with fields message, language and image for vision chat"
    ),
    responses(
        (status = 200, description = "Generated reply", body = ChatResponse),
        (status = 400, description = "Missing message, missing body or invalid image format"),
        (status = 413, description = "Request body too large"),
        (status = 500, description = "Inference service error or internal error"),
        (status = 503, description = "Inference service unreachable"),
        (status = 504, description = "Inference service timed out")
    ),
    tag = "Chat"
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> ApiResult<Json<ChatResponse>> {
    tracing::info!("{}", "=".repeat(60));
    tracing::info!("New chat request at {}", chrono::Local::now().format("%H:%M:%S"));

    let input = parse_input(request, state.config.server.max_body_bytes).await?;
    let response = state.chat_service.chat(input).await?;
    Ok(Json(response))
}

/// Branch on the content type and build the chat input.
pub async fn parse_input(request: Request, max_body_bytes: usize) -> ApiResult<ChatInput> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    tracing::info!("Content-Type: {}", content_type);

    if content_type.contains("multipart/form-data") {
        tracing::info!("Request type: multipart form (may contain image)");
        let multipart = Multipart::from_request(request, &()).await.map_err(|rejection| {
            ApiError::invalid_input(format!("Malformed multipart request: {}", rejection.body_text()))
        })?;
        parse_multipart(multipart, max_body_bytes).await
    } else {
        tracing::info!("Request type: JSON (text only)");
        let body = Bytes::from_request(request, &()).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge { max_bytes: max_body_bytes }
            } else {
                ApiError::NoData
            }
        })?;
        parse_json(&body)
    }
}

fn parse_json(body: &[u8]) -> ApiResult<ChatInput> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Unparsable JSON body: {}", e);
        ApiError::NoData
    })?;

    // Absent, null and empty payloads all count as "no data"
    let has_data = match &value {
        serde_json::Value::Object(map) => !map.is_empty(),
        _ => false,
    };
    if !has_data {
        return Err(ApiError::NoData);
    }

    let request: ChatJsonRequest = serde_json::from_value(value)
        .map_err(|e| ApiError::invalid_input(format!("Invalid chat payload: {}", e)))?;

    Ok(ChatInput::Json {
        message: request.message.unwrap_or_default(),
        language: request.language,
    })
}

async fn parse_multipart(mut multipart: Multipart, max_body_bytes: usize) -> ApiResult<ChatInput> {
    let to_api_error = |err: MultipartError| {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge { max_bytes: max_body_bytes }
        } else {
            ApiError::invalid_input(err.body_text())
        }
    };

    let mut message = String::new();
    let mut language = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(to_api_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("message") => message = field.text().await.map_err(to_api_error)?,
            Some("language") => {
                let value = field.text().await.map_err(to_api_error)?;
                language = Some(value).filter(|v| !v.is_empty());
            },
            Some("image") => {
                let Some(filename) = field.file_name().map(str::to_string).filter(|f| !f.is_empty())
                else {
                    continue;
                };
                if !allowed_file(&filename) {
                    tracing::warn!("Rejected upload with disallowed format: {}", filename);
                    return Err(ApiError::InvalidImageFormat);
                }

                let bytes = field.bytes().await.map_err(to_api_error)?;
                let filename = secure_filename(&filename);
                tracing::info!("Image received: {}", filename);
                tracing::info!("Image size: {:.2} KB", bytes.len() as f64 / 1024.0);
                image = Some(ImageUpload { filename, bytes: bytes.to_vec() });
            },
            _ => {},
        }
    }

    Ok(ChatInput::Multipart { message, language, image })
}
