//! Inference backend client
//!
//! Narrow interface over the local generation server (Ollama-compatible
//! `/api/generate` and `/api/tags`). Transport failures keep their kind so
//! the chat handler can answer 504 vs 503, and non-2xx responses are handed
//! back with their status and body untouched.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Inference request timed out")]
    Timeout,

    #[error("Cannot connect to inference service: {0}")]
    Unreachable(String),

    #[error("Inference service returned HTTP {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Inference transport error: {0}")]
    Transport(String),

    #[error("Failed to decode inference response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Timeout
        } else if err.is_connect() {
            InferenceError::Unreachable(err.to_string())
        } else if err.is_decode() {
            InferenceError::Decode(err.to_string())
        } else {
            InferenceError::Transport(err.to_string())
        }
    }
}

/// Sampling options forwarded verbatim to the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Maximum output tokens
    pub num_predict: u32,
}

/// Body of a single non-streaming generation call
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Base64-encoded images, vision models only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Successful generation: the extracted text plus the raw backend payload
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub raw: serde_json::Value,
}

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// One generation call bounded by `timeout`. No retries.
    async fn generate(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> Result<Generation, InferenceError>;

    /// Names of the models the backend has installed
    async fn list_models(&self, timeout: Duration) -> Result<Vec<String>, InferenceError>;

    /// URL that `generate` posts to, for status reporting
    fn generate_url(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// HTTP client for an Ollama-compatible server
pub struct OllamaClient {
    http_client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, InferenceError> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| InferenceError::Transport(e.to_string()))?;
        Ok(Self { http_client, base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url)
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    async fn generate(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> Result<Generation, InferenceError> {
        let url = self.generate_url();
        tracing::debug!("POST {} model={} timeout={:?}", url, request.model, timeout);

        let response =
            self.http_client.post(&url).json(request).timeout(timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Inference service error {}: {}", status, body);
            return Err(InferenceError::BadStatus { status: status.as_u16(), body });
        }

        let raw: serde_json::Value = response.json().await?;
        let text = raw
            .get("response")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(Generation { text, raw })
    }

    async fn list_models(&self, timeout: Duration) -> Result<Vec<String>, InferenceError> {
        let response = self.http_client.get(self.tags_url()).timeout(timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::BadStatus { status: status.as_u16(), body });
        }

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn text_request() -> GenerateRequest {
        GenerateRequest {
            model: "gemma2:9b".to_string(),
            prompt: "Question: hi".to_string(),
            images: None,
            stream: false,
            options: GenerateOptions { temperature: 0.2, top_p: 0.9, top_k: Some(40), num_predict: 400 },
        }
    }

    #[test]
    fn test_request_serialization_omits_absent_fields() {
        let mut request = text_request();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["stream"], json!(false));
        assert_eq!(value["options"]["top_k"], json!(40));
        assert_eq!(value["options"]["num_predict"], json!(400));
        assert!(value.get("images").is_none());

        request.images = Some(vec!["aGVsbG8=".to_string()]);
        request.options.top_k = None;
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["images"], json!(["aGVsbG8="]));
        assert!(value["options"].get("top_k").is_none());
    }

    #[tokio::test]
    async fn test_generate_returns_trimmed_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"model": "gemma2:9b", "stream": false})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "  Xin chào!\n", "done": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(format!("{}/", server.uri())).unwrap();
        let generation = client.generate(&text_request(), Duration::from_secs(5)).await.unwrap();
        assert_eq!(generation.text, "Xin chào!");
        assert_eq!(generation.raw["done"], json!(true));
    }

    #[tokio::test]
    async fn test_generate_passes_through_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model 'gemma2:9b' not found"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri()).unwrap();
        let err = client.generate(&text_request(), Duration::from_secs(5)).await.unwrap_err();
        match err {
            InferenceError::BadStatus { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "model 'gemma2:9b' not found");
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_reports_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri()).unwrap();
        let err = client.generate(&text_request(), Duration::from_millis(200)).await.unwrap_err();
        assert!(matches!(err, InferenceError::Timeout), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_generate_reports_unreachable() {
        // Bind then drop a listener so the port is known to be closed
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OllamaClient::new(format!("http://{}", addr)).unwrap();
        let err = client.generate(&text_request(), Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, InferenceError::Unreachable(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "gemma2:9b"}, {"name": "llava:7b-v1.6"}]
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri()).unwrap();
        let models = client.list_models(Duration::from_secs(5)).await.unwrap();
        assert_eq!(models, vec!["gemma2:9b", "llava:7b-v1.6"]);
        assert_eq!(client.generate_url(), format!("{}/api/generate", server.uri()));
    }
}
