// Common test utilities: deterministic stand-ins for the inference backend and search provider

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::services::chat::{ChatService, ChatSettings};
use crate::services::inference::{Generation, GenerateRequest, InferenceClient, InferenceError};
use crate::services::search::{SearchError, SearchProvider};
use crate::AppState;

/// What the stub backend answers to `generate`
#[derive(Debug, Clone)]
pub enum StubReply {
    Text(String),
    Timeout,
    Refused,
    Status(u16, String),
}

/// Inference backend that records every request and answers from a script
pub struct StubInference {
    reply: StubReply,
    models: Option<Vec<String>>,
    pub calls: Mutex<Vec<(GenerateRequest, Duration)>>,
}

impl StubInference {
    pub fn replying(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            models: Some(vec!["gemma2:9b".to_string(), "llava:7b".to_string()]),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn text(reply: &str) -> Arc<Self> {
        Self::replying(StubReply::Text(reply.to_string()))
    }

    /// Backend whose model listing fails as if the server were down
    pub fn offline() -> Arc<Self> {
        Arc::new(Self { reply: StubReply::Refused, models: None, calls: Mutex::new(Vec::new()) })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> (GenerateRequest, Duration) {
        self.calls.lock().unwrap().last().cloned().expect("no inference call recorded")
    }
}

#[async_trait]
impl InferenceClient for StubInference {
    async fn generate(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> Result<Generation, InferenceError> {
        self.calls.lock().unwrap().push((request.clone(), timeout));
        match &self.reply {
            StubReply::Text(text) => Ok(Generation {
                text: text.clone(),
                raw: serde_json::json!({ "response": text, "done": true }),
            }),
            StubReply::Timeout => Err(InferenceError::Timeout),
            StubReply::Refused => Err(InferenceError::Unreachable("connection refused".into())),
            StubReply::Status(status, body) => {
                Err(InferenceError::BadStatus { status: *status, body: body.clone() })
            },
        }
    }

    async fn list_models(&self, _timeout: Duration) -> Result<Vec<String>, InferenceError> {
        self.models
            .clone()
            .ok_or_else(|| InferenceError::Unreachable("connection refused".into()))
    }

    fn generate_url(&self) -> String {
        "http://stub:11434/api/generate".to_string()
    }
}

/// Search provider returning a fixed list (or failing) and counting queries
pub struct StubSearch {
    results: Option<Vec<String>>,
    pub queries: Mutex<Vec<String>>,
}

impl StubSearch {
    pub fn with_results(urls: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            results: Some(urls.iter().map(|u| u.to_string()).collect()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { results: None, queries: Mutex::new(Vec::new()) })
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(&self, query: &str, _num_results: usize) -> Result<Vec<String>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.results.clone().ok_or(SearchError::BadStatus(429))
    }

    fn provider_name(&self) -> &str {
        "stub"
    }
}

pub fn test_settings() -> ChatSettings {
    ChatSettings::from_config(&Config::default())
}

pub fn chat_service(inference: Arc<StubInference>, search: Option<Arc<StubSearch>>) -> ChatService {
    ChatService::new(
        inference,
        search.map(|s| s as Arc<dyn SearchProvider>),
        test_settings(),
    )
}

/// Application state wired to the stubs, with default configuration
pub fn test_state(inference: Arc<StubInference>, search: Option<Arc<StubSearch>>) -> Arc<AppState> {
    test_state_with_config(Config::default(), inference, search)
}

pub fn test_state_with_config(
    config: Config,
    inference: Arc<StubInference>,
    search: Option<Arc<StubSearch>>,
) -> Arc<AppState> {
    let chat_service = ChatService::new(
        inference.clone(),
        search.map(|s| s as Arc<dyn SearchProvider>),
        ChatSettings::from_config(&config),
    );
    Arc::new(AppState { config: Arc::new(config), inference, chat_service })
}
