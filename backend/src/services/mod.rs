pub mod chat;
pub mod inference;
pub mod language;
pub mod prompt;
pub mod search;

pub use chat::{ChatService, ChatSettings};
pub use inference::{InferenceClient, OllamaClient};
pub use search::{DuckDuckGoSearch, SearchProvider};
