pub mod chat;

pub use chat::{ChatInput, ChatJsonRequest, ChatMode, ChatResponse, ImageUpload};
