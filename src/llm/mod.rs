//! Chat-completion client abstraction.
//!
//! The planner and synthesizer talk to the generative backend through the
//! [`LlmClient`] trait so tests can substitute a deterministic stub.

mod openrouter;

pub use openrouter::OpenRouterClient;

use async_trait::async_trait;
use serde::Serialize;

/// Message role in a chat completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A chat-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Request a completion and return the assistant message content.
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> anyhow::Result<String>;
}
