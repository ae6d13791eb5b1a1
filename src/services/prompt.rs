use crate::models::{ConversationTurn, ProviderConfig};
use crate::providers::types::{ChatMessage, ChatRequest, DEFAULT_TIMEOUT};
use crate::services::ChatError;

/// History window carried into every provider call. Older turns are dropped
/// to bound token and latency cost.
pub const DEFAULT_MAX_HISTORY: usize = 6;

/// A fully assembled conversation, ready to be bound to a provider config.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
}

impl PromptRequest {
    /// Binds this prompt to one configured backend, producing the request the
    /// adapter sends. The config's base URL falls back to the backend's
    /// well-known default.
    pub fn to_chat_request(&self, config: &ProviderConfig) -> ChatRequest {
        ChatRequest {
            api_key: config.api_key.clone().unwrap_or_default(),
            model: config.model.clone(),
            messages: self.messages.clone(),
            base_url: Some(
                config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| config.kind.default_base_url().to_string()),
            ),
            temperature: config.temperature,
            system_prompt: Some(self.system_prompt.clone()),
            max_tokens: config.max_tokens,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Builds a `PromptRequest` from the most recent `max_history` turns plus the
/// new user message. Pure: the source history is never mutated, and identical
/// inputs produce identical output.
pub fn assemble(
    system_prompt: &str,
    history: &[ConversationTurn],
    new_message: &str,
    max_history: usize,
) -> Result<PromptRequest, ChatError> {
    let message = new_message.trim();
    if message.is_empty() {
        return Err(ChatError::InvalidInput(
            "Message must not be empty".to_string(),
        ));
    }

    let start = history.len().saturating_sub(max_history);
    let mut messages: Vec<ChatMessage> = history[start..]
        .iter()
        .map(|turn| ChatMessage {
            role: turn.role,
            content: turn.text.clone(),
        })
        .collect();

    messages.push(ChatMessage {
        role: crate::models::Role::User,
        content: message.to_string(),
    });

    Ok(PromptRequest {
        system_prompt: system_prompt.to_string(),
        messages,
    })
}
