pub mod gemini;
pub mod openai;
pub mod traits;
pub mod types;

use std::sync::Arc;

pub use traits::ChatProvider;
pub use types::{ChatMessage, ChatRequest, ChatResponse, ProviderError};

use crate::models::ProviderKind;

/// Returns the adapter that speaks the given backend's wire shape. Groq and
/// OpenRouter share the chat-completions shape and differ only in base URL.
pub fn provider_for(kind: ProviderKind) -> Arc<dyn ChatProvider> {
    match kind {
        ProviderKind::Groq | ProviderKind::OpenRouter => Arc::new(openai::OpenAiProvider::new()),
        ProviderKind::Gemini => Arc::new(gemini::GeminiProvider::new()),
    }
}
