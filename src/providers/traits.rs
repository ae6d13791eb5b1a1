use async_trait::async_trait;

use super::types::{ChatRequest, ChatResponse, ProviderError};

/// One upstream text-generation backend. Implementations make exactly one
/// outbound call per invocation and convert every failure mode (network,
/// non-2xx, malformed or empty body) into a `ProviderError` before returning.
/// Retry and fallback live above this layer.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn send_message(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}
