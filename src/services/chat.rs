use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::models::{ConversationTurn, ProviderConfig};
use crate::providers::{provider_for, ChatProvider};
use crate::services::{canned, prompt, safety, ChatError};

/// Replies at or below this length are treated as a provider failure;
/// guards against empty or garbage completions.
const MIN_REPLY_CHARS: usize = 10;

/// Tries configured backends in declared priority order and degrades to the
/// canned topic table when all of them fail. Holds no mutable state, so one
/// instance serves any number of concurrent conversations.
pub struct FallbackSelector {
    system_prompt: String,
    max_history: usize,
    candidates: Vec<(ProviderConfig, Arc<dyn ChatProvider>)>,
}

impl FallbackSelector {
    /// Builds the candidate list from configuration, skipping anything
    /// disabled or credential-less. Order is preserved.
    pub fn from_configs(
        system_prompt: impl Into<String>,
        max_history: usize,
        configs: &[ProviderConfig],
    ) -> Self {
        let candidates = configs
            .iter()
            .filter(|c| c.is_usable())
            .map(|c| (c.clone(), provider_for(c.kind)))
            .collect();
        Self {
            system_prompt: system_prompt.into(),
            max_history,
            candidates,
        }
    }

    /// Constructor with explicit candidates, for callers that already hold
    /// adapter instances (and for tests injecting fakes).
    pub fn with_candidates(
        system_prompt: impl Into<String>,
        max_history: usize,
        candidates: Vec<(ProviderConfig, Arc<dyn ChatProvider>)>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            max_history,
            candidates,
        }
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Produces a reply for one user message. The crisis short-circuit runs
    /// first and never touches the network. Provider failures are absorbed:
    /// the next candidate is tried, and the canned table is the floor. Only
    /// `InvalidInput` (empty message) and cancellation surface as errors.
    pub async fn respond(
        &self,
        message: &str,
        history: &[ConversationTurn],
        cancel: &CancellationToken,
    ) -> Result<String, ChatError> {
        if safety::is_crisis(message) {
            tracing::info!("crisis keyword matched, returning safety response");
            return Ok(safety::CRISIS_RESPONSE.to_string());
        }

        let prompt = prompt::assemble(&self.system_prompt, history, message, self.max_history)?;

        for (config, provider) in &self.candidates {
            let request = prompt.to_chat_request(config);
            tracing::debug!(provider = config.kind.as_str(), model = %config.model, "trying provider");

            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(ChatError::Cancelled),
                r = provider.send_message(request) => r,
            };

            match result {
                Ok(response) if response.content.trim().chars().count() > MIN_REPLY_CHARS => {
                    return Ok(response.content);
                }
                Ok(_) => {
                    tracing::warn!(
                        provider = config.kind.as_str(),
                        "reply too short, trying next provider"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        provider = config.kind.as_str(),
                        error = %e,
                        "provider failed, trying next"
                    );
                }
            }
        }

        tracing::info!("all providers exhausted, using canned response");
        Ok(canned::reply_for(message).to_string())
    }
}
