//! Deterministic completion calls.

use concierge_core::AppResult;
use concierge_llm::{LlmClient, LlmRequest};
use std::sync::Arc;

/// Sampling temperature for every call the assistant makes.
pub const TEMPERATURE: f32 = 0.0;

/// A shared completion client bound to one model.
#[derive(Clone)]
pub struct CompletionModel {
    client: Arc<dyn LlmClient>,
    model: String,
}

impl CompletionModel {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Complete `prompt` at temperature 0 and return the generated text.
    pub async fn complete(&self, prompt: &str) -> AppResult<String> {
        self.send(LlmRequest::new(prompt, &self.model)).await
    }

    /// Like [`complete`](Self::complete), but stop after `max_tokens` generated tokens.
    pub async fn complete_capped(&self, prompt: &str, max_tokens: u32) -> AppResult<String> {
        self.send(LlmRequest::new(prompt, &self.model).with_max_tokens(max_tokens))
            .await
    }

    async fn send(&self, request: LlmRequest) -> AppResult<String> {
        let request = request.with_temperature(TEMPERATURE);
        let response = self.client.complete(&request).await?;

        tracing::trace!(
            provider = self.client.provider_name(),
            total_tokens = response.usage.total_tokens,
            "completion finished"
        );

        Ok(response.content)
    }
}

impl std::fmt::Debug for CompletionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionModel")
            .field("provider", &self.client.provider_name())
            .field("model", &self.model)
            .finish()
    }
}
