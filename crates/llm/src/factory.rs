//! LLM provider factory.
//!
//! Builds a shared completion client from a provider name, an optional
//! endpoint override and an optional API key.

use crate::client::LlmClient;
use crate::providers::{ollama::DEFAULT_OLLAMA_URL, OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use concierge_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    tracing::debug!(provider = provider_type.as_str(), ?endpoint, "Creating LLM client");

    let key = match api_key {
        Some(key) => key,
        None if provider_type.requires_api_key() => {
            return Err(AppError::Config(format!(
                "{} provider requires API key",
                provider_label(provider_type)
            )));
        }
        None => "",
    };

    let client: Arc<dyn LlmClient> = match provider_type {
        ProviderType::Ollama => {
            Arc::new(OllamaClient::with_base_url(endpoint.unwrap_or(DEFAULT_OLLAMA_URL)))
        }
        ProviderType::OpenAI => Arc::new(match endpoint {
            Some(base_url) => OpenAiClient::with_base_url(base_url, key),
            None => OpenAiClient::new(key),
        }),
    };

    Ok(client)
}

fn provider_label(provider_type: ProviderType) -> &'static str {
    match provider_type {
        ProviderType::OpenAI => "OpenAI",
        ProviderType::Ollama => "Ollama",
    }
}
