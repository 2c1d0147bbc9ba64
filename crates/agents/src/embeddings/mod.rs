//! Text embeddings for the policy index.

pub mod ollama;
pub mod trigram;

pub use ollama::OllamaEmbedder;
pub use trigram::TrigramEmbedder;

use async_trait::async_trait;
use concierge_core::{config::EmbeddingSettings, AppError, AppResult};
use std::sync::Arc;

/// Turns text into fixed-width vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Provider name ("trigram", "ollama")
    fn provider_name(&self) -> &str;

    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Build the embedder named in `settings`.
///
/// `ollama_url` is only used by the ollama provider.
pub fn create_embedder(
    settings: &EmbeddingSettings,
    ollama_url: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if settings.dimensions == 0 {
        return Err(AppError::Config(
            "embedding dimensions must be at least 1".to_string(),
        ));
    }

    match settings.provider.as_str() {
        "trigram" => Ok(Arc::new(TrigramEmbedder::new(settings.dimensions)?)),
        "ollama" => {
            let embedder = OllamaEmbedder::new(&settings.model, settings.dimensions);
            Ok(Arc::new(match ollama_url {
                Some(url) => embedder.with_base_url(url),
                None => embedder,
            }))
        }
        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            other
        ))),
    }
}

/// Cosine similarity of two vectors; 0.0 when either is all zeros or the widths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
