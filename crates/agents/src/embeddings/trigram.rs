//! Offline embedder built from hashed word and character-trigram features.

use super::EmbeddingProvider;
use async_trait::async_trait;
use concierge_core::{AppError, AppResult};
use std::collections::BTreeMap;

/// Words too common to separate one policy passage from another.
const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "can", "what", "how", "does", "our", "your", "you",
];

/// Deterministic, content-dependent vectors with no model download.
///
/// Each kept word adds weight to one bucket for the whole word and one bucket
/// per character trigram, so "refund" and "refunds" land close together.
#[derive(Debug, Clone)]
pub struct TrigramEmbedder {
    dimensions: usize,
}

impl TrigramEmbedder {
    /// Embedder producing `dimensions`-wide vectors; zero is rejected.
    pub fn new(dimensions: usize) -> AppResult<Self> {
        if dimensions == 0 {
            return Err(AppError::Config(
                "embedding dimensions must be at least 1".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for (word, count) in term_counts(text) {
            let count = count as f32;

            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(&trigram, 37)] += count.sqrt();
            }

            vector[self.bucket(&word, 31)] += count;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }

        vector
    }

    fn bucket(&self, feature: &str, multiplier: u64) -> usize {
        let hash = feature
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(u64::from(b)));
        (hash % self.dimensions as u64) as usize
    }
}

/// Lower-cased words longer than two characters, minus stop words and edge punctuation.
///
/// Ordered by word so vectors accumulate in the same order on every run.
fn term_counts(text: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();

    for raw in text.split_whitespace() {
        let word = raw
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        if word.chars().count() <= 2 || STOP_WORDS.contains(&word.as_str()) {
            continue;
        }

        *counts.entry(word).or_insert(0) += 1;
    }

    counts
}

#[async_trait]
impl EmbeddingProvider for TrigramEmbedder {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        Ok(self.vectorize(text))
    }
}
