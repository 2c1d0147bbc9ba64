//! Interfaces to the services the specialists depend on.
//!
//! The orchestration core never talks to a database or an index directly;
//! it goes through these traits so each backend can be swapped or mocked.

use async_trait::async_trait;
use concierge_core::AppResult;
use serde::{Deserialize, Serialize};

/// Turns a natural-language question into query text.
#[async_trait]
pub trait QueryTranslator: Send + Sync {
    async fn translate(&self, question: &str, schema: &str) -> AppResult<String>;
}

/// Read-only access to the relational store.
#[async_trait]
pub trait StructuredStore: Send + Sync {
    /// Table definitions shown to the query translator.
    async fn schema(&self) -> AppResult<String>;

    /// Execute one read-only query and render its rows as text.
    ///
    /// An empty result set renders as an empty string.
    async fn execute_readonly(&self, query: &str) -> AppResult<String>;

    /// Whether the store holds any customer records.
    async fn has_data(&self) -> AppResult<bool>;
}

/// One retrieved passage with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Passage text
    pub text: String,

    /// Source document identifier (usually a file path)
    pub source: Option<String>,

    /// Page number, 0-indexed as stored by the loader
    pub page: Option<u32>,
}

impl Passage {
    pub fn new(text: impl Into<String>, source: impl Into<String>, page: u32) -> Self {
        Self {
            text: text.into(),
            source: Some(source.into()),
            page: Some(page),
        }
    }
}

/// Similarity search over policy passages.
#[async_trait]
pub trait RetrievalIndex: Send + Sync {
    /// Up to `k` passages, most relevant first.
    async fn search(&self, query: &str, k: usize) -> AppResult<Vec<Passage>>;
}
