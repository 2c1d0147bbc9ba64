//! Routing and orchestration core for the Concierge support assistant.
//!
//! A question is classified by the [`Router`], dispatched to the
//! structured-data and/or policy specialists by the [`Workflow`] state
//! machine, and merged into one answer by the [`Synthesizer`].
//!
//! # Example
//! ```no_run
//! use concierge_agents::SupportService;
//! use concierge_core::AppConfig;
//!
//! # async fn example() -> concierge_core::AppResult<()> {
//! let config = AppConfig::load()?;
//! let service = SupportService::from_config(&config)?;
//! let result = service.ask_with_meta("What tickets does John have?").await?;
//! println!("[{}] {}", result.route, result.answer);
//! # Ok(())
//! # }
//! ```

pub mod collaborators;
pub mod completion;
pub mod embeddings;
pub mod policy;
pub mod retrieval;
pub mod route;
pub mod router;
pub mod service;
pub mod specialist;
pub mod sql;
pub mod state;
pub mod store;
pub mod synthesizer;
pub mod translator;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use collaborators::{Passage, QueryTranslator, RetrievalIndex, StructuredStore};
pub use completion::CompletionModel;
pub use embeddings::{create_embedder, EmbeddingProvider};
pub use policy::{Citation, CitedContext, PolicyAgent};
pub use retrieval::SqliteRetrievalIndex;
pub use route::{normalize_route, Route};
pub use router::Router;
pub use service::{StatusReport, SupportService};
pub use specialist::{Specialist, SpecialistKind, SpecialistOutcome};
pub use sql::{clean_query, is_safe_select_query, StructuredDataAgent};
pub use state::{RunState, StateUpdate};
pub use store::SqliteStore;
pub use synthesizer::Synthesizer;
pub use translator::LlmQueryTranslator;
pub use workflow::{AskResult, Workflow, WorkflowState, FALLBACK_ANSWER};
