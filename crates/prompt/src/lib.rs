//! Prompt system for Concierge.
//!
//! This crate provides:
//! - Built-in prompt definitions for routing, SQL, policy answering and synthesis
//! - YAML overrides per workspace
//! - Handlebars template rendering

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::PromptSet;
pub use defaults::{POLICY_ANSWER, ROUTER_CLASSIFY, SQL_GENERATE, SQL_SUMMARIZE, SYNTHESIS_MERGE};
pub use loader::{list_prompts, load_prompt};
pub use types::PromptDefinition;
