//! Final answer assembly.

use crate::completion::CompletionModel;
use crate::route::Route;
use crate::state::RunState;
use concierge_core::AppResult;
use concierge_prompt::{PromptSet, SYNTHESIS_MERGE};
use std::sync::Arc;

/// Stands in for a structured-data answer that was never produced.
pub const NO_SQL_OUTPUT: &str = "No structured data output.";

/// Stands in for a policy answer that was never produced.
pub const NO_POLICY_OUTPUT: &str = "No policy output.";

/// Produces the one final answer of a run.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    completion: CompletionModel,
    prompts: Arc<PromptSet>,
}

impl Synthesizer {
    pub fn new(completion: CompletionModel, prompts: Arc<PromptSet>) -> Self {
        Self {
            completion,
            prompts,
        }
    }

    /// Single-specialist routes pass the answer through untouched; `BOTH` and
    /// `NONE` are merged by the model. Completion failures propagate.
    pub async fn synthesize(&self, state: &RunState) -> AppResult<String> {
        let sql_answer = state.sql_answer().unwrap_or(NO_SQL_OUTPUT);
        let policy_answer = state.policy_answer().unwrap_or(NO_POLICY_OUTPUT);

        match state.route().unwrap_or_default() {
            Route::Sql => Ok(sql_answer.to_string()),
            Route::Policy => Ok(policy_answer.to_string()),
            Route::Both | Route::None => {
                let prompt = self.prompts.render(
                    SYNTHESIS_MERGE,
                    &[
                        ("question", state.question()),
                        ("sql_answer", sql_answer),
                        ("policy_answer", policy_answer),
                    ],
                )?;
                self.completion.complete(&prompt).await
            }
        }
    }
}
