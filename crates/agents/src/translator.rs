//! Natural-language to SQL translation backed by the completion service.

use crate::collaborators::QueryTranslator;
use crate::completion::CompletionModel;
use async_trait::async_trait;
use concierge_core::AppResult;
use concierge_prompt::{PromptSet, SQL_GENERATE};
use std::sync::Arc;

/// Row limit suggested to the model when the question names none.
pub const DEFAULT_ROW_LIMIT: usize = 5;

/// Asks the model for a SQLite query. The raw completion is returned as-is;
/// cleaning and the safety gate happen in the specialist.
#[derive(Debug, Clone)]
pub struct LlmQueryTranslator {
    completion: CompletionModel,
    prompts: Arc<PromptSet>,
    row_limit: usize,
}

impl LlmQueryTranslator {
    pub fn new(completion: CompletionModel, prompts: Arc<PromptSet>) -> Self {
        Self {
            completion,
            prompts,
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

#[async_trait]
impl QueryTranslator for LlmQueryTranslator {
    async fn translate(&self, question: &str, schema: &str) -> AppResult<String> {
        let top_k = self.row_limit.to_string();
        let prompt = self.prompts.render(
            SQL_GENERATE,
            &[("question", question), ("schema", schema), ("top_k", &top_k)],
        )?;

        self.completion.complete(&prompt).await
    }
}
