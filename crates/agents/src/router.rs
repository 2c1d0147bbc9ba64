//! Question classification.

use crate::completion::CompletionModel;
use crate::route::{normalize_route, Route};
use concierge_core::AppResult;
use concierge_prompt::{PromptSet, ROUTER_CLASSIFY};
use std::sync::Arc;

/// Generation cap for the classification reply, which is a single label.
pub const LABEL_MAX_TOKENS: u32 = 8;

/// Classifies a question into exactly one [`Route`] with a single completion call.
#[derive(Debug, Clone)]
pub struct Router {
    completion: CompletionModel,
    prompts: Arc<PromptSet>,
}

impl Router {
    pub fn new(completion: CompletionModel, prompts: Arc<PromptSet>) -> Self {
        Self {
            completion,
            prompts,
        }
    }

    /// Classify `question`. Unrecognized model output maps to [`Route::None`];
    /// completion failures propagate.
    pub async fn classify(&self, question: &str) -> AppResult<Route> {
        let prompt = self
            .prompts
            .render(ROUTER_CLASSIFY, &[("question", question)])?;
        let raw = self
            .completion
            .complete_capped(&prompt, LABEL_MAX_TOKENS)
            .await?;
        let route = normalize_route(&raw);

        tracing::debug!(raw = raw.trim(), %route, "classified question");
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::ScriptedLlm;
    use concierge_core::AppError;

    fn router_with(reply: &'static str) -> (Router, Arc<ScriptedLlm>) {
        let llm = ScriptedLlm::replying(move |_| Ok(reply.to_string()));
        let router = Router::new(
            CompletionModel::new(llm.clone(), "test-model"),
            Arc::new(PromptSet::default()),
        );
        (router, llm)
    }

    #[tokio::test]
    async fn test_noisy_label_is_accepted() {
        let (router, llm) = router_with("sql.");
        assert_eq!(router.classify("Show John's tickets").await.unwrap(), Route::Sql);

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("Question: Show John's tickets"));
        assert_eq!(requests[0].max_tokens, Some(LABEL_MAX_TOKENS));
    }

    #[tokio::test]
    async fn test_unknown_label_is_none() {
        let (router, _) = router_with("maybe sql");
        assert_eq!(router.classify("hm").await.unwrap(), Route::None);
    }

    #[tokio::test]
    async fn test_empty_question_is_still_classified() {
        let (router, llm) = router_with("NONE");
        assert_eq!(router.classify("   ").await.unwrap(), Route::None);
        assert_eq!(llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_completion_failure_propagates() {
        let llm = ScriptedLlm::replying(|_| Err(AppError::Llm("connection refused".into())));
        let router = Router::new(
            CompletionModel::new(llm, "test-model"),
            Arc::new(PromptSet::default()),
        );
        assert!(matches!(router.classify("q").await, Err(AppError::Llm(_))));
    }
}
