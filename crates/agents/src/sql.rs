//! Structured-data specialist.
//!
//! Generated SQL passes through a syntactic allow/deny filter before it is
//! executed. The filter is a string heuristic, not a parser: comments, unusual
//! whitespace or quoted literals can defeat it, so the store connection is
//! additionally opened read-only.

use crate::collaborators::{QueryTranslator, StructuredStore};
use crate::completion::CompletionModel;
use crate::specialist::{Specialist, SpecialistKind};
use async_trait::async_trait;
use concierge_core::AppResult;
use concierge_prompt::{PromptSet, SQL_SUMMARIZE};
use std::sync::Arc;

/// Returned instead of executing a query that fails the safety gate.
pub const BLOCKED_QUERY_MESSAGE: &str =
    "Blocked potentially unsafe SQL. Please ask a read-only customer/ticket query.";

/// The only statement keyword a query may start with.
const READ_ONLY_KEYWORD: &str = "SELECT";

/// Mutating or DDL keywords, each with a trailing space so `UPDATED_AT` and
/// similar identifiers do not match.
const BLOCKED_TOKENS: [&str; 8] = [
    "INSERT ",
    "UPDATE ",
    "DELETE ",
    "DROP ",
    "ALTER ",
    "TRUNCATE ",
    "CREATE ",
    "ATTACH ",
];

/// Strip fences and commentary from generated query text.
///
/// Everything before the first case-insensitive `SELECT` is discarded and a
/// single trailing `;` is removed.
pub fn clean_query(raw: &str) -> String {
    let unfenced = raw.trim().replace("```sql", "").replace("```", "");
    let query = unfenced.trim();

    // ASCII upper-casing keeps byte offsets aligned with `query`
    let query = match query.to_ascii_uppercase().find(READ_ONLY_KEYWORD) {
        Some(start) => query[start..].trim(),
        None => query,
    };

    query.strip_suffix(';').unwrap_or(query).to_string()
}

/// Whether a cleaned query may be executed.
///
/// Rejects statement separators, anything not starting with `SELECT`, and any
/// blocked keyword. Pure function of the normalized text.
pub fn is_safe_select_query(query: &str) -> bool {
    let normalized = query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    if normalized.contains(';') {
        return false;
    }

    if !normalized.starts_with(READ_ONLY_KEYWORD) {
        return false;
    }

    !BLOCKED_TOKENS
        .iter()
        .any(|token| normalized.contains(token))
}

/// Answers questions about customers, accounts and tickets from the relational store.
pub struct StructuredDataAgent {
    completion: CompletionModel,
    prompts: Arc<PromptSet>,
    translator: Arc<dyn QueryTranslator>,
    store: Arc<dyn StructuredStore>,
}

impl StructuredDataAgent {
    pub fn new(
        completion: CompletionModel,
        prompts: Arc<PromptSet>,
        translator: Arc<dyn QueryTranslator>,
        store: Arc<dyn StructuredStore>,
    ) -> Self {
        Self {
            completion,
            prompts,
            translator,
            store,
        }
    }
}

#[async_trait]
impl Specialist for StructuredDataAgent {
    fn kind(&self) -> SpecialistKind {
        SpecialistKind::StructuredData
    }

    async fn answer(&self, question: &str) -> AppResult<String> {
        let schema = self.store.schema().await?;
        let raw_query = self.translator.translate(question, &schema).await?;
        let sql_query = clean_query(&raw_query);

        if !is_safe_select_query(&sql_query) {
            tracing::warn!(query = %sql_query, "blocked generated query");
            return Ok(BLOCKED_QUERY_MESSAGE.to_string());
        }

        tracing::debug!(query = %sql_query, "executing generated query");
        let sql_result = self.store.execute_readonly(&sql_query).await?;

        let prompt = self.prompts.render(
            SQL_SUMMARIZE,
            &[
                ("question", question),
                ("sql_query", &sql_query),
                ("sql_result", &sql_result),
            ],
        )?;

        self.completion.complete(&prompt).await
    }
}
