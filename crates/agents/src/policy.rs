//! Policy specialist.
//!
//! Answers strictly from retrieved policy passages. Each distinct
//! (document, page) pair in one result set gets a short tag (`C1`, `C2`, ...)
//! that the model is asked to cite inline, and the answer is followed by a
//! `Sources:` list resolving every tag.

use crate::collaborators::{Passage, RetrievalIndex};
use crate::completion::CompletionModel;
use crate::specialist::{Specialist, SpecialistKind};
use async_trait::async_trait;
use concierge_core::AppResult;
use concierge_prompt::{PromptSet, POLICY_ANSWER};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Passages retrieved per question unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 4;

/// Context used when retrieval returns nothing.
pub const NO_CONTEXT_MESSAGE: &str = "No relevant policy content found.";

const UNKNOWN_SOURCE: &str = "unknown_source";
const UNKNOWN_PAGE: &str = "unknown";

/// One distinct (document, page) reference within a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    /// Tag such as `C1`
    pub tag: String,
    /// Document file name
    pub source: String,
    /// 1-indexed page, or `unknown`
    pub page: String,
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}, page {}", self.tag, self.source, self.page)
    }
}

/// Tagged context block plus the citations it references.
#[derive(Debug, Clone, PartialEq)]
pub struct CitedContext {
    pub context: String,
    pub citations: Vec<Citation>,
}

impl CitedContext {
    /// Tag passages in retrieval order, reusing a tag for a repeated (source, page).
    pub fn from_passages(passages: &[Passage]) -> Self {
        if passages.is_empty() {
            return Self {
                context: NO_CONTEXT_MESSAGE.to_string(),
                citations: Vec::new(),
            };
        }

        let mut tags: HashMap<(String, String), usize> = HashMap::new();
        let mut citations: Vec<Citation> = Vec::new();
        let mut blocks = Vec::with_capacity(passages.len());

        for passage in passages {
            let source = display_source(passage.source.as_deref());
            let page = display_page(passage.page);

            let index = *tags
                .entry((source.clone(), page.clone()))
                .or_insert_with(|| {
                    citations.push(Citation {
                        tag: format!("C{}", citations.len() + 1),
                        source: source.clone(),
                        page: page.clone(),
                    });
                    citations.len() - 1
                });

            let citation = &citations[index];
            blocks.push(format!(
                "[{}] Source: {}, page {}\n{}",
                citation.tag, citation.source, citation.page, passage.text
            ));
        }

        Self {
            context: blocks.join("\n\n"),
            citations,
        }
    }

    /// Append a `Sources:` section, or return `answer` untouched when nothing was cited.
    pub fn annotate(&self, answer: String) -> String {
        if self.citations.is_empty() {
            return answer;
        }

        let sources = self
            .citations
            .iter()
            .map(Citation::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        format!("{}\n\nSources:\n{}", answer, sources)
    }
}

/// File name of a source path, `unknown_source` when absent.
fn display_source(source: Option<&str>) -> String {
    match source {
        Some(source) => Path::new(source)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string()),
        None => UNKNOWN_SOURCE.to_string(),
    }
}

/// 1-indexed page for display.
fn display_page(page: Option<u32>) -> String {
    match page {
        Some(page) => (u64::from(page) + 1).to_string(),
        None => UNKNOWN_PAGE.to_string(),
    }
}

/// Answers policy questions from the document index with citations.
pub struct PolicyAgent {
    completion: CompletionModel,
    prompts: Arc<PromptSet>,
    index: Arc<dyn RetrievalIndex>,
    top_k: usize,
}

impl PolicyAgent {
    pub fn new(
        completion: CompletionModel,
        prompts: Arc<PromptSet>,
        index: Arc<dyn RetrievalIndex>,
    ) -> Self {
        Self {
            completion,
            prompts,
            index,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

#[async_trait]
impl Specialist for PolicyAgent {
    fn kind(&self) -> SpecialistKind {
        SpecialistKind::Policy
    }

    async fn answer(&self, question: &str) -> AppResult<String> {
        let passages = self.index.search(question, self.top_k).await?;
        let cited = CitedContext::from_passages(&passages);

        tracing::debug!(
            passages = passages.len(),
            citations = cited.citations.len(),
            "assembled policy context"
        );

        let prompt = self.prompts.render(
            POLICY_ANSWER,
            &[("question", question), ("context", &cited.context)],
        )?;
        let answer = self.completion.complete(&prompt).await?;

        Ok(cited.annotate(answer))
    }
}
