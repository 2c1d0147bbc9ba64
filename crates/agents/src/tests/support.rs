//! Scripted collaborators that record how they were called.

use crate::collaborators::{Passage, QueryTranslator, RetrievalIndex, StructuredStore};
use crate::specialist::{Specialist, SpecialistKind};
use async_trait::async_trait;
use concierge_core::{AppError, AppResult};
use concierge_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::sync::{Arc, Mutex};

type Reply = Box<dyn Fn(&str) -> AppResult<String> + Send + Sync>;

/// Completion client whose reply is computed from the prompt.
pub(crate) struct ScriptedLlm {
    reply: Reply,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn replying(reply: impl Fn(&str) -> AppResult<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.prompt).collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let content = (self.reply)(&request.prompt)?;
        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

/// Translator that always returns the same query text.
pub(crate) struct FixedTranslator {
    query: &'static str,
}

impl FixedTranslator {
    pub fn new(query: &'static str) -> Self {
        Self { query }
    }
}

#[async_trait]
impl QueryTranslator for FixedTranslator {
    async fn translate(&self, _question: &str, _schema: &str) -> AppResult<String> {
        Ok(self.query.to_string())
    }
}

/// Store that records executed queries and returns a canned result.
pub(crate) struct RecordingStore {
    result: Result<String, String>,
    executed: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn returning(result: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(result.to_string()),
            executed: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(detail: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(detail.to_string()),
            executed: Mutex::new(Vec::new()),
        })
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredStore for RecordingStore {
    async fn schema(&self) -> AppResult<String> {
        Ok("CREATE TABLE customers (id INTEGER, name TEXT)".to_string())
    }

    async fn execute_readonly(&self, query: &str) -> AppResult<String> {
        self.executed.lock().unwrap().push(query.to_string());
        self.result.clone().map_err(AppError::Database)
    }

    async fn has_data(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Index returning a fixed passage list, truncated to `k`.
pub(crate) struct FixedIndex {
    passages: Vec<Passage>,
    requested_k: Mutex<Vec<usize>>,
}

impl FixedIndex {
    pub fn new(passages: Vec<Passage>) -> Arc<Self> {
        Arc::new(Self {
            passages,
            requested_k: Mutex::new(Vec::new()),
        })
    }

    pub fn requested_k(&self) -> Vec<usize> {
        self.requested_k.lock().unwrap().clone()
    }
}

#[async_trait]
impl RetrievalIndex for FixedIndex {
    async fn search(&self, _query: &str, k: usize) -> AppResult<Vec<Passage>> {
        self.requested_k.lock().unwrap().push(k);
        Ok(self.passages.iter().take(k).cloned().collect())
    }
}

/// Ordered record of specialist invocations shared by several mocks.
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<SpecialistKind>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<SpecialistKind> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, kind: SpecialistKind) {
        self.0.lock().unwrap().push(kind);
    }
}

/// Specialist with a canned answer or failure.
pub(crate) struct MockSpecialist {
    kind: SpecialistKind,
    result: Result<String, String>,
    log: CallLog,
}

impl MockSpecialist {
    pub fn answering(kind: SpecialistKind, answer: &str, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            kind,
            result: Ok(answer.to_string()),
            log: log.clone(),
        })
    }

    pub fn failing(kind: SpecialistKind, detail: &str, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            kind,
            result: Err(detail.to_string()),
            log: log.clone(),
        })
    }
}

#[async_trait]
impl Specialist for MockSpecialist {
    fn kind(&self) -> SpecialistKind {
        self.kind
    }

    async fn answer(&self, _question: &str) -> AppResult<String> {
        self.log.push(self.kind);
        self.result.clone().map_err(AppError::Database)
    }
}
