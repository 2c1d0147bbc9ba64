//! Specialist abstraction and the outcome of invoking one.

use async_trait::async_trait;
use concierge_core::AppResult;
use std::fmt;

/// The two specialists the orchestrator can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialistKind {
    StructuredData,
    Policy,
}

impl SpecialistKind {
    /// Lead-in of the placeholder answer used when this specialist fails.
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            Self::StructuredData => "Structured data retrieval failed",
            Self::Policy => "Policy retrieval failed",
        }
    }
}

impl fmt::Display for SpecialistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuredData => f.write_str("structured-data"),
            Self::Policy => f.write_str("policy"),
        }
    }
}

/// A component that answers a question from one kind of source.
#[async_trait]
pub trait Specialist: Send + Sync {
    fn kind(&self) -> SpecialistKind;

    /// Produce an answer. Errors from backing services propagate.
    async fn answer(&self, question: &str) -> AppResult<String>;
}

/// Result of one specialist invocation, as seen by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialistOutcome {
    Answered(String),
    Failed {
        specialist: SpecialistKind,
        detail: String,
    },
}

impl SpecialistOutcome {
    /// Capture a specialist's result without letting an error escape.
    pub fn from_result(specialist: SpecialistKind, result: AppResult<String>) -> Self {
        match result {
            Ok(text) => Self::Answered(text),
            Err(err) => Self::Failed {
                specialist,
                detail: err.to_string(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Text stored in the run state: the answer, or a placeholder naming the failure.
    pub fn into_text(self) -> String {
        match self {
            Self::Answered(text) => text,
            Self::Failed { specialist, detail } => {
                format!("{}: {}", specialist.failure_prefix(), detail)
            }
        }
    }
}
