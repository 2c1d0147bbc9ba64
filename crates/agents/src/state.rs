//! Per-run state for one orchestration.
//!
//! A `RunState` only ever grows. Each field has exactly one writer, and a
//! stage contributes to the state by returning a [`StateUpdate`] rather than
//! mutating it directly.

use crate::route::Route;
use concierge_core::{AppError, AppResult};

/// A single field contributed by one stage of the run.
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    /// Written by the router
    Route(Route),
    /// Written by the structured-data specialist stage
    SqlAnswer(String),
    /// Written by the policy specialist stage
    PolicyAnswer(String),
    /// Written by the synthesizer
    FinalAnswer(String),
}

impl StateUpdate {
    fn field(&self) -> &'static str {
        match self {
            Self::Route(_) => "route",
            Self::SqlAnswer(_) => "sql_answer",
            Self::PolicyAnswer(_) => "policy_answer",
            Self::FinalAnswer(_) => "final_answer",
        }
    }
}

/// Accumulated state of one `ask` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    question: String,
    route: Option<Route>,
    sql_answer: Option<String>,
    policy_answer: Option<String>,
    final_answer: Option<String>,
}

impl RunState {
    /// Start a run for `question`.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            route: None,
            sql_answer: None,
            policy_answer: None,
            final_answer: None,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn route(&self) -> Option<Route> {
        self.route
    }

    pub fn sql_answer(&self) -> Option<&str> {
        self.sql_answer.as_deref()
    }

    pub fn policy_answer(&self) -> Option<&str> {
        self.policy_answer.as_deref()
    }

    pub fn final_answer(&self) -> Option<&str> {
        self.final_answer.as_deref()
    }

    /// Add one field. Writing a field twice is an orchestration bug.
    pub fn apply(&mut self, update: StateUpdate) -> AppResult<()> {
        let already_set = match &update {
            StateUpdate::Route(_) => self.route.is_some(),
            StateUpdate::SqlAnswer(_) => self.sql_answer.is_some(),
            StateUpdate::PolicyAnswer(_) => self.policy_answer.is_some(),
            StateUpdate::FinalAnswer(_) => self.final_answer.is_some(),
        };

        if already_set {
            return Err(AppError::Agent(format!(
                "run state field '{}' written twice",
                update.field()
            )));
        }

        match update {
            StateUpdate::Route(route) => self.route = Some(route),
            StateUpdate::SqlAnswer(text) => self.sql_answer = Some(text),
            StateUpdate::PolicyAnswer(text) => self.policy_answer = Some(text),
            StateUpdate::FinalAnswer(text) => self.final_answer = Some(text),
        }

        Ok(())
    }
}
