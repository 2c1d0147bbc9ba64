//! Orchestration state machine.
//!
//! ```text
//! START -> ROUTING -> SQL_SPECIALIST ----> SYNTHESIS -> END
//!             |            | (BOTH)          ^
//!             |            v                 |
//!             +------> POLICY_SPECIALIST ----+
//!             |                              |
//!             +----------- (NONE) -----------+
//! ```
//!
//! Each state reads the accumulated [`RunState`] and contributes at most one
//! [`StateUpdate`]. Specialist errors are absorbed at the state boundary;
//! router and synthesis errors abort the run.

use crate::route::Route;
use crate::router::Router;
use crate::specialist::{Specialist, SpecialistOutcome};
use crate::state::{RunState, StateUpdate};
use crate::synthesizer::Synthesizer;
use concierge_core::AppResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

/// Returned by `ask` when a run ends without a usable final answer.
pub const FALLBACK_ANSWER: &str = "I could not generate a response.";

/// Position of a run in the orchestration graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Start,
    Routing,
    SqlSpecialist,
    PolicySpecialist,
    Synthesis,
    End,
}

impl WorkflowState {
    /// The state that follows `self` given the selected route.
    ///
    /// `route` is only consulted after routing; before that it is ignored.
    pub fn next(self, route: Route) -> Self {
        match (self, route) {
            (Self::Start, _) => Self::Routing,
            (Self::Routing, Route::Sql | Route::Both) => Self::SqlSpecialist,
            (Self::Routing, Route::Policy) => Self::PolicySpecialist,
            (Self::Routing, Route::None) => Self::Synthesis,
            (Self::SqlSpecialist, Route::Both) => Self::PolicySpecialist,
            (Self::SqlSpecialist, _) => Self::Synthesis,
            (Self::PolicySpecialist, _) => Self::Synthesis,
            (Self::Synthesis, _) | (Self::End, _) => Self::End,
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::Routing => "ROUTING",
            Self::SqlSpecialist => "SQL_SPECIALIST",
            Self::PolicySpecialist => "POLICY_SPECIALIST",
            Self::Synthesis => "SYNTHESIS",
            Self::End => "END",
        };
        f.write_str(name)
    }
}

/// Answer plus the route that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResult {
    pub answer: String,
    pub route: Route,
}

/// Runs one question through router, specialists and synthesizer.
pub struct Workflow {
    router: Router,
    sql: Arc<dyn Specialist>,
    policy: Arc<dyn Specialist>,
    synthesizer: Synthesizer,
}

impl Workflow {
    pub fn new(
        router: Router,
        sql: Arc<dyn Specialist>,
        policy: Arc<dyn Specialist>,
        synthesizer: Synthesizer,
    ) -> Self {
        Self {
            router,
            sql,
            policy,
            synthesizer,
        }
    }

    /// Answer `question`, falling back to [`FALLBACK_ANSWER`] when no path produced one.
    pub async fn ask(&self, question: &str) -> AppResult<String> {
        Ok(self.ask_with_meta(question).await?.answer)
    }

    /// Answer `question` and report the selected route.
    pub async fn ask_with_meta(&self, question: &str) -> AppResult<AskResult> {
        let state = self.run(question).await?;

        let answer = state
            .final_answer()
            .unwrap_or(FALLBACK_ANSWER)
            .to_string();

        Ok(AskResult {
            answer,
            route: state.route().unwrap_or_default(),
        })
    }

    /// Drive a fresh run to `END` and return its final state.
    pub async fn run(&self, question: &str) -> AppResult<RunState> {
        let span = tracing::info_span!("ask", question_chars = question.chars().count());
        self.drive(question).instrument(span).await
    }

    async fn drive(&self, question: &str) -> AppResult<RunState> {
        let mut state = RunState::new(question);
        let mut current = WorkflowState::Start;

        while current != WorkflowState::End {
            tracing::debug!(state = %current, "entering state");

            if let Some(update) = self.step(current, &state).await? {
                state.apply(update)?;
            }

            current = current.next(state.route().unwrap_or_default());
        }

        tracing::debug!(state = %current, "run finished");
        Ok(state)
    }

    async fn step(
        &self,
        current: WorkflowState,
        state: &RunState,
    ) -> AppResult<Option<StateUpdate>> {
        let update = match current {
            WorkflowState::Start | WorkflowState::End => None,
            WorkflowState::Routing => {
                let route = self.router.classify(state.question()).await?;
                tracing::info!(%route, "selected route");
                Some(StateUpdate::Route(route))
            }
            WorkflowState::SqlSpecialist => Some(StateUpdate::SqlAnswer(
                consult(self.sql.as_ref(), state.question()).await,
            )),
            WorkflowState::PolicySpecialist => Some(StateUpdate::PolicyAnswer(
                consult(self.policy.as_ref(), state.question()).await,
            )),
            WorkflowState::Synthesis => Some(StateUpdate::FinalAnswer(
                self.synthesizer.synthesize(state).await?,
            )),
        };

        Ok(update)
    }
}

/// Invoke a specialist, turning any error into placeholder text.
async fn consult(specialist: &dyn Specialist, question: &str) -> String {
    let kind = specialist.kind();
    let outcome = SpecialistOutcome::from_result(kind, specialist.answer(question).await);

    if let SpecialistOutcome::Failed { detail, .. } = &outcome {
        tracing::warn!(specialist = %kind, error = %detail, "specialist failed");
    }

    outcome.into_text()
}
