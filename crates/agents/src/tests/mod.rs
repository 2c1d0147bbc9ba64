//! Shared test doubles and orchestration scenarios.

pub(crate) mod support;
