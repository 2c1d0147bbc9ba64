//! Command handlers for the Concierge CLI.

pub mod ask;
pub mod route;
pub mod status;

pub use ask::AskCommand;
pub use route::RouteCommand;
pub use status::StatusCommand;
