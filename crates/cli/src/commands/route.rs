//! Route command handler.

use clap::Args;
use concierge_agents::SupportService;
use concierge_core::{config::AppConfig, AppResult};

/// Classify a question without answering it
#[derive(Args, Debug)]
pub struct RouteCommand {
    /// The question to classify
    pub question: String,
}

impl RouteCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let service = SupportService::from_config(config)?;
        let route = service.route(&self.question).await?;

        println!("{}", route);
        Ok(())
    }
}
