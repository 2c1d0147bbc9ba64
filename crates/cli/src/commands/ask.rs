//! Ask command handler.

use clap::Args;
use concierge_agents::{AskResult, SupportService};
use concierge_core::{config::AppConfig, AppError, AppResult};

/// Ask the support assistant a question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output `{answer, route}` as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the selected route before the answer
    #[arg(long)]
    pub show_route: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Ask command options: {:?}", self);

        let service = SupportService::from_config(config)?;
        let result = service.ask_with_meta(&self.question).await?;

        println!("{}", self.render(&result)?);
        Ok(())
    }

    fn render(&self, result: &AskResult) -> AppResult<String> {
        if self.json {
            return serde_json::to_string_pretty(result).map_err(AppError::from);
        }

        if self.show_route {
            Ok(format!("Route: {}\n\n{}", result.route, result.answer))
        } else {
            Ok(result.answer.clone())
        }
    }
}
