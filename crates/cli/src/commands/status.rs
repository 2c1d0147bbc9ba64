//! Status command handler.

use clap::Args;
use concierge_agents::{StatusReport, SupportService};
use concierge_core::{config::AppConfig, AppError, AppResult};

/// Show the configured provider and data sources
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let service = SupportService::from_config(config)?;
        let report = service.status().await?;

        if self.json {
            let json = serde_json::to_string_pretty(&report).map_err(AppError::from)?;
            println!("{}", json);
        } else {
            println!("{}", render(&report));
        }

        Ok(())
    }
}

fn render(report: &StatusReport) -> String {
    let database = match (report.database_present, report.database_has_data) {
        (false, _) => "missing",
        (true, false) => "present, no customer records",
        (true, true) => "ready",
    };

    format!(
        "Provider:  {} ({})\nDatabase:  {} [{}]\nIndex:     {} [{} passages, top {}]",
        report.provider,
        report.model,
        report.database_path.display(),
        database,
        report.index_path.display(),
        report.indexed_passages,
        report.top_k,
    )
}
