//! Configured assistant: config in, answers out.

use crate::collaborators::StructuredStore;
use crate::completion::CompletionModel;
use crate::embeddings::create_embedder;
use crate::policy::PolicyAgent;
use crate::retrieval::SqliteRetrievalIndex;
use crate::router::Router;
use crate::sql::StructuredDataAgent;
use crate::store::SqliteStore;
use crate::synthesizer::Synthesizer;
use crate::translator::LlmQueryTranslator;
use crate::workflow::{AskResult, Workflow};
use crate::Route;
use concierge_core::{AppConfig, AppResult};
use concierge_llm::{create_client, LlmClient};
use concierge_prompt::PromptSet;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Snapshot of what the assistant is wired to.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub provider: String,
    pub model: String,
    pub database_path: PathBuf,
    pub database_present: bool,
    pub database_has_data: bool,
    pub index_path: PathBuf,
    pub indexed_passages: u64,
    pub top_k: usize,
}

/// Router, specialists and synthesizer built once and shared across questions.
pub struct SupportService {
    workflow: Workflow,
    router: Router,
    store: Arc<SqliteStore>,
    index: Arc<SqliteRetrievalIndex>,
    provider: String,
    model: String,
    database_path: PathBuf,
    index_path: PathBuf,
    top_k: usize,
}

impl SupportService {
    /// Validate `config` and build every client it names.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let endpoint = config.resolve_endpoint();
        let api_key = config.resolve_api_key(&config.provider);
        let client = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())?;

        Self::with_client(config, client)
    }

    /// Build the service around an existing completion client.
    pub fn with_client(config: &AppConfig, client: Arc<dyn LlmClient>) -> AppResult<Self> {
        let prompts = Arc::new(PromptSet::load(&config.workspace)?);
        let completion = CompletionModel::new(client, &config.model);

        let database_path = config.resolved_database_path();
        let index_path = config.resolved_index_path();

        let ollama_url = if config.provider == "ollama" {
            config.resolve_endpoint()
        } else {
            None
        };
        let embedder = create_embedder(&config.embedding, ollama_url.as_deref())?;

        let store = Arc::new(SqliteStore::new(&database_path));
        let index = Arc::new(SqliteRetrievalIndex::open(&index_path, embedder)?);

        let router = Router::new(completion.clone(), prompts.clone());
        let translator = Arc::new(LlmQueryTranslator::new(completion.clone(), prompts.clone()));
        let sql = StructuredDataAgent::new(
            completion.clone(),
            prompts.clone(),
            translator,
            store.clone(),
        );
        let policy = PolicyAgent::new(completion.clone(), prompts.clone(), index.clone())
            .with_top_k(config.top_k);
        let synthesizer = Synthesizer::new(completion, prompts);

        tracing::debug!(
            provider = %config.provider,
            model = %config.model,
            database = %database_path.display(),
            index = %index_path.display(),
            "support service ready"
        );

        Ok(Self {
            workflow: Workflow::new(router.clone(), Arc::new(sql), Arc::new(policy), synthesizer),
            router,
            store,
            index,
            provider: config.provider.clone(),
            model: config.model.clone(),
            database_path,
            index_path,
            top_k: config.top_k,
        })
    }

    pub async fn ask(&self, question: &str) -> AppResult<String> {
        self.workflow.ask(question).await
    }

    pub async fn ask_with_meta(&self, question: &str) -> AppResult<AskResult> {
        self.workflow.ask_with_meta(question).await
    }

    /// Classify without answering.
    pub async fn route(&self, question: &str) -> AppResult<Route> {
        self.router.classify(question).await
    }

    /// Whether the customer database exists and holds customers.
    pub async fn has_sql_data(&self) -> AppResult<bool> {
        if !self.database_path.exists() {
            return Ok(false);
        }
        self.store.has_data().await
    }

    pub async fn status(&self) -> AppResult<StatusReport> {
        Ok(StatusReport {
            provider: self.provider.clone(),
            model: self.model.clone(),
            database_path: self.database_path.clone(),
            database_present: self.database_path.exists(),
            database_has_data: self.has_sql_data().await?,
            index_path: self.index_path.clone(),
            indexed_passages: self.index.count().await?,
            top_k: self.top_k,
        })
    }

    /// The policy index, for loading passages.
    pub fn index(&self) -> &SqliteRetrievalIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::Passage;
    use crate::tests::support::ScriptedLlm;
    use concierge_core::AppError;
    use rusqlite::Connection;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> AppConfig {
        AppConfig {
            workspace: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    fn seed_database(config: &AppConfig) {
        let path = config.resolved_database_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT);
            CREATE TABLE tickets (id INTEGER PRIMARY KEY, customer_id INTEGER, status TEXT);
            INSERT INTO customers VALUES (1, 'John Doe');
            INSERT INTO tickets VALUES (7, 1, 'open');
            "#,
        )
        .unwrap();
    }

    #[test]
    fn test_from_config_rejects_unknown_provider() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            provider: "bard".to_string(),
            ..config_in(&dir)
        };
        assert!(matches!(
            SupportService::from_config(&config),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_status_without_database() {
        let dir = TempDir::new().unwrap();
        let service = SupportService::from_config(&config_in(&dir)).unwrap();

        let status = service.status().await.unwrap();
        assert!(!status.database_present);
        assert!(!status.database_has_data);
        assert_eq!(status.indexed_passages, 0);
        assert_eq!(status.top_k, 4);
        assert!(!service.has_sql_data().await.unwrap());
    }

    #[tokio::test]
    async fn test_sql_question_end_to_end() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        seed_database(&config);

        let llm = ScriptedLlm::replying(|prompt| {
            if prompt.contains("Return only one label") {
                Ok("SQL".to_string())
            } else if prompt.contains("SQLQuery:") {
                Ok("SELECT id, status FROM tickets WHERE customer_id = 1;".to_string())
            } else {
                Ok("John Doe has one open ticket (#7).".to_string())
            }
        });
        let service = SupportService::with_client(&config, llm.clone()).unwrap();

        assert!(service.has_sql_data().await.unwrap());
        let result = service.ask_with_meta("What tickets does John have?").await.unwrap();

        assert_eq!(result.route, Route::Sql);
        assert_eq!(result.answer, "John Doe has one open ticket (#7).");
        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[2].contains("SQL Result: id | status\n7 | open"));
    }

    #[tokio::test]
    async fn test_policy_question_end_to_end() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let llm = ScriptedLlm::replying(|prompt| {
            if prompt.contains("Return only one label") {
                Ok("POLICY".to_string())
            } else {
                Ok("Refunds are issued within 30 days [C1].".to_string())
            }
        });
        let service = SupportService::with_client(&config, llm).unwrap();
        service
            .index()
            .add_passage(&Passage::new(
                "Refunds are issued within 30 days of purchase.",
                "policies/refund_policy.pdf",
                0,
            ))
            .await
            .unwrap();

        let answer = service.ask("What is the refund policy?").await.unwrap();

        assert_eq!(
            answer,
            "Refunds are issued within 30 days [C1].\n\nSources:\n[C1] refund_policy.pdf, page 1"
        );
        assert_eq!(service.status().await.unwrap().indexed_passages, 1);
    }

    #[tokio::test]
    async fn test_route_only() {
        let dir = TempDir::new().unwrap();
        let llm = ScriptedLlm::replying(|_| Ok("both".to_string()));
        let service = SupportService::with_client(&config_in(&dir), llm.clone()).unwrap();

        assert_eq!(service.route("Can John get a refund?").await.unwrap(), Route::Both);
        assert_eq!(llm.prompts().len(), 1);
    }
}
