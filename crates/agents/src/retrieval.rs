//! SQLite-backed vector index over policy passages.

use crate::collaborators::{Passage, RetrievalIndex};
use crate::embeddings::{cosine_similarity, EmbeddingProvider};
use async_trait::async_trait;
use concierge_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Passages with their embeddings, ranked by cosine similarity at query time.
#[derive(Debug)]
pub struct SqliteRetrievalIndex {
    conn: Arc<Mutex<Connection>>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SqliteRetrievalIndex {
    /// Open (creating if needed) the index at `path`.
    pub fn open(path: &Path, embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Retrieval(format!("Failed to create index directory: {}", e))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Retrieval(format!("Failed to open policy index: {}", e)))?;

        tracing::debug!(path = %path.display(), "opened policy index");
        Self::from_connection(conn, embedder)
    }

    /// Wrap an open connection, creating the passages table if missing.
    pub fn from_connection(
        conn: Connection,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS passages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT,
                page INTEGER,
                text TEXT NOT NULL,
                embedding BLOB NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Retrieval(format!("Failed to create passages table: {}", e)))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            embedder,
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> AppResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| AppError::Retrieval("index connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| AppError::Retrieval(format!("index task failed: {}", e)))?
    }

    /// Embed and store one passage.
    pub async fn add_passage(&self, passage: &Passage) -> AppResult<()> {
        let embedding = self.embedder.embed(&passage.text).await?;
        let bytes = embedding_to_bytes(&embedding);
        let passage = passage.clone();

        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO passages (source, page, text, embedding) VALUES (?1, ?2, ?3, ?4)",
                params![passage.source, passage.page, passage.text, bytes],
            )
            .map_err(|e| AppError::Retrieval(format!("Failed to insert passage: {}", e)))?;
            Ok(())
        })
        .await
    }

    /// Number of stored passages.
    pub async fn count(&self) -> AppResult<u64> {
        self.blocking(|conn| {
            conn.query_row("SELECT COUNT(*) FROM passages", [], |row| row.get::<_, i64>(0))
                .map(|n| n.max(0) as u64)
                .map_err(|e| AppError::Retrieval(format!("Failed to count passages: {}", e)))
        })
        .await
    }
}

fn rank(conn: &Connection, query_embedding: &[f32], k: usize) -> AppResult<Vec<Passage>> {
    let mut stmt = conn
        .prepare("SELECT source, page, text, embedding FROM passages ORDER BY id")
        .map_err(|e| AppError::Retrieval(format!("Failed to prepare search: {}", e)))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                Passage {
                    source: row.get(0)?,
                    page: row.get(1)?,
                    text: row.get(2)?,
                },
                row.get::<_, Vec<u8>>(3)?,
            ))
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(|e| AppError::Retrieval(format!("Failed to read passages: {}", e)))?;

    let mut scored = Vec::with_capacity(rows.len());
    for (passage, bytes) in rows {
        let embedding = bytes_to_embedding(&bytes)?;
        scored.push((cosine_similarity(query_embedding, &embedding), passage));
    }

    // Stable sort keeps insertion order among equal scores
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);

    Ok(scored.into_iter().map(|(_, passage)| passage).collect())
}

#[async_trait]
impl RetrievalIndex for SqliteRetrievalIndex {
    async fn search(&self, query: &str, k: usize) -> AppResult<Vec<Passage>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let passages = self
            .blocking(move |conn| rank(conn, &query_embedding, k))
            .await?;

        tracing::debug!(
            provider = self.embedder.provider_name(),
            requested = k,
            returned = passages.len(),
            "searched policy index"
        );

        Ok(passages)
    }
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Retrieval(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
