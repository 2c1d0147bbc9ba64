//! SQLite-backed structured store.
//!
//! rusqlite calls block, so every query runs on tokio's blocking pool.

use crate::collaborators::StructuredStore;
use async_trait::async_trait;
use concierge_core::{AppError, AppResult};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Read-only view of the customer/ticket database.
///
/// A store built with [`SqliteStore::new`] opens its file on first use, so a
/// missing database only fails the calls that need it.
#[derive(Debug)]
pub struct SqliteStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    path: Option<PathBuf>,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Store backed by the database file at `path`, opened read-only on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_inner(Some(path.into()), None)
    }

    /// Wrap an already-open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self::from_inner(None, Some(conn))
    }

    fn from_inner(path: Option<PathBuf>, conn: Option<Connection>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                path,
                conn: Mutex::new(conn),
            }),
        }
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> AppResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.with_conn(f))
            .await
            .map_err(|e| AppError::Database(format!("store task failed: {}", e)))?
    }
}

impl StoreInner {
    fn lock(&self) -> AppResult<MutexGuard<'_, Option<Connection>>> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| AppError::Database("store connection lock poisoned".to_string()))?;

        if guard.is_none() {
            if let Some(path) = &self.path {
                let conn = Connection::open_with_flags(
                    path,
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to open database {}: {}",
                        path.display(),
                        e
                    ))
                })?;

                tracing::debug!(path = %path.display(), "opened structured store");
                *guard = Some(conn);
            }
        }

        Ok(guard)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> AppResult<T>) -> AppResult<T> {
        let guard = self.lock()?;
        let conn = guard
            .as_ref()
            .ok_or_else(|| AppError::Database("store has no connection".to_string()))?;
        f(conn)
    }
}

fn read_schema(conn: &Connection) -> AppResult<String> {
    let mut stmt = conn
        .prepare(
            "SELECT sql FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND sql IS NOT NULL \
             ORDER BY name",
        )
        .map_err(|e| AppError::Database(format!("Failed to read schema: {}", e)))?;

    let statements = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(|e| AppError::Database(format!("Failed to read schema: {}", e)))?;

    Ok(statements.join("\n\n"))
}

fn run_query(conn: &Connection, query: &str) -> AppResult<String> {
    let mut stmt = conn
        .prepare(query)
        .map_err(|e| AppError::Database(e.to_string()))?;

    if !stmt.readonly() {
        return Err(AppError::Database(
            "refusing to run a statement that writes".to_string(),
        ));
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut lines = Vec::new();
    let mut rows = stmt
        .query([])
        .map_err(|e| AppError::Database(e.to_string()))?;

    while let Some(row) = rows.next().map_err(|e| AppError::Database(e.to_string()))? {
        let mut cells = Vec::with_capacity(width);
        for index in 0..width {
            let value = row
                .get_ref(index)
                .map_err(|e| AppError::Database(e.to_string()))?;
            cells.push(render_value(value));
        }
        lines.push(cells.join(" | "));
    }

    if lines.is_empty() {
        return Ok(String::new());
    }

    lines.insert(0, columns.join(" | "));
    Ok(lines.join("\n"))
}

fn customers_exist(conn: &Connection) -> AppResult<bool> {
    let table_exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'customers')",
            [],
            |row| row.get(0),
        )
        .map_err(|e| AppError::Database(e.to_string()))?;

    if !table_exists {
        return Ok(false);
    }

    conn.query_row("SELECT EXISTS(SELECT 1 FROM customers)", [], |row| row.get(0))
        .map_err(|e| AppError::Database(e.to_string()))
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

#[async_trait]
impl StructuredStore for SqliteStore {
    async fn schema(&self) -> AppResult<String> {
        self.blocking(read_schema).await
    }

    async fn execute_readonly(&self, query: &str) -> AppResult<String> {
        let query = query.to_string();
        self.blocking(move |conn| run_query(conn, &query)).await
    }

    async fn has_data(&self) -> AppResult<bool> {
        self.blocking(customers_exist).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded() -> SqliteStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT);
            CREATE TABLE tickets (id INTEGER PRIMARY KEY, customer_id INTEGER, status TEXT, amount REAL);
            INSERT INTO customers VALUES (1, 'John Doe', NULL), (2, 'Ema Stone', 'ema@example.com');
            INSERT INTO tickets VALUES (10, 1, 'open', 12.5);
            "#,
        )
        .unwrap();
        SqliteStore::from_connection(conn)
    }

    #[tokio::test]
    async fn test_rows_render_with_header() {
        let store = seeded();
        let out = store
            .execute_readonly("SELECT id, name, email FROM customers ORDER BY id")
            .await
            .unwrap();

        assert_eq!(out, "id | name | email\n1 | John Doe | NULL\n2 | Ema Stone | ema@example.com");
    }

    #[tokio::test]
    async fn test_real_values() {
        let store = seeded();
        let out = store
            .execute_readonly("SELECT status, amount FROM tickets")
            .await
            .unwrap();
        assert_eq!(out, "status | amount\nopen | 12.5");
    }

    #[tokio::test]
    async fn test_empty_result_is_empty_string() {
        let store = seeded();
        let out = store
            .execute_readonly("SELECT * FROM tickets WHERE status = 'closed'")
            .await
            .unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_writes_are_refused() {
        let store = seeded();
        let err = store
            .execute_readonly("DELETE FROM customers")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert!(store.has_data().await.unwrap());
    }

    #[tokio::test]
    async fn test_bad_query_is_database_error() {
        let store = seeded();
        let err = store.execute_readonly("SELECT * FROM orders").await.unwrap_err();
        assert!(err.to_string().contains("no such table"));
    }

    #[tokio::test]
    async fn test_schema_lists_tables() {
        let store = seeded();
        let schema = store.schema().await.unwrap();
        assert!(schema.starts_with("CREATE TABLE customers"));
        assert!(schema.contains("CREATE TABLE tickets"));
    }

    #[tokio::test]
    async fn test_has_data_without_customers_table() {
        let store = SqliteStore::from_connection(Connection::open_in_memory().unwrap());
        assert!(!store.has_data().await.unwrap());
    }

    #[tokio::test]
    async fn test_open_is_read_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("support.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE customers (id INTEGER); INSERT INTO customers VALUES (1);")
                .unwrap();
        }

        let store = SqliteStore::new(&path);
        assert!(store.has_data().await.unwrap());

        let inserted = store.inner.with_conn(|conn| {
            conn.execute("INSERT INTO customers VALUES (2)", [])
                .map_err(|e| AppError::Database(e.to_string()))
        });
        assert!(inserted.is_err());
    }

    #[tokio::test]
    async fn test_missing_file_fails_on_use() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(dir.path().join("missing.db"));

        let err = store.schema().await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert!(!dir.path().join("missing.db").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_queries_share_one_connection() {
        let store = std::sync::Arc::new(seeded());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .execute_readonly("SELECT name FROM customers WHERE id = 1")
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "name\nJohn Doe");
        }
    }
}
