//! SQLite-backed model repository.
//!
//! Users and their model names live in two tables:
//!
//! ```text
//! users(id INTEGER PRIMARY KEY)
//! models(id INTEGER PRIMARY KEY AUTOINCREMENT, user_id, name, created_at)
//!   UNIQUE(user_id, name)
//! ```
//!
//! `rusqlite` is synchronous, so every call runs on the blocking pool.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OpenFlags, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;
use vocalis_core::UserId;
use vocalis_core::error::{Result, VocalisError};
use vocalis_core::model::ModelRepository;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS models (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_models_user_name ON models(user_id, name);
"#;

/// `ModelRepository` over a single SQLite connection.
#[derive(Clone)]
pub struct SqliteModelRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteModelRepository {
    /// Opens (creating if needed) the database at `path` and applies the
    /// schema.
    ///
    /// # Errors
    ///
    /// `DataAccess` if the file cannot be opened or the schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                VocalisError::io(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| {
            VocalisError::data_access(format!(
                "Failed to open database {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::with_connection(conn)
    }

    /// Private in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(db_error)?;
        conn.execute_batch(SCHEMA).map_err(db_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| VocalisError::internal("database connection lock poisoned"))?;
            f(&guard)
        })
        .await
        .map_err(|e| VocalisError::internal(format!("Database task failed: {}", e)))?
    }
}

fn db_error(e: rusqlite::Error) -> VocalisError {
    VocalisError::data_access(e.to_string())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[async_trait]
impl ModelRepository for SqliteModelRepository {
    async fn user_exists(&self, user_id: UserId) -> Result<bool> {
        let id = user_id.as_i64();
        self.run(move |conn| {
            conn.query_row("SELECT 1 FROM users WHERE id = ?1", params![id], |_| Ok(()))
                .optional()
                .map(|row| row.is_some())
                .map_err(db_error)
        })
        .await
    }

    async fn add_user(&self, user_id: UserId) -> Result<()> {
        let id = user_id.as_i64();
        self.run(move |conn| {
            let inserted = conn
                .execute(
                    "INSERT INTO users (id) VALUES (?1) ON CONFLICT(id) DO NOTHING",
                    params![id],
                )
                .map_err(db_error)?;
            if inserted > 0 {
                debug!(user_id = id, "Registered user");
            }
            Ok(())
        })
        .await
    }

    async fn save_model(&self, user_id: UserId, name: &str) -> Result<()> {
        let id = user_id.as_i64();
        let name = name.to_string();
        // Fixed-width timestamps so lexical order is chronological.
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        self.run(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO models (user_id, name, created_at) VALUES (?1, ?2, ?3)",
                params![id, name, created_at],
            );
            match inserted {
                Ok(_) => Ok(()),
                Err(e) if is_unique_violation(&e) => Err(VocalisError::DuplicateModelName(name)),
                Err(e) => Err(db_error(e)),
            }
        })
        .await
    }

    async fn list_models(&self, user_id: UserId) -> Result<Vec<String>> {
        let id = user_id.as_i64();
        self.run(move |conn| {
            let mut stmt = conn
                .prepare("SELECT name FROM models WHERE user_id = ?1 ORDER BY created_at, id")
                .map_err(db_error)?;
            let names = stmt
                .query_map(params![id], |row| row.get::<_, String>(0))
                .map_err(db_error)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(db_error)?;
            Ok(names)
        })
        .await
    }

    async fn count_models(&self, user_id: UserId) -> Result<usize> {
        let id = user_id.as_i64();
        self.run(move |conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM models WHERE user_id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .map_err(db_error)?;
            usize::try_from(count).map_err(|e| VocalisError::internal(e.to_string()))
        })
        .await
    }

    async fn delete_model(&self, user_id: UserId, name: &str) -> Result<()> {
        let id = user_id.as_i64();
        let name = name.to_string();
        self.run(move |conn| {
            let deleted = conn
                .execute(
                    "DELETE FROM models WHERE user_id = ?1 AND name = ?2",
                    params![id, name],
                )
                .map_err(db_error)?;
            debug!(user_id = id, model = %name, deleted, "Deleted model rows");
            Ok(())
        })
        .await
    }
}
