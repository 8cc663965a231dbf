//! SQLite database connection and schema management.

use std::path::Path;
use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;

use super::group::SqliteGroupRepository;
use super::schema;
use super::subtodo::SqliteSubTodoRepository;
use super::todo::SqliteTodoRepository;
use crate::db::{Database, DbError, DbResult};

/// SQLite database implementation.
///
/// The pool holds a single connection: storage operations never run
/// concurrently, and an in-memory database lives as long as the pool.
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (or create) a database file at the given path.
    pub async fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        debug!(path = %path.as_ref().display(), "Opening database");
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        Self::connect(options).await
    }

    /// Create an in-memory database (useful for testing).
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?
            .foreign_keys(true);
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> DbResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;
        Ok(Self { pool })
    }

    /// Direct pool access for tests and advanced operations.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for the connection to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl Database for SqliteDatabase {
    type Groups<'a> = SqliteGroupRepository<'a>;
    type Todos<'a> = SqliteTodoRepository<'a>;
    type SubTodos<'a> = SqliteSubTodoRepository<'a>;

    async fn initialize(&self) -> DbResult<()> {
        schema::initialize(&self.pool).await
    }

    async fn reset(&self) -> DbResult<()> {
        schema::clear_all(&self.pool).await
    }

    fn groups(&self) -> Self::Groups<'_> {
        SqliteGroupRepository { pool: &self.pool }
    }

    fn todos(&self) -> Self::Todos<'_> {
        SqliteTodoRepository { pool: &self.pool }
    }

    fn subtodos(&self) -> Self::SubTodos<'_> {
        SqliteSubTodoRepository { pool: &self.pool }
    }
}
