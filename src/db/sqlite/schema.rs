//! Schema creation and in-place upgrades.
//!
//! `initialize` is idempotent and runs on every open:
//!
//! 1. create the base tables if they are missing
//! 2. add columns introduced after the base schema (a "duplicate column"
//!    failure means the column is already there)
//! 3. rebuild `todos` if it still carries the old `ON DELETE SET NULL`
//!    group reference
//! 4. create indexes

use sqlx::{Connection, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use super::helpers::storage_error;
use crate::db::{DbError, DbResult};

const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS groups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        group_id INTEGER,
        title TEXT NOT NULL,
        description TEXT,
        completed INTEGER NOT NULL DEFAULT 0 CHECK (completed IN (0, 1)),
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS subtodos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        todo_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        completed INTEGER NOT NULL DEFAULT 0 CHECK (completed IN (0, 1)),
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        FOREIGN KEY (todo_id) REFERENCES todos(id) ON DELETE CASCADE
    )",
];

/// A column added after the base schema shipped.
struct ColumnMigration {
    table: &'static str,
    column: &'static str,
    sql: &'static str,
}

const COLUMN_MIGRATIONS: &[ColumnMigration] = &[ColumnMigration {
    table: "todos",
    column: "done_at",
    sql: "ALTER TABLE todos ADD COLUMN done_at INTEGER",
}];

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_groups_created_at ON groups(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_todos_group_id ON todos(group_id)",
    "CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_subtodos_todo_id ON subtodos(todo_id)",
];

/// Steps that move every todo into a table with the current definition.
const REBUILD_TODOS: &[&str] = &[
    "CREATE TABLE todos_rebuild (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        group_id INTEGER,
        title TEXT NOT NULL,
        description TEXT,
        completed INTEGER NOT NULL DEFAULT 0 CHECK (completed IN (0, 1)),
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        done_at INTEGER,
        FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE CASCADE
    )",
    "INSERT INTO todos_rebuild (id, group_id, title, description, completed, created_at, updated_at, done_at)
     SELECT id, group_id, title, description, completed, created_at, updated_at, done_at FROM todos",
    "DROP TABLE todos",
    "ALTER TABLE todos_rebuild RENAME TO todos",
];

/// Deletes in child-before-parent order.
const CLEAR_TABLES: &[&str] = &[
    "DELETE FROM subtodos",
    "DELETE FROM todos",
    "DELETE FROM groups",
];

fn migration_error(e: sqlx::Error) -> DbError {
    DbError::Migration {
        message: e.to_string(),
    }
}

/// Bring the schema up to date.
pub(super) async fn initialize(pool: &SqlitePool) -> DbResult<()> {
    for &statement in CREATE_TABLES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(migration_error)?;
    }

    for migration in COLUMN_MIGRATIONS {
        match sqlx::query(migration.sql).execute(pool).await {
            Ok(_) => info!(
                table = migration.table,
                column = migration.column,
                "Added column"
            ),
            Err(e) if e.to_string().contains("duplicate column name") => debug!(
                table = migration.table,
                column = migration.column,
                "Column already present"
            ),
            Err(e) => return Err(migration_error(e)),
        }
    }

    if group_delete_rule(pool).await?.as_deref() == Some("SET NULL") {
        warn!("todos.group_id still uses ON DELETE SET NULL, rebuilding table");
        rebuild_todos(pool).await?;
    }

    for &statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(migration_error)?;
    }

    debug!("Schema initialized");
    Ok(())
}

/// The `ON DELETE` action of the todos → groups foreign key.
pub(super) async fn group_delete_rule(pool: &SqlitePool) -> DbResult<Option<String>> {
    sqlx::query_scalar(
        "SELECT on_delete FROM pragma_foreign_key_list('todos') WHERE \"table\" = 'groups'",
    )
    .fetch_optional(pool)
    .await
    .map_err(migration_error)
}

async fn rebuild_todos(pool: &SqlitePool) -> DbResult<()> {
    let mut conn = pool.acquire().await.map_err(migration_error)?;

    // foreign_keys cannot change inside a transaction, so relax it first
    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(&mut *conn)
        .await
        .map_err(migration_error)?;

    let outcome = run_rebuild(&mut conn).await;

    let restore = sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await
        .map_err(migration_error);

    outcome?;
    restore?;
    info!("Rebuilt todos table with ON DELETE CASCADE");
    Ok(())
}

async fn run_rebuild(conn: &mut SqliteConnection) -> DbResult<()> {
    let mut tx = conn.begin().await.map_err(migration_error)?;
    for &statement in REBUILD_TODOS {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(migration_error)?;
    }

    // Enforcement is off, so dangling group references copied over silently.
    // Under the legacy rule they would have been nulled; do that now.
    let dangling = foreign_key_violations(&mut *tx).await?;
    if dangling > 0 {
        warn!(dangling, "Ungrouping todos that reference missing groups");
        sqlx::query(
            "UPDATE todos SET group_id = NULL
             WHERE group_id IS NOT NULL AND group_id NOT IN (SELECT id FROM groups)",
        )
        .execute(&mut *tx)
        .await
        .map_err(migration_error)?;

        let remaining = foreign_key_violations(&mut *tx).await?;
        if remaining > 0 {
            return Err(DbError::Migration {
                message: format!(
                    "todos still has {} foreign key violations after rebuild",
                    remaining
                ),
            });
        }
    }

    tx.commit().await.map_err(migration_error)
}

/// Rows of `todos` failing a foreign key check.
async fn foreign_key_violations(conn: &mut SqliteConnection) -> DbResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM pragma_foreign_key_check('todos')")
        .fetch_one(&mut *conn)
        .await
        .map_err(migration_error)
}

/// Remove every row from every table.
///
/// Foreign key enforcement is relaxed on the held connection while the
/// tables are emptied and switched back on afterwards, even on failure.
pub(super) async fn clear_all(pool: &SqlitePool) -> DbResult<()> {
    let mut conn = pool.acquire().await.map_err(storage_error)?;

    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(&mut *conn)
        .await
        .map_err(storage_error)?;

    let outcome = delete_all_rows(&mut conn).await;

    let restore = sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await
        .map_err(storage_error);

    outcome?;
    restore?;
    info!("Cleared all tables");
    Ok(())
}

async fn delete_all_rows(conn: &mut SqliteConnection) -> DbResult<()> {
    for &statement in CLEAR_TABLES {
        sqlx::query(statement)
            .execute(&mut *conn)
            .await
            .map_err(storage_error)?;
    }
    Ok(())
}
