//! SQLite SubTodoRepository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::helpers::{push_limit_offset, push_search, storage_error, to_count, to_sql_int};
use crate::db::mapper::SubTodoRecord;
use crate::db::utils::{current_timestamp, flag_to_int, to_millis};
use crate::db::{
    DbResult, Id, ListResult, NewSubTodo, PageQuery, SubTodo, SubTodoPatch, SubTodoRepository,
};

const SUBTODO_SELECT: &str =
    "SELECT id, todo_id, title, completed, created_at, updated_at FROM subtodos";

/// SQLx-backed subtodo repository.
pub struct SqliteSubTodoRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> SqliteSubTodoRepository<'a> {
    async fn list_filtered(
        &self,
        todo_id: Option<Id>,
        query: &PageQuery,
    ) -> DbResult<ListResult<SubTodo>> {
        let mut select = QueryBuilder::<Sqlite>::new(SUBTODO_SELECT);
        if let Some(todo_id) = todo_id {
            select.push(" WHERE todo_id = ");
            select.push_bind(todo_id);
        }
        push_search(&mut select, "title", query, todo_id.is_some());
        select.push(" ORDER BY created_at DESC, id DESC");
        push_limit_offset(&mut select, query);

        let rows = select
            .build()
            .fetch_all(self.pool)
            .await
            .map_err(storage_error)?;
        let items = rows
            .iter()
            .map(row_to_subtodo)
            .collect::<DbResult<Vec<_>>>()?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM subtodos");
        if let Some(todo_id) = todo_id {
            count.push(" WHERE todo_id = ");
            count.push_bind(todo_id);
        }
        push_search(&mut count, "title", query, todo_id.is_some());
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(self.pool)
            .await
            .map_err(storage_error)?;

        Ok(ListResult {
            items,
            total: to_count(total),
            limit: query.limit(),
            offset: query.offset(),
        })
    }
}

impl<'a> SubTodoRepository for SqliteSubTodoRepository<'a> {
    async fn list(&self, query: &PageQuery) -> DbResult<ListResult<SubTodo>> {
        self.list_filtered(None, query).await
    }

    async fn list_by_todo(&self, todo_id: Id, query: &PageQuery) -> DbResult<ListResult<SubTodo>> {
        self.list_filtered(Some(todo_id), query).await
    }

    async fn count_by_todo(&self, todo_id: Id) -> DbResult<usize> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subtodos WHERE todo_id = ?")
            .bind(todo_id)
            .fetch_one(self.pool)
            .await
            .map_err(storage_error)?;

        Ok(to_count(total))
    }

    async fn get(&self, id: Id) -> DbResult<Option<SubTodo>> {
        let row = sqlx::query(
            "SELECT id, todo_id, title, completed, created_at, updated_at FROM subtodos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(storage_error)?;

        row.as_ref().map(row_to_subtodo).transpose()
    }

    async fn create(&self, todo_id: Id, subtodo: &NewSubTodo) -> DbResult<SubTodo> {
        let now = to_millis(&current_timestamp());
        let completed = flag_to_int(subtodo.completed);

        let result = sqlx::query(
            "INSERT INTO subtodos (todo_id, title, completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(todo_id)
        .bind(&subtodo.title)
        .bind(completed)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(storage_error)?;

        SubTodo::try_from(SubTodoRecord {
            id: result.last_insert_rowid(),
            todo_id,
            title: subtodo.title.clone(),
            completed,
            created_at: now,
            updated_at: now,
        })
    }

    async fn create_within_limit(
        &self,
        todo_id: Id,
        subtodo: &NewSubTodo,
        max: usize,
    ) -> DbResult<Option<SubTodo>> {
        let now = to_millis(&current_timestamp());
        let completed = flag_to_int(subtodo.completed);

        let result = sqlx::query(
            "INSERT INTO subtodos (todo_id, title, completed, created_at, updated_at)
             SELECT ?, ?, ?, ?, ?
             WHERE (SELECT COUNT(*) FROM subtodos WHERE todo_id = ?) < ?",
        )
        .bind(todo_id)
        .bind(&subtodo.title)
        .bind(completed)
        .bind(now)
        .bind(now)
        .bind(todo_id)
        .bind(to_sql_int(max))
        .execute(self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        SubTodo::try_from(SubTodoRecord {
            id: result.last_insert_rowid(),
            todo_id,
            title: subtodo.title.clone(),
            completed,
            created_at: now,
            updated_at: now,
        })
        .map(Some)
    }

    async fn update(&self, id: Id, patch: &SubTodoPatch) -> DbResult<Option<SubTodo>> {
        let mut update = QueryBuilder::<Sqlite>::new("UPDATE subtodos SET updated_at = ");
        update.push_bind(to_millis(&current_timestamp()));
        if let Some(title) = &patch.title {
            update.push(", title = ");
            update.push_bind(title.clone());
        }
        if let Some(completed) = patch.completed {
            update.push(", completed = ");
            update.push_bind(flag_to_int(completed));
        }
        update.push(" WHERE id = ");
        update.push_bind(id);

        let result = update
            .build()
            .execute(self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    async fn delete(&self, id: Id) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM subtodos WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert a database row to a SubTodo model.
fn row_to_subtodo(row: &SqliteRow) -> DbResult<SubTodo> {
    let record = SubTodoRecord {
        id: row.try_get("id").map_err(storage_error)?,
        todo_id: row.try_get("todo_id").map_err(storage_error)?,
        title: row.try_get("title").map_err(storage_error)?,
        completed: row.try_get("completed").map_err(storage_error)?,
        created_at: row.try_get("created_at").map_err(storage_error)?,
        updated_at: row.try_get("updated_at").map_err(storage_error)?,
    };
    SubTodo::try_from(record)
}
