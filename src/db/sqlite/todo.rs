//! SQLite TodoRepository implementation.
//!
//! Every read selects the todo columns plus two correlated counts over
//! `subtodos`, so the aggregates are always current.

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::helpers::{push_limit_offset, push_search, storage_error, to_count};
use crate::db::mapper::TodoRecord;
use crate::db::utils::{current_timestamp, flag_to_int, to_millis};
use crate::db::{
    DbResult, Id, ListResult, NewTodo, PageQuery, Todo, TodoPatch, TodoRepository,
};

const TODO_SELECT: &str = "SELECT t.id AS id, t.group_id AS group_id, t.title AS title, \
     t.description AS description, t.completed AS completed, t.done_at AS done_at, \
     t.created_at AS created_at, t.updated_at AS updated_at, \
     (SELECT COUNT(*) FROM subtodos s WHERE s.todo_id = t.id) AS total_subtodos, \
     (SELECT COUNT(*) FROM subtodos s WHERE s.todo_id = t.id AND s.completed = 1) AS completed_subtodos \
     FROM todos t";

const TODO_COUNT: &str = "SELECT COUNT(*) FROM todos t";

/// Which todos a list query covers.
#[derive(Debug, Clone, Copy)]
enum Scope {
    All,
    Group(Id),
    /// `group_id IS NULL`; SQL equality never matches NULL.
    Ungrouped,
}

impl Scope {
    /// Append the WHERE clause, returning whether one was started.
    fn push_filter(self, builder: &mut QueryBuilder<'_, Sqlite>) -> bool {
        match self {
            Scope::All => false,
            Scope::Group(group_id) => {
                builder.push(" WHERE t.group_id = ");
                builder.push_bind(group_id);
                true
            }
            Scope::Ungrouped => {
                builder.push(" WHERE t.group_id IS NULL");
                true
            }
        }
    }
}

/// SQLx-backed todo repository.
pub struct SqliteTodoRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> SqliteTodoRepository<'a> {
    async fn list_scoped(&self, scope: Scope, query: &PageQuery) -> DbResult<ListResult<Todo>> {
        let mut select = QueryBuilder::<Sqlite>::new(TODO_SELECT);
        let has_where = scope.push_filter(&mut select);
        push_search(&mut select, "t.title", query, has_where);
        select.push(" ORDER BY t.created_at DESC, t.id DESC");
        push_limit_offset(&mut select, query);

        let rows = select
            .build()
            .fetch_all(self.pool)
            .await
            .map_err(storage_error)?;
        let items = rows
            .iter()
            .map(row_to_todo)
            .collect::<DbResult<Vec<_>>>()?;

        let mut count = QueryBuilder::<Sqlite>::new(TODO_COUNT);
        let has_where = scope.push_filter(&mut count);
        push_search(&mut count, "t.title", query, has_where);
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

impl<'a> TodoRepository for SqliteTodoRepository<'a> {
    async fn list(&self, query: &PageQuery) -> DbResult<ListResult<Todo>> {
        self.list_scoped(Scope::All, query).await
    }

    async fn list_by_group(
        &self,
        group_id: Option<Id>,
        query: &PageQuery,
    ) -> DbResult<ListResult<Todo>> {
        let scope = match group_id {
            Some(id) => Scope::Group(id),
            None => Scope::Ungrouped,
        };
        self.list_scoped(scope, query).await
    }

    async fn get(&self, id: Id) -> DbResult<Option<Todo>> {
        let mut select = QueryBuilder::<Sqlite>::new(TODO_SELECT);
        select.push(" WHERE t.id = ");
        select.push_bind(id);

        let row = select
            .build()
            .fetch_optional(self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(row_to_todo).transpose()
    }

    async fn create(&self, todo: &NewTodo, group_id: Option<Id>) -> DbResult<Todo> {
        let now = to_millis(&current_timestamp());
        let completed = flag_to_int(todo.completed);
        let done_at = todo.done_at.as_ref().map(to_millis);

        let result = sqlx::query(
            r#"
            INSERT INTO todos (group_id, title, description, completed, done_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(group_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(completed)
        .bind(done_at)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(storage_error)?;

        // A new todo has no subtodos yet
        Todo::try_from(TodoRecord {
            id: result.last_insert_rowid(),
            group_id,
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed,
            done_at,
            created_at: now,
            updated_at: now,
            total_subtodos: Some(0),
            completed_subtodos: Some(0),
        })
    }

    async fn update(&self, id: Id, patch: &TodoPatch) -> DbResult<Option<Todo>> {
        let mut update = QueryBuilder::<Sqlite>::new("UPDATE todos SET updated_at = ");
        update.push_bind(to_millis(&current_timestamp()));

        if let Some(group_id) = patch.group_id.as_write() {
            update.push(", group_id = ");
            update.push_bind(group_id.copied());
        }
        if let Some(title) = &patch.title {
            update.push(", title = ");
            update.push_bind(title.clone());
        }
        if let Some(description) = patch.description.as_write() {
            update.push(", description = ");
            update.push_bind(description.cloned());
        }
        if let Some(completed) = patch.completed {
            update.push(", completed = ");
            update.push_bind(flag_to_int(completed));
        }
        if let Some(done_at) = patch.done_at.as_write() {
            update.push(", done_at = ");
            update.push_bind(done_at.map(to_millis));
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
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert a database row (with aggregate columns) to a Todo model.
fn row_to_todo(row: &SqliteRow) -> DbResult<Todo> {
    let record = TodoRecord {
        id: row.try_get("id").map_err(storage_error)?,
        group_id: row.try_get("group_id").map_err(storage_error)?,
        title: row.try_get("title").map_err(storage_error)?,
        description: row.try_get("description").map_err(storage_error)?,
        completed: row.try_get("completed").map_err(storage_error)?,
        done_at: row.try_get("done_at").map_err(storage_error)?,
        created_at: row.try_get("created_at").map_err(storage_error)?,
        updated_at: row.try_get("updated_at").map_err(storage_error)?,
        total_subtodos: row.try_get("total_subtodos").map_err(storage_error)?,
        completed_subtodos: row.try_get("completed_subtodos").map_err(storage_error)?,
    };
    Todo::try_from(record)
}
