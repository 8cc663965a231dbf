//! SQLite GroupRepository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::helpers::{push_limit_offset, push_search, storage_error, to_count};
use crate::db::mapper::GroupRecord;
use crate::db::utils::{current_timestamp, to_millis};
use crate::db::{DbResult, Group, GroupPatch, GroupRepository, Id, ListResult, PageQuery};

const GROUP_SELECT: &str = "SELECT id, name, created_at, updated_at FROM groups";

/// SQLx-backed group repository.
pub struct SqliteGroupRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> GroupRepository for SqliteGroupRepository<'a> {
    async fn list(&self, query: &PageQuery) -> DbResult<ListResult<Group>> {
        let mut select = QueryBuilder::<Sqlite>::new(GROUP_SELECT);
        push_search(&mut select, "name", query, false);
        select.push(" ORDER BY created_at ASC, id ASC");
        push_limit_offset(&mut select, query);

        let rows = select
            .build()
            .fetch_all(self.pool)
            .await
            .map_err(storage_error)?;
        let items = rows
            .iter()
            .map(row_to_group)
            .collect::<DbResult<Vec<_>>>()?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM groups");
        push_search(&mut count, "name", query, false);
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

    async fn get(&self, id: Id) -> DbResult<Option<Group>> {
        let row = sqlx::query("SELECT id, name, created_at, updated_at FROM groups WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(row_to_group).transpose()
    }

    async fn create(&self, name: &str) -> DbResult<Group> {
        let now = to_millis(&current_timestamp());

        let result =
            sqlx::query("INSERT INTO groups (name, created_at, updated_at) VALUES (?, ?, ?)")
                .bind(name)
                .bind(now)
                .bind(now)
                .execute(self.pool)
                .await
                .map_err(storage_error)?;

        Group::try_from(GroupRecord {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(&self, id: Id, patch: &GroupPatch) -> DbResult<Option<Group>> {
        let mut update = QueryBuilder::<Sqlite>::new("UPDATE groups SET updated_at = ");
        update.push_bind(to_millis(&current_timestamp()));
        if let Some(name) = &patch.name {
            update.push(", name = ");
            update.push_bind(name.clone());
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
        let result = sqlx::query("DELETE FROM groups WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert a database row to a Group model.
fn row_to_group(row: &SqliteRow) -> DbResult<Group> {
    let record = GroupRecord {
        id: row.try_get("id").map_err(storage_error)?,
        name: row.try_get("name").map_err(storage_error)?,
        created_at: row.try_get("created_at").map_err(storage_error)?,
        updated_at: row.try_get("updated_at").map_err(storage_error)?,
    };
    Group::try_from(record)
}
