use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use super::{TodoStore, validation};
use crate::db::utils::current_timestamp;
use crate::db::{
    Database, DbResult, Id, ListResult, NewTodo, PageQuery, Patch, Todo, TodoPatch,
    TodoRepository,
};
use crate::notifier::UpdateMessage;

/// `done_at` change implied by moving from `was` to `now`.
fn done_at_transition(was: bool, now: bool) -> Patch<DateTime<Utc>> {
    match (was, now) {
        (false, true) => Patch::Set(current_timestamp()),
        (true, false) => Patch::Clear,
        _ => Patch::Unchanged,
    }
}

impl<D: Database> TodoStore<D> {
    /// Create a todo, optionally inside a group.
    ///
    /// A todo created as completed without a `done_at` is stamped with the
    /// current time.
    #[instrument(skip(self))]
    pub async fn create_todo(&self, todo: &NewTodo, group_id: Option<Id>) -> DbResult<Todo> {
        let mut todo = validation::new_todo(todo, &self.limits)?;
        if todo.completed && todo.done_at.is_none() {
            todo.done_at = Some(current_timestamp());
        }

        let created = self.db.todos().create(&todo, group_id).await?;

        debug!(todo_id = created.id, ?group_id, "Todo created");
        self.notifier
            .notify(UpdateMessage::TodoCreated { todo_id: created.id });
        Ok(created)
    }

    /// All todos, newest first.
    #[instrument(skip(self))]
    pub async fn get_todos(&self, query: &PageQuery) -> DbResult<ListResult<Todo>> {
        self.db.todos().list(query).await
    }

    /// Todos in one group, or the ungrouped ones when `group_id` is `None`.
    #[instrument(skip(self))]
    pub async fn get_todos_by_group(
        &self,
        group_id: Option<Id>,
        query: &PageQuery,
    ) -> DbResult<ListResult<Todo>> {
        self.db.todos().list_by_group(group_id, query).await
    }

    #[instrument(skip(self))]
    pub async fn get_todo(&self, id: Id) -> DbResult<Option<Todo>> {
        self.db.todos().get(id).await
    }

    /// Apply a partial update.
    ///
    /// When `completed` changes and the patch leaves `done_at` alone, the
    /// completion time is stamped or cleared. Writing the current state
    /// again keeps the stored `done_at`. An empty patch writes nothing and
    /// returns the stored todo.
    #[instrument(skip(self))]
    pub async fn update_todo(&self, id: Id, patch: &TodoPatch) -> DbResult<Option<Todo>> {
        let mut patch = validation::todo_patch(patch, &self.limits)?;
        let todos = self.db.todos();

        if patch.is_empty() {
            debug!(todo_id = id, "Empty patch, nothing to write");
            return todos.get(id).await;
        }

        if let Some(completed) = patch.completed
            && patch.done_at.is_unchanged()
        {
            let Some(current) = todos.get(id).await? else {
                return Ok(None);
            };
            patch.done_at = done_at_transition(current.completed, completed);
        }

        let todo = todos.update(id, &patch).await?;

        if todo.is_some() {
            self.notifier.notify(UpdateMessage::TodoUpdated { todo_id: id });
        }
        Ok(todo)
    }

    /// Mark a todo done or not done, stamping or clearing `done_at`.
    #[instrument(skip(self))]
    pub async fn set_todo_completed(&self, id: Id, completed: bool) -> DbResult<Option<Todo>> {
        let patch = TodoPatch {
            completed: Some(completed),
            ..Default::default()
        };
        self.update_todo(id, &patch).await
    }

    /// Delete a todo together with its subtodos.
    #[instrument(skip(self))]
    pub async fn delete_todo(&self, id: Id) -> DbResult<bool> {
        let deleted = self.db.todos().delete(id).await?;

        if deleted {
            self.notifier.notify(UpdateMessage::TodoDeleted { todo_id: id });
        }
        Ok(deleted)
    }
}
