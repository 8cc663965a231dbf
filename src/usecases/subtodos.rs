use tracing::{debug, instrument, warn};

use super::{TodoStore, validation};
use crate::db::{
    Database, DbError, DbResult, Id, ListResult, NewSubTodo, PageQuery, SubTodo, SubTodoPatch,
    SubTodoRepository,
};
use crate::notifier::UpdateMessage;

impl<D: Database> TodoStore<D> {
    /// Create a subtodo under `todo_id`.
    ///
    /// # Errors
    ///
    /// `DbError::Validation` for a blank title or when the todo already holds
    /// `Limits::max_subtodos_per_todo` subtodos; `DbError::Constraint` when the
    /// todo does not exist.
    #[instrument(skip(self))]
    pub async fn create_subtodo(&self, todo_id: Id, subtodo: &NewSubTodo) -> DbResult<SubTodo> {
        let subtodo = validation::new_subtodo(subtodo)?;
        let subtodos = self.db.subtodos();

        let created = match self.limits.max_subtodos_per_todo {
            Some(max) => subtodos
                .create_within_limit(todo_id, &subtodo, max)
                .await?
                .ok_or_else(|| {
                    warn!(todo_id, max, "Subtodo limit reached");
                    DbError::validation(format!("A todo can hold at most {} subtodos", max))
                })?,
            None => subtodos.create(todo_id, &subtodo).await?,
        };

        debug!(subtodo_id = created.id, todo_id, "Subtodo created");
        self.notifier.notify(UpdateMessage::SubTodoCreated {
            subtodo_id: created.id,
        });
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_subtodos(&self, query: &PageQuery) -> DbResult<ListResult<SubTodo>> {
        self.db.subtodos().list(query).await
    }

    #[instrument(skip(self))]
    pub async fn get_subtodos_by_todo(
        &self,
        todo_id: Id,
        query: &PageQuery,
    ) -> DbResult<ListResult<SubTodo>> {
        self.db.subtodos().list_by_todo(todo_id, query).await
    }

    #[instrument(skip(self))]
    pub async fn get_subtodo(&self, id: Id) -> DbResult<Option<SubTodo>> {
        self.db.subtodos().get(id).await
    }

    #[instrument(skip(self))]
    pub async fn update_subtodo(
        &self,
        id: Id,
        patch: &SubTodoPatch,
    ) -> DbResult<Option<SubTodo>> {
        let patch = validation::subtodo_patch(patch)?;
        let subtodo = self.db.subtodos().update(id, &patch).await?;

        if subtodo.is_some() {
            self.notifier
                .notify(UpdateMessage::SubTodoUpdated { subtodo_id: id });
        }
        Ok(subtodo)
    }

    #[instrument(skip(self))]
    pub async fn delete_subtodo(&self, id: Id) -> DbResult<bool> {
        let deleted = self.db.subtodos().delete(id).await?;

        if deleted {
            self.notifier
                .notify(UpdateMessage::SubTodoDeleted { subtodo_id: id });
        }
        Ok(deleted)
    }
}
