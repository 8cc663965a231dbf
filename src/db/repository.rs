//! Repository traits for data access abstraction.
//!
//! These traits define the contract for data access. Reads of a missing
//! id return `None`, updates of a missing id return `None`, and deletes
//! report whether a row was removed. Storage failures are errors.

use std::future::Future;

use crate::db::{
    DbResult, Group, GroupPatch, Id, ListResult, NewSubTodo, NewTodo, PageQuery, SubTodo,
    SubTodoPatch, Todo, TodoPatch,
};

/// Repository for Group operations.
pub trait GroupRepository {
    /// List groups, oldest first.
    fn list(&self, query: &PageQuery) -> impl Future<Output = DbResult<ListResult<Group>>> + Send;

    /// Get a group by ID.
    fn get(&self, id: Id) -> impl Future<Output = DbResult<Option<Group>>> + Send;

    /// Create a new group.
    fn create(&self, name: &str) -> impl Future<Output = DbResult<Group>> + Send;

    /// Apply a partial update.
    fn update(
        &self,
        id: Id,
        patch: &GroupPatch,
    ) -> impl Future<Output = DbResult<Option<Group>>> + Send;

    /// Delete a group and, by cascade, its todos.
    fn delete(&self, id: Id) -> impl Future<Output = DbResult<bool>> + Send;
}

/// Repository for Todo operations.
///
/// Every todo returned carries fresh `total_subtodos` and
/// `completed_subtodos` counts.
pub trait TodoRepository {
    /// List all todos, newest first.
    fn list(&self, query: &PageQuery) -> impl Future<Output = DbResult<ListResult<Todo>>> + Send;

    /// List todos in a group, or the ungrouped ones when `group_id` is `None`.
    fn list_by_group(
        &self,
        group_id: Option<Id>,
        query: &PageQuery,
    ) -> impl Future<Output = DbResult<ListResult<Todo>>> + Send;

    /// Get a todo by ID.
    fn get(&self, id: Id) -> impl Future<Output = DbResult<Option<Todo>>> + Send;

    /// Create a new todo, optionally inside a group.
    fn create(
        &self,
        todo: &NewTodo,
        group_id: Option<Id>,
    ) -> impl Future<Output = DbResult<Todo>> + Send;

    /// Apply a partial update.
    fn update(&self, id: Id, patch: &TodoPatch)
    -> impl Future<Output = DbResult<Option<Todo>>> + Send;

    /// Delete a todo and, by cascade, its subtodos.
    fn delete(&self, id: Id) -> impl Future<Output = DbResult<bool>> + Send;
}

/// Repository for SubTodo operations.
pub trait SubTodoRepository {
    /// List all subtodos, newest first.
    fn list(&self, query: &PageQuery)
    -> impl Future<Output = DbResult<ListResult<SubTodo>>> + Send;

    /// List the subtodos of one todo, newest first.
    fn list_by_todo(
        &self,
        todo_id: Id,
        query: &PageQuery,
    ) -> impl Future<Output = DbResult<ListResult<SubTodo>>> + Send;

    /// Count the subtodos of one todo.
    fn count_by_todo(&self, todo_id: Id) -> impl Future<Output = DbResult<usize>> + Send;

    /// Get a subtodo by ID.
    fn get(&self, id: Id) -> impl Future<Output = DbResult<Option<SubTodo>>> + Send;

    /// Create a new subtodo under a todo.
    fn create(
        &self,
        todo_id: Id,
        subtodo: &NewSubTodo,
    ) -> impl Future<Output = DbResult<SubTodo>> + Send;

    /// Create a subtodo only if the todo holds fewer than `max` subtodos.
    ///
    /// The count and the insert are one statement. Returns `None` when the
    /// todo is already full.
    fn create_within_limit(
        &self,
        todo_id: Id,
        subtodo: &NewSubTodo,
        max: usize,
    ) -> impl Future<Output = DbResult<Option<SubTodo>>> + Send;

    /// Apply a partial update.
    fn update(
        &self,
        id: Id,
        patch: &SubTodoPatch,
    ) -> impl Future<Output = DbResult<Option<SubTodo>>> + Send;

    /// Delete a subtodo.
    fn delete(&self, id: Id) -> impl Future<Output = DbResult<bool>> + Send;
}

/// Combined database interface.
///
/// Provides access to repositories via associated types, avoiding dynamic dispatch.
pub trait Database: Send + Sync {
    type Groups<'a>: GroupRepository + Send + Sync
    where
        Self: 'a;
    type Todos<'a>: TodoRepository + Send + Sync
    where
        Self: 'a;
    type SubTodos<'a>: SubTodoRepository + Send + Sync
    where
        Self: 'a;

    /// Create missing tables and apply pending schema changes.
    fn initialize(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Delete every row from every table.
    fn reset(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Get the group repository.
    fn groups(&self) -> Self::Groups<'_>;

    /// Get the todo repository.
    fn todos(&self) -> Self::Todos<'_>;

    /// Get the subtodo repository.
    fn subtodos(&self) -> Self::SubTodos<'_>;
}
