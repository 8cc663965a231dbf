//! Mapping between storage records and domain entities.
//!
//! Records mirror the table layout: integer ids, epoch-millisecond
//! timestamps and 0/1 flags. The Todo record also carries the two
//! aggregate columns produced by read queries; they are `None` on the
//! write path.

use super::utils::{flag_from_int, flag_to_int, from_millis, to_millis};
use super::{DbError, Group, Id, SubTodo, Todo};

/// Stored shape of a group row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub id: Id,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Stored shape of a todo row, plus optional read-time aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRecord {
    pub id: Id,
    pub group_id: Option<Id>,
    pub title: String,
    pub description: Option<String>,
    pub completed: i64,
    pub done_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub total_subtodos: Option<i64>,
    pub completed_subtodos: Option<i64>,
}

/// Stored shape of a subtodo row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubTodoRecord {
    pub id: Id,
    pub todo_id: Id,
    pub title: String,
    pub completed: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<GroupRecord> for Group {
    type Error = DbError;

    fn try_from(r: GroupRecord) -> Result<Self, Self::Error> {
        Ok(Group {
            id: r.id,
            name: r.name,
            created_at: from_millis(r.created_at)?,
            updated_at: from_millis(r.updated_at)?,
        })
    }
}

impl From<&Group> for GroupRecord {
    fn from(g: &Group) -> Self {
        GroupRecord {
            id: g.id,
            name: g.name.clone(),
            created_at: to_millis(&g.created_at),
            updated_at: to_millis(&g.updated_at),
        }
    }
}

impl TryFrom<TodoRecord> for Todo {
    type Error = DbError;

    fn try_from(r: TodoRecord) -> Result<Self, Self::Error> {
        Ok(Todo {
            id: r.id,
            group_id: r.group_id,
            title: r.title,
            description: r.description,
            completed: flag_from_int(r.completed)?,
            done_at: r.done_at.map(from_millis).transpose()?,
            created_at: from_millis(r.created_at)?,
            updated_at: from_millis(r.updated_at)?,
            total_subtodos: r.total_subtodos.unwrap_or(0),
            completed_subtodos: r.completed_subtodos.unwrap_or(0),
        })
    }
}

impl From<&Todo> for TodoRecord {
    fn from(t: &Todo) -> Self {
        TodoRecord {
            id: t.id,
            group_id: t.group_id,
            title: t.title.clone(),
            description: t.description.clone(),
            completed: flag_to_int(t.completed),
            done_at: t.done_at.as_ref().map(to_millis),
            created_at: to_millis(&t.created_at),
            updated_at: to_millis(&t.updated_at),
            total_subtodos: None,
            completed_subtodos: None,
        }
    }
}

impl TryFrom<SubTodoRecord> for SubTodo {
    type Error = DbError;

    fn try_from(r: SubTodoRecord) -> Result<Self, Self::Error> {
        Ok(SubTodo {
            id: r.id,
            todo_id: r.todo_id,
            title: r.title,
            completed: flag_from_int(r.completed)?,
            created_at: from_millis(r.created_at)?,
            updated_at: from_millis(r.updated_at)?,
        })
    }
}

impl From<&SubTodo> for SubTodoRecord {
    fn from(s: &SubTodo) -> Self {
        SubTodoRecord {
            id: s.id,
            todo_id: s.todo_id,
            title: s.title.clone(),
            completed: flag_to_int(s.completed),
            created_at: to_millis(&s.created_at),
            updated_at: to_millis(&s.updated_at),
        }
    }
}
