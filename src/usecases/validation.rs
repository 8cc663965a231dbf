//! Input validation applied before any storage access.

use crate::config::Limits;
use crate::db::{DbError, DbResult, GroupPatch, NewSubTodo, NewTodo, Patch, SubTodoPatch, TodoPatch};

/// Trim `value` and check it is non-empty and at most `max` characters.
fn required_text(field: &str, value: &str, max: Option<usize>) -> DbResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DbError::validation(format!("{} must not be empty", field)));
    }
    check_length(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Trim an optional text; blank becomes `None`.
fn optional_text(field: &str, value: &str, max: usize) -> DbResult<Option<String>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    check_length(field, trimmed, Some(max))?;
    Ok(Some(trimmed.to_string()))
}

fn check_length(field: &str, value: &str, max: Option<usize>) -> DbResult<()> {
    match max {
        Some(max) if value.chars().count() > max => Err(DbError::validation(format!(
            "{} must be at most {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn group_name(name: &str, limits: &Limits) -> DbResult<String> {
    required_text("Group name", name, Some(limits.group_name_max))
}

pub(crate) fn group_patch(patch: &GroupPatch, limits: &Limits) -> DbResult<GroupPatch> {
    Ok(GroupPatch {
        name: patch
            .name
            .as_deref()
            .map(|name| group_name(name, limits))
            .transpose()?,
    })
}

pub(crate) fn new_todo(todo: &NewTodo, limits: &Limits) -> DbResult<NewTodo> {
    let description = match &todo.description {
        Some(text) => optional_text("Todo description", text, limits.todo_description_max)?,
        None => None,
    };

    Ok(NewTodo {
        title: required_text("Todo title", &todo.title, Some(limits.todo_title_max))?,
        description,
        completed: todo.completed,
        done_at: todo.done_at,
    })
}

pub(crate) fn todo_patch(patch: &TodoPatch, limits: &Limits) -> DbResult<TodoPatch> {
    let title = patch
        .title
        .as_deref()
        .map(|title| required_text("Todo title", title, Some(limits.todo_title_max)))
        .transpose()?;

    let description = match &patch.description {
        Patch::Set(text) => {
            optional_text("Todo description", text, limits.todo_description_max)?.into()
        }
        other => other.clone(),
    };

    Ok(TodoPatch {
        title,
        description,
        ..patch.clone()
    })
}

pub(crate) fn new_subtodo(subtodo: &NewSubTodo) -> DbResult<NewSubTodo> {
    Ok(NewSubTodo {
        title: required_text("Subtodo title", &subtodo.title, None)?,
        completed: subtodo.completed,
    })
}

pub(crate) fn subtodo_patch(patch: &SubTodoPatch) -> DbResult<SubTodoPatch> {
    Ok(SubTodoPatch {
        title: patch
            .title
            .as_deref()
            .map(|title| required_text("Subtodo title", title, None))
            .transpose()?,
        completed: patch.completed,
    })
}
