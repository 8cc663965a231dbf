//! Domain models for the todo store.
//!
//! These models are storage-agnostic and represent the core entities
//! used throughout the application. Timestamps are UTC with millisecond
//! precision, matching what the store persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::patch::Patch;

/// Store-assigned integer identity.
pub type Id = i64;

/// Page size used when a query does not specify one.
pub const DEFAULT_LIMIT: usize = 20;

// =============================================================================
// Query Types for Pagination and Search
// =============================================================================

/// Pagination window and optional substring search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Maximum number of items to return (defaults to [`DEFAULT_LIMIT`]).
    pub limit: Option<usize>,
    /// Number of items to skip.
    pub offset: Option<usize>,
    /// Case-insensitive substring matched against the name or title.
    pub search: Option<String>,
}

impl PageQuery {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    /// The search needle, if any non-blank one was given.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Result of a paginated list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListResult<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Total count of all matching items (before pagination).
    pub total: usize,
    /// Limit that was applied.
    pub limit: usize,
    /// Offset that was applied.
    pub offset: usize,
}

// =============================================================================
// Entities
// =============================================================================

/// A named category for todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Id,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task, optionally filed under a group.
///
/// `group_id == None` places the todo in the anonymous partition.
/// The subtodo counts are computed on every read and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Id,
    pub group_id: Option<Id>,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub done_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub total_subtodos: i64,
    #[serde(default)]
    pub completed_subtodos: i64,
}

/// A checklist item owned by exactly one todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTodo {
    pub id: Id,
    pub todo_id: Id,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Create Inputs
// =============================================================================

/// Fields supplied when creating a todo. The group is passed separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub done_at: Option<DateTime<Utc>>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Fields supplied when creating a subtodo. The parent todo is passed separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewSubTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl NewSubTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
        }
    }
}

// =============================================================================
// Partial Updates
// =============================================================================

/// Partial update for a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GroupPatch {
    #[serde(default)]
    pub name: Option<String>,
}

/// Partial update for a todo.
///
/// Non-nullable columns use `Option` (absent means unchanged); nullable
/// columns use [`Patch`] so that "clear" and "leave alone" stay distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub group_id: Patch<Id>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub done_at: Patch<DateTime<Utc>>,
}

impl TodoPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// True when applying this patch would only refresh `updated_at`.
    pub fn is_empty(&self) -> bool {
        self.group_id.is_unchanged()
            && self.title.is_none()
            && self.description.is_unchanged()
            && self.completed.is_none()
            && self.done_at.is_unchanged()
    }
}

/// Partial update for a subtodo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubTodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}
