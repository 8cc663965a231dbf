//! Store configuration.
//!
//! Precedence: `with_*` builder > environment variable > default.

use std::env;
use std::path::PathBuf;

use tracing::warn;

const DB_PATH_VAR: &str = "TODO_STORE_DB_PATH";
const GROUP_NAME_MAX_VAR: &str = "TODO_STORE_GROUP_NAME_MAX";
const TODO_TITLE_MAX_VAR: &str = "TODO_STORE_TODO_TITLE_MAX";
const TODO_DESCRIPTION_MAX_VAR: &str = "TODO_STORE_TODO_DESCRIPTION_MAX";
const MAX_SUBTODOS_VAR: &str = "TODO_STORE_MAX_SUBTODOS";

/// Input limits enforced by the use-case layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum group name length, in characters.
    pub group_name_max: usize,
    /// Maximum todo title length, in characters.
    pub todo_title_max: usize,
    /// Maximum todo description length, in characters.
    pub todo_description_max: usize,
    /// Maximum subtodos under one todo; `None` means unlimited.
    pub max_subtodos_per_todo: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            group_name_max: 50,
            todo_title_max: 30,
            todo_description_max: 50,
            max_subtodos_per_todo: Some(20),
        }
    }
}

impl Limits {
    /// Default limits with environment overrides applied.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            group_name_max: env_usize(GROUP_NAME_MAX_VAR).unwrap_or(defaults.group_name_max),
            todo_title_max: env_usize(TODO_TITLE_MAX_VAR).unwrap_or(defaults.todo_title_max),
            todo_description_max: env_usize(TODO_DESCRIPTION_MAX_VAR)
                .unwrap_or(defaults.todo_description_max),
            max_subtodos_per_todo: match env_usize(MAX_SUBTODOS_VAR) {
                Some(0) => None,
                Some(max) => Some(max),
                None => defaults.max_subtodos_per_todo,
            },
        }
    }
}

/// Configuration for opening a [`crate::TodoStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database file
    pub db_path: PathBuf,
    pub limits: Limits,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: get_data_dir().join("todo_app.db"),
            limits: Limits::default(),
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by `TODO_STORE_*` environment variables.
    pub fn new() -> Self {
        let db_path = env::var(DB_PATH_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| get_data_dir().join("todo_app.db"));

        Self {
            db_path,
            limits: Limits::from_env(),
        }
    }

    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

/// Data directory following XDG: `$XDG_DATA_HOME/todo-store`, falling back to
/// `~/.local/share/todo-store`, then to a relative `todo-store` directory.
pub fn get_data_dir() -> PathBuf {
    let data_home = env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".local/share")))
        .unwrap_or_else(|_| PathBuf::from("."));

    data_home.join("todo-store")
}

fn env_usize(name: &str) -> Option<usize> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring non-numeric limit override");
            None
        }
    }
}
