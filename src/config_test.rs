use super::config::{Limits, StoreConfig, get_data_dir};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn clear_env() {
    unsafe {
        env::remove_var("TODO_STORE_DB_PATH");
        env::remove_var("TODO_STORE_GROUP_NAME_MAX");
        env::remove_var("TODO_STORE_TODO_TITLE_MAX");
        env::remove_var("TODO_STORE_TODO_DESCRIPTION_MAX");
        env::remove_var("TODO_STORE_MAX_SUBTODOS");
    }
}

#[test]
#[serial]
fn test_config_default_db_path() {
    let config = StoreConfig::default();
    assert_eq!(config.db_path, get_data_dir().join("todo_app.db"));
    assert!(config.db_path.ends_with("todo-store/todo_app.db"));
}

#[test]
fn test_default_limits() {
    let limits = Limits::default();
    assert_eq!(limits.group_name_max, 50);
    assert_eq!(limits.todo_title_max, 30);
    assert_eq!(limits.todo_description_max, 50);
    assert_eq!(limits.max_subtodos_per_todo, Some(20));
}

#[test]
#[serial]
fn test_config_new_without_env_matches_default() {
    clear_env();
    assert_eq!(StoreConfig::new(), StoreConfig::default());
}

#[test]
#[serial]
fn test_config_new_respects_env_vars() {
    clear_env();
    unsafe {
        env::set_var("TODO_STORE_DB_PATH", "/tmp/todo-store-env/app.db");
        env::set_var("TODO_STORE_GROUP_NAME_MAX", "10");
        env::set_var("TODO_STORE_TODO_TITLE_MAX", "12");
        env::set_var("TODO_STORE_TODO_DESCRIPTION_MAX", "14");
        env::set_var("TODO_STORE_MAX_SUBTODOS", "5");
    }

    let config = StoreConfig::new();
    assert_eq!(config.db_path, PathBuf::from("/tmp/todo-store-env/app.db"));
    assert_eq!(
        config.limits,
        Limits {
            group_name_max: 10,
            todo_title_max: 12,
            todo_description_max: 14,
            max_subtodos_per_todo: Some(5),
        }
    );

    clear_env();
}

#[test]
#[serial]
fn test_zero_subtodo_cap_disables_it() {
    clear_env();
    unsafe {
        env::set_var("TODO_STORE_MAX_SUBTODOS", "0");
    }

    assert_eq!(Limits::from_env().max_subtodos_per_todo, None);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_value_falls_back_to_default() {
    clear_env();
    unsafe {
        env::set_var("TODO_STORE_GROUP_NAME_MAX", "lots");
    }

    assert_eq!(Limits::from_env().group_name_max, 50);

    clear_env();
}

#[test]
#[serial]
fn test_builder_overrides_env_var() {
    clear_env();
    unsafe {
        env::set_var("TODO_STORE_DB_PATH", "/tmp/env-todo.db");
    }

    let limits = Limits {
        max_subtodos_per_todo: None,
        ..Limits::default()
    };
    let config = StoreConfig::new()
        .with_db_path("/tmp/builder-todo.db")
        .with_limits(limits);

    assert_eq!(config.db_path, PathBuf::from("/tmp/builder-todo.db"));
    assert_eq!(config.limits, limits);

    clear_env();
}
