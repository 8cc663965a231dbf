//! Tests for TodoStore: validation, limits and change notifications.

use std::time::Duration;

use tempfile::TempDir;

use super::TodoStore;
use crate::config::{Limits, StoreConfig};
use crate::db::{
    DbError, GroupPatch, NewSubTodo, NewTodo, PageQuery, Patch, SqliteDatabase,
    SubTodoPatch, TodoPatch,
};
use crate::notifier::{ChangeNotifier, UpdateMessage};

async fn setup_store(limits: Limits) -> TodoStore<SqliteDatabase> {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    let store = TodoStore::new(db, limits, ChangeNotifier::new());
    store.initialize().await.expect("Initialize should succeed");
    store
}

#[tokio::test(flavor = "multi_thread")]
async fn create_group_stores_trimmed_name() {
    let store = setup_store(Limits::default()).await;
    let group = store.create_group("  Work ").await.unwrap();
    assert_eq!(group.name, "Work");
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_group_names_never_reach_storage() {
    let store = setup_store(Limits::default()).await;

    assert!(store.create_group("").await.unwrap_err().is_validation());
    assert!(
        store
            .create_group(&"x".repeat(51))
            .await
            .unwrap_err()
            .is_validation()
    );

    let groups = store.get_groups(&PageQuery::default()).await.unwrap();
    assert_eq!(groups.total, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_group_validates_new_name() {
    let store = setup_store(Limits::default()).await;
    let group = store.create_group("Work").await.unwrap();

    let err = store
        .update_group(
            group.id,
            &GroupPatch {
                name: Some("  ".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let renamed = store
        .update_group(
            group.id,
            &GroupPatch {
                name: Some(" Office ".to_string()),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "Office");
}

#[tokio::test(flavor = "multi_thread")]
async fn twenty_first_subtodo_is_rejected() {
    let store = setup_store(Limits::default()).await;
    let todo = store.create_todo(&NewTodo::new("Big job"), None).await.unwrap();

    for i in 0..20 {
        store
            .create_subtodo(todo.id, &NewSubTodo::new(format!("Step {}", i)))
            .await
            .unwrap();
    }

    let err = store
        .create_subtodo(todo.id, &NewSubTodo::new("One too many"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));

    let existing = store
        .get_subtodos_by_todo(todo.id, &PageQuery::new(50, 0))
        .await
        .unwrap();
    assert_eq!(existing.total, 20);
    assert!(existing.items.iter().all(|s| s.title.starts_with("Step ")));

    let todo = store.get_todo(todo.id).await.unwrap().unwrap();
    assert_eq!(todo.total_subtodos, 20);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_creates_respect_the_subtodo_cap() {
    let store = setup_store(Limits::default()).await;
    let todo = store.create_todo(&NewTodo::new("Big job"), None).await.unwrap();

    for i in 0..19 {
        store
            .create_subtodo(todo.id, &NewSubTodo::new(format!("Step {}", i)))
            .await
            .unwrap();
    }

    let first = NewSubTodo::new("Racer one");
    let second = NewSubTodo::new("Racer two");
    let (a, b) = tokio::join!(
        store.create_subtodo(todo.id, &first),
        store.create_subtodo(todo.id, &second)
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1, "{:?} {:?}", a, b);
    let rejected = if a.is_err() { a } else { b };
    assert!(rejected.unwrap_err().is_validation());

    let todo = store.get_todo(todo.id).await.unwrap().unwrap();
    assert_eq!(todo.total_subtodos, 20);
}

#[tokio::test(flavor = "multi_thread")]
async fn subtodo_cap_can_be_disabled() {
    let limits = Limits {
        max_subtodos_per_todo: None,
        ..Limits::default()
    };
    let store = setup_store(limits).await;
    let todo = store.create_todo(&NewTodo::new("Big job"), None).await.unwrap();

    for i in 0..25 {
        store
            .create_subtodo(todo.id, &NewSubTodo::new(format!("Step {}", i)))
            .await
            .unwrap();
    }
    let todo = store.get_todo(todo.id).await.unwrap().unwrap();
    assert_eq!(todo.total_subtodos, 25);
}

#[tokio::test(flavor = "multi_thread")]
async fn subtodo_for_missing_todo_is_a_constraint_error() {
    let store = setup_store(Limits::default()).await;
    let err = store
        .create_subtodo(999, &NewSubTodo::new("Dangling"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Constraint { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn todo_title_limit_is_enforced() {
    let store = setup_store(Limits::default()).await;
    let err = store
        .create_todo(&NewTodo::new("t".repeat(31)), None)
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let todo = store.create_todo(&NewTodo::new("ok"), None).await.unwrap();
    let err = store
        .update_todo(todo.id, &TodoPatch::title(""))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test(flavor = "multi_thread")]
async fn set_todo_completed_stamps_and_clears_done_at() {
    let store = setup_store(Limits::default()).await;
    let work = store.create_group("Work").await.unwrap();
    let todo = store
        .create_todo(&NewTodo::new("Buy milk"), Some(work.id))
        .await
        .unwrap();

    let done = store.set_todo_completed(todo.id, true).await.unwrap().unwrap();
    assert!(done.completed);
    assert!(done.done_at.is_some());

    let undone = store
        .set_todo_completed(todo.id, false)
        .await
        .unwrap()
        .unwrap();
    assert!(!undone.completed);
    assert!(undone.done_at.is_none());

    assert!(store.set_todo_completed(12345, true).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn completing_again_keeps_original_done_at() {
    let store = setup_store(Limits::default()).await;
    let todo = store.create_todo(&NewTodo::new("Report"), None).await.unwrap();

    let first = store.set_todo_completed(todo.id, true).await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let edited = store
        .update_todo(
            todo.id,
            &TodoPatch {
                title: Some("Report v2".to_string()),
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(edited.title, "Report v2");
    assert_eq!(edited.done_at, first.done_at);

    let again = store.set_todo_completed(todo.id, true).await.unwrap().unwrap();
    assert_eq!(again.done_at, first.done_at);
}

#[tokio::test(flavor = "multi_thread")]
async fn reopening_an_open_todo_leaves_done_at_empty() {
    let store = setup_store(Limits::default()).await;
    let todo = store.create_todo(&NewTodo::new("Open"), None).await.unwrap();

    let still_open = store
        .set_todo_completed(todo.id, false)
        .await
        .unwrap()
        .unwrap();
    assert!(!still_open.completed);
    assert!(still_open.done_at.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_todo_patch_writes_nothing() {
    let store = setup_store(Limits::default()).await;
    let todo = store.create_todo(&NewTodo::new("Idle"), None).await.unwrap();
    let mut rx = store.subscribe();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let same = store
        .update_todo(todo.id, &TodoPatch::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(same, todo);
    assert!(rx.try_recv().is_err());

    assert!(
        store
            .update_todo(404, &TodoPatch::default())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn create_completed_todo_gets_done_at() {
    let store = setup_store(Limits::default()).await;
    let todo = store
        .create_todo(
            &NewTodo {
                completed: true,
                ..NewTodo::new("Already done")
            },
            None,
        )
        .await
        .unwrap();
    assert!(todo.done_at.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn mutations_broadcast_notifications() {
    let store = setup_store(Limits::default()).await;
    let mut rx = store.subscribe();

    let group = store.create_group("Work").await.unwrap();
    let todo = store
        .create_todo(&NewTodo::new("Task"), Some(group.id))
        .await
        .unwrap();
    let sub = store
        .create_subtodo(todo.id, &NewSubTodo::new("Step"))
        .await
        .unwrap();
    store
        .update_subtodo(
            sub.id,
            &SubTodoPatch {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    store
        .update_todo(
            todo.id,
            &TodoPatch {
                description: Patch::Set("details".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    store.delete_subtodo(sub.id).await.unwrap();
    store.delete_todo(todo.id).await.unwrap();
    store.delete_group(group.id).await.unwrap();

    let expected = [
        UpdateMessage::GroupCreated { group_id: group.id },
        UpdateMessage::TodoCreated { todo_id: todo.id },
        UpdateMessage::SubTodoCreated { subtodo_id: sub.id },
        UpdateMessage::SubTodoUpdated { subtodo_id: sub.id },
        UpdateMessage::TodoUpdated { todo_id: todo.id },
        UpdateMessage::SubTodoDeleted { subtodo_id: sub.id },
        UpdateMessage::TodoDeleted { todo_id: todo.id },
        UpdateMessage::GroupDeleted { group_id: group.id },
    ];
    for msg in expected {
        assert_eq!(rx.recv().await.unwrap(), msg);
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn missed_updates_and_failed_validation_are_silent() {
    let store = setup_store(Limits::default()).await;
    let mut rx = store.subscribe();

    assert!(!store.delete_group(77).await.unwrap());
    assert!(store.update_todo(77, &TodoPatch::title("x")).await.unwrap().is_none());
    assert!(store.create_group("").await.is_err());

    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn reset_clears_everything_and_notifies() {
    let store = setup_store(Limits::default()).await;
    let group = store.create_group("Work").await.unwrap();
    let todo = store
        .create_todo(&NewTodo::new("Task"), Some(group.id))
        .await
        .unwrap();
    store
        .create_subtodo(todo.id, &NewSubTodo::new("Step"))
        .await
        .unwrap();

    let mut rx = store.subscribe();
    store.reset().await.unwrap();

    assert_eq!(rx.recv().await.unwrap(), UpdateMessage::StoreCleared);
    assert_eq!(store.get_groups(&PageQuery::default()).await.unwrap().total, 0);
    assert_eq!(store.get_todos(&PageQuery::default()).await.unwrap().total, 0);
    assert_eq!(
        store.get_subtodos(&PageQuery::default()).await.unwrap().total,
        0
    );

    // Store is usable after a reset
    store.create_group("Fresh").await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn clones_share_database_and_notifier() {
    let store = setup_store(Limits::default()).await;
    let clone = store.clone();
    let mut rx = store.subscribe();

    let group = clone.create_group("Shared").await.unwrap();
    assert!(store.get_group(group.id).await.unwrap().is_some());
    assert_eq!(
        rx.recv().await.unwrap(),
        UpdateMessage::GroupCreated { group_id: group.id }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn open_creates_directories_and_persists() {
    let temp = TempDir::new().unwrap();
    let config = StoreConfig::default().with_db_path(temp.path().join("nested/dir/todo_app.db"));

    {
        let store = TodoStore::open(&config).await.unwrap();
        store.create_group("Kept").await.unwrap();
        store.db().close().await;
    }

    let store = TodoStore::open(&config).await.unwrap();
    let groups = store.get_groups(&PageQuery::default()).await.unwrap();
    assert_eq!(groups.items.len(), 1);
    assert_eq!(groups.items[0].name, "Kept");
}
