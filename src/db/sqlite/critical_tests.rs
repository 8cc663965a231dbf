//! Critical integration tests for relationship handling.

use crate::db::utils::current_timestamp;
use crate::db::{
    Database, GroupPatch, GroupRepository, NewSubTodo, NewTodo, PageQuery, Patch,
    SqliteDatabase, SubTodoRepository, TodoPatch, TodoRepository,
};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.initialize().await.expect("Initialize should succeed");
    db
}

#[tokio::test(flavor = "multi_thread")]
async fn completion_toggle_then_group_delete_cascades() {
    let db = setup_db().await;
    let work = db.groups().create("Work").await.unwrap();
    let todos = db.todos();

    let milk = todos
        .create(&NewTodo::new("Buy milk"), Some(work.id))
        .await
        .unwrap();
    assert!(milk.description.is_none());
    assert!(milk.done_at.is_none());

    let done = todos
        .update(
            milk.id,
            &TodoPatch {
                completed: Some(true),
                done_at: Patch::Set(current_timestamp()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("Todo exists");
    assert!(done.completed);
    assert!(done.done_at.is_some());

    let undone = todos
        .update(
            milk.id,
            &TodoPatch {
                completed: Some(false),
                done_at: Patch::Clear,
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("Todo exists");
    assert!(!undone.completed);
    assert!(undone.done_at.is_none());

    let step = db
        .subtodos()
        .create(milk.id, &NewSubTodo::new("Check fridge"))
        .await
        .unwrap();

    assert!(db.groups().delete(work.id).await.unwrap());

    // Group -> todos -> subtodos
    assert!(todos.get(milk.id).await.unwrap().is_none());
    assert!(db.subtodos().get(step.id).await.unwrap().is_none());
    let ungrouped = todos
        .list_by_group(None, &PageQuery::default())
        .await
        .unwrap();
    assert!(ungrouped.items.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn anonymous_todo_leaves_partition_when_reassigned() {
    let db = setup_db().await;
    let todos = db.todos();

    let loose = todos.create(&NewTodo::new("Loose end"), None).await.unwrap();

    let anonymous = todos
        .list_by_group(None, &PageQuery::new(10, 0))
        .await
        .unwrap();
    assert_eq!(anonymous.items.len(), 1);
    assert_eq!(anonymous.items[0].id, loose.id);

    let home = db.groups().create("Home").await.unwrap();
    let moved = todos
        .update(
            loose.id,
            &TodoPatch {
                group_id: Patch::Set(home.id),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("Todo exists");
    assert_eq!(moved.group_id, Some(home.id));

    let anonymous = todos
        .list_by_group(None, &PageQuery::new(10, 0))
        .await
        .unwrap();
    assert!(anonymous.items.is_empty());

    let in_home = todos
        .list_by_group(Some(home.id), &PageQuery::new(10, 0))
        .await
        .unwrap();
    assert_eq!(in_home.items.len(), 1);
    assert_eq!(in_home.items[0].id, loose.id);
}

#[tokio::test(flavor = "multi_thread")]
async fn renaming_a_group_keeps_its_todos() {
    let db = setup_db().await;
    let group = db.groups().create("Errands").await.unwrap();
    let todo = db
        .todos()
        .create(&NewTodo::new("Post office"), Some(group.id))
        .await
        .unwrap();

    db.groups()
        .update(
            group.id,
            &GroupPatch {
                name: Some("Chores".to_string()),
            },
        )
        .await
        .unwrap();

    let fetched = db.todos().get(todo.id).await.unwrap().unwrap();
    assert_eq!(fetched.group_id, Some(group.id));
}

#[tokio::test(flavor = "multi_thread")]
async fn reassigning_to_a_missing_group_is_rejected() {
    let db = setup_db().await;
    let todo = db.todos().create(&NewTodo::new("T"), None).await.unwrap();

    let result = db
        .todos()
        .update(
            todo.id,
            &TodoPatch {
                group_id: Patch::Set(999),
                ..Default::default()
            },
        )
        .await;
    assert!(result.is_err());

    let unchanged = db.todos().get(todo.id).await.unwrap().unwrap();
    assert!(unchanged.group_id.is_none());
}
