use super::*;
use std::time::SystemTime;
use warrior_core::ItemId;

fn make_item(dir: &std::path::Path) -> Item {
    Item::new(
        ItemId::new("x-1"),
        1,
        serde_json::Map::new(),
        dir.to_path_buf(),
        true,
        SystemTime::now(),
    )
}

#[tokio::test]
async fn set_item_key_writes_the_property() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    let task = SimpleTask::set_item_key("downloader", "nick");
    let outcome = task.run(&item).await;
    assert_eq!(outcome, TaskOutcome::Completed);
    assert_eq!(item.get("downloader"), Some(serde_json::Value::String("nick".into())));
}

#[tokio::test]
async fn set_item_key_realized_resolves_against_the_item() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    item.set("downloader", "nick");
    let task = SimpleTask::set_item_key_realized("downloader_copy", warrior_core::Realize::item_value("downloader"));
    let outcome = task.run(&item).await;
    assert_eq!(outcome, TaskOutcome::Completed);
    assert_eq!(item.get("downloader_copy"), Some(serde_json::Value::String("nick".into())));
}

#[tokio::test]
async fn returning_an_error_fails_the_task_and_records_it() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    let task = SimpleTask::new("Boom", |_item| Err(TaskError::Simple("kaboom".into())));
    let outcome = task.run(&item).await;
    assert_eq!(outcome, TaskOutcome::Failed);
    assert_eq!(item.errors().len(), 1);
    assert!(item.errors()[0].1.contains("kaboom"));
}

#[tokio::test]
async fn a_panicking_body_fails_the_task_instead_of_unwinding_past_it() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    let task = SimpleTask::new("Boom", |_item| panic!("surprise"));
    let outcome = task.run(&item).await;
    assert_eq!(outcome, TaskOutcome::Failed);
    assert!(item.output_log().contains("uncaught panic"));
}

#[tokio::test]
async fn print_item_logs_the_property_snapshot() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    item.set("item_name", "demo");
    let task = SimpleTask::print_item();
    let outcome = task.run(&item).await;
    assert_eq!(outcome, TaskOutcome::Completed);
    assert!(item.output_log().contains("item_name"));
}
