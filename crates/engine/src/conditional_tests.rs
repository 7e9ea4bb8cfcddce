use super::*;
use crate::simple::SimpleTask;
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
async fn runs_inner_when_predicate_is_true() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    let inner = Arc::new(SimpleTask::set_item_key("ran", true));
    let task = ConditionalTask::new(|_item| true, inner);
    let outcome = task.run(&item).await;
    assert_eq!(outcome, TaskOutcome::Completed);
    assert_eq!(item.get("ran"), Some(serde_json::Value::Bool(true)));
}

#[tokio::test]
async fn skips_inner_when_predicate_is_false() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    let inner = Arc::new(SimpleTask::set_item_key("ran", true));
    let task = ConditionalTask::new(|_item| false, inner);
    let outcome = task.run(&item).await;
    assert_eq!(outcome, TaskOutcome::Completed);
    assert_eq!(item.get("ran"), None);
}

#[tokio::test]
async fn predicate_sees_item_state_set_by_earlier_tasks() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    item.set("skip_upload", true);
    let inner = Arc::new(SimpleTask::set_item_key("ran", true));
    let task = ConditionalTask::new(
        |item| item.get("skip_upload") != Some(serde_json::Value::Bool(true)),
        inner,
    );
    task.run(&item).await;
    assert_eq!(item.get("ran"), None);
}
