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
async fn exit_code_zero_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    let spec = ProcessSpec::new("true", vec![]);
    let outcome = run_with_timeout(spec, &item, Duration::from_secs(5)).await.unwrap();
    assert_eq!(outcome, ProcessOutcome::Exited(0));
}

#[tokio::test]
async fn nonzero_exit_code_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    let spec = ProcessSpec::new("false", vec![]);
    let outcome = run_with_timeout(spec, &item, Duration::from_secs(5)).await.unwrap();
    assert_eq!(outcome, ProcessOutcome::Exited(1));
}

#[tokio::test]
async fn stdout_is_streamed_into_item_output_log() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    let spec = ProcessSpec::new("echo", vec!["hello".to_string()]);
    run_with_timeout(spec, &item, Duration::from_secs(5)).await.unwrap();
    assert_eq!(item.output_log(), "hello\n");
}

#[tokio::test]
async fn stdin_is_forwarded_to_the_child() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    let mut spec = ProcessSpec::new("cat", vec![]);
    spec.stdin = Some("from the pipeline\n".to_string());
    run_with_timeout(spec, &item, Duration::from_secs(5)).await.unwrap();
    assert_eq!(item.output_log(), "from the pipeline\n");
}

#[tokio::test]
async fn long_running_process_is_killed_on_timeout() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    let spec = ProcessSpec::new("sleep", vec!["30".to_string()]);
    let outcome = run_with_timeout(spec, &item, Duration::from_millis(50)).await.unwrap();
    assert_eq!(outcome, ProcessOutcome::TimedOut);
}

#[tokio::test]
async fn untimed_run_reports_the_real_exit_code() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    let spec = ProcessSpec::new("sh", vec!["-c".to_string(), "exit 33".to_string()]);
    let code = run(spec, &item).await.unwrap();
    assert_eq!(code, 33);
}

#[tokio::test]
async fn missing_binary_surfaces_as_spawn_error() {
    let tmp = tempfile::tempdir().unwrap();
    let item = make_item(tmp.path());
    let spec = ProcessSpec::new("definitely-not-a-real-binary", vec![]);
    let err = run_with_timeout(spec, &item, Duration::from_secs(5)).await.unwrap_err();
    assert!(matches!(err, ProcessError::Spawn(_, _)));
}
