use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};
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

struct TrackConcurrency {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait]
impl Task for TrackConcurrency {
    fn name(&self) -> &str {
        "TrackConcurrency"
    }

    async fn run(&self, _item: &Item) -> TaskOutcome {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        TaskOutcome::Completed
    }
}

#[tokio::test]
async fn cap_of_one_fully_serializes_concurrent_callers() {
    let tmp = tempfile::tempdir().unwrap();
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let inner = Arc::new(TrackConcurrency {
        current: current.clone(),
        peak: peak.clone(),
    });
    let limiter = Arc::new(LimitConcurrent::new(Realize::literal(1i64), inner));

    let mut handles = Vec::new();
    for i in 0..4 {
        let limiter = limiter.clone();
        let item = make_item(tmp.path());
        let _ = i;
        handles.push(tokio::spawn(async move { limiter.run(&item).await }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap(), TaskOutcome::Completed);
    }
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cap_above_one_allows_overlap() {
    let tmp = tempfile::tempdir().unwrap();
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let inner = Arc::new(TrackConcurrency {
        current: current.clone(),
        peak: peak.clone(),
    });
    let limiter = Arc::new(LimitConcurrent::new(Realize::literal(3i64), inner));

    let mut handles = Vec::new();
    for _ in 0..3 {
        let limiter = limiter.clone();
        let item = make_item(tmp.path());
        handles.push(tokio::spawn(async move { limiter.run(&item).await }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap(), TaskOutcome::Completed);
    }
    assert!(peak.load(Ordering::SeqCst) >= 2);
}
