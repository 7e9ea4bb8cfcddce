// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feeds items into a [`Pipeline`] under a concurrency cap (spec §5
//! "Runner").
//!
//! Grounded on `seesaw/runner.py`'s `SimpleRunner`: an admission loop
//! spawns new items while under the concurrent-items cap and under
//! `max_items`, polls a stop file each cycle, and pauses ten seconds
//! after a failed item before freeing its slot so a chain of immediate
//! failures doesn't spin the tracker.

use crate::pipeline::Pipeline;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use warrior_adapters::StopFile;
use warrior_core::{ConfigSlot, Item, ItemState};

const POST_FAILURE_PAUSE: Duration = Duration::from_secs(10);

/// A cooperative control surface for a running [`Runner::run`] future —
/// the CLI's SIGINT handler holds one of these.
#[derive(Clone)]
pub struct RunnerHandle {
    pipeline: Arc<Pipeline>,
    stop_gracefully: Arc<AtomicBool>,
    stop_forcefully: Arc<AtomicBool>,
}

impl RunnerHandle {
    /// Stop admitting new items; items already in flight run to
    /// completion, except those idling in a cancellable wait (spec §5),
    /// which are canceled immediately so the runner doesn't hang waiting
    /// on a long-poll that will never finish on its own.
    pub fn stop_gracefully(&self) {
        self.stop_gracefully.store(true, Ordering::SeqCst);
        self.pipeline.cancel_items();
    }

    /// Cancel every in-flight item eligible for cancellation and stop
    /// admitting new ones.
    pub fn stop_forcefully(&self) {
        self.stop_forcefully.store(true, Ordering::SeqCst);
        self.pipeline.cancel_items();
    }

    /// Clear a graceful-stop request, resuming admission.
    pub fn resume(&self) {
        self.stop_gracefully.store(false, Ordering::SeqCst);
    }

    pub fn is_stopping(&self) -> bool {
        self.stop_gracefully.load(Ordering::SeqCst) || self.stop_forcefully.load(Ordering::SeqCst)
    }
}

/// Admits items into a pipeline up to `concurrent_items` at a time.
pub struct Runner {
    pipeline: Arc<Pipeline>,
    concurrent_items: Arc<ConfigSlot>,
    max_items: Option<u64>,
    stop_file: Option<StopFile>,
    new_item: Arc<dyn Fn(u64) -> Item + Send + Sync>,
    stop_gracefully: Arc<AtomicBool>,
    stop_forcefully: Arc<AtomicBool>,
}

impl Runner {
    pub fn new(
        pipeline: Arc<Pipeline>,
        concurrent_items: Arc<ConfigSlot>,
        max_items: Option<u64>,
        stop_file: Option<StopFile>,
        new_item: impl Fn(u64) -> Item + Send + Sync + 'static,
    ) -> (Self, RunnerHandle) {
        let stop_gracefully = Arc::new(AtomicBool::new(false));
        let stop_forcefully = Arc::new(AtomicBool::new(false));
        let handle = RunnerHandle {
            pipeline: pipeline.clone(),
            stop_gracefully: stop_gracefully.clone(),
            stop_forcefully: stop_forcefully.clone(),
        };
        (
            Self {
                pipeline,
                concurrent_items,
                max_items,
                stop_file,
                new_item: Arc::new(new_item),
                stop_gracefully,
                stop_forcefully,
            },
            handle,
        )
    }

    /// Runs the admission loop until every item has drained under a stop
    /// request, or `max_items` has been reached and the last item
    /// finishes. Returns once the active set is empty and no more items
    /// will be admitted — the runner's `on_finish` signal.
    pub async fn run(&self) {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ItemState>();
        let mut active: u64 = 0;
        let mut started: u64 = 0;

        loop {
            if self.stop_forcefully.load(Ordering::SeqCst) || self.stop_gracefully.load(Ordering::SeqCst) {
                self.pipeline.cancel_items();
            }

            if let Some(stop_file) = &self.stop_file {
                if stop_file.changed() {
                    self.stop_gracefully.store(true, Ordering::SeqCst);
                }
            }

            let exhausted_max_items = self.max_items.map(|max| started >= max).unwrap_or(false);
            let should_admit = !self.stop_gracefully.load(Ordering::SeqCst)
                && !self.stop_forcefully.load(Ordering::SeqCst)
                && !exhausted_max_items;

            let cap = self.concurrent_items.value().as_i64().unwrap_or(1).max(0) as u64;
            while should_admit && active < cap && !self.max_items.map(|max| started >= max).unwrap_or(false) {
                let number = started;
                started += 1;
                active += 1;

                let item = (self.new_item)(number);
                if let Err(error) = item.prepare_data_dir() {
                    tracing::error!(%error, item_id = %item.id, "failed to prepare item data directory");
                    item.fail(SystemTime::now());
                    let _ = tx.send(item.state());
                    continue;
                }
                let pipeline = self.pipeline.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let state = pipeline.run_item(item).await;
                    let _ = tx.send(state);
                });
            }

            let will_admit_more = !self.stop_gracefully.load(Ordering::SeqCst)
                && !self.stop_forcefully.load(Ordering::SeqCst)
                && !self.max_items.map(|max| started >= max).unwrap_or(false);

            if active == 0 && !will_admit_more {
                return;
            }

            if active == 0 {
                // Nothing in flight to wait on (e.g. concurrent_items was
                // realized to 0) but admission isn't permanently closed —
                // poll again rather than block on a channel nothing will
                // ever feed.
                tokio::time::sleep(Duration::from_millis(200)).await;
                continue;
            }

            match rx.recv().await {
                Some(ItemState::Failed) => {
                    tokio::time::sleep(POST_FAILURE_PAUSE).await;
                    active -= 1;
                }
                Some(_) => {
                    active -= 1;
                }
                None => return,
            }
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
