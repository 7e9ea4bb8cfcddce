// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An ordered chain of [`Task`]s run against one item at a time (spec §3
//! "Pipeline").
//!
//! Grounded on `seesaw/pipeline.py`'s `Pipeline`: tasks are chained in
//! declaration order and an item that fails a task does not run the
//! remaining ones. The original wires this with `on_complete_item`/
//! `on_fail_item` callback chains; here a plain sequential `for` loop
//! inside one `tokio::spawn`'d future does the same job, and `tokio::spawn`
//! catching a panicking task is this engine's equivalent of the
//! original's per-task try/except guard.

use crate::task::{Task, TaskOutcome};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use warrior_core::{Item, ItemId, ItemState, TaskStatus};

pub struct Pipeline {
    tasks: Vec<Arc<dyn Task>>,
    items_in_pipeline: Mutex<HashMap<ItemId, Item>>,
}

impl Pipeline {
    pub fn new(tasks: Vec<Arc<dyn Task>>) -> Self {
        Self {
            tasks,
            items_in_pipeline: Mutex::new(HashMap::new()),
        }
    }

    pub fn tasks(&self) -> &[Arc<dyn Task>] {
        &self.tasks
    }

    /// Runs every task in order against `item`, stopping at the first
    /// failure, then reports the item's true final state. Reads the state
    /// back through `item.state()` rather than trusting the loop's own
    /// outcome: `complete()`/`fail()` are idempotent no-ops against an
    /// item already canceled out from under the pipeline, so whichever
    /// transition actually stuck — ours or an external cancellation — is
    /// what callers see.
    pub async fn run_item(&self, item: Item) -> ItemState {
        self.items_in_pipeline.lock().insert(item.id.clone(), item.clone());

        let tasks = self.tasks.clone();
        let run_item = item.clone();
        let join = tokio::spawn(async move {
            let mut failed = false;
            for task in &tasks {
                if run_item.state() != ItemState::Running {
                    break;
                }
                run_item.set_task_status(task.name(), TaskStatus::Running);
                match task.run(&run_item).await {
                    TaskOutcome::Completed => {
                        run_item.set_task_status(task.name(), TaskStatus::Completed);
                    }
                    TaskOutcome::Failed => {
                        run_item.set_task_status(task.name(), TaskStatus::Failed);
                        failed = true;
                        break;
                    }
                }
            }
            failed
        });

        match join.await {
            Ok(failed) => {
                if failed {
                    item.fail(SystemTime::now());
                } else {
                    item.complete(SystemTime::now());
                }
            }
            Err(panic) => {
                tracing::error!(item = %item.id, "pipeline task chain panicked: {panic}");
                item.log_error("Pipeline", format!("uncaught panic: {panic}"));
                item.fail(SystemTime::now());
            }
        }

        self.items_in_pipeline.lock().remove(&item.id);
        item.state()
    }

    /// Cancels every in-flight item currently idle inside a cancellable
    /// wait (spec §5 "Cancellation").
    pub fn cancel_items(&self) {
        for item in self.items_in_pipeline.lock().values() {
            if item.may_be_canceled() {
                item.cancel(SystemTime::now());
            }
        }
    }

    pub fn items_in_flight(&self) -> usize {
        self.items_in_pipeline.lock().len()
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pipeline:")?;
        for task in &self.tasks {
            write!(f, "\n -> {}", task.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
