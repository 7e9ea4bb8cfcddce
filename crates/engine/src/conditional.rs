// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conditionally-skipped wrapper (spec §4.3 "ConditionalTask").

use crate::task::{Task, TaskOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use warrior_core::Item;

type Predicate = dyn Fn(&Item) -> bool + Send + Sync;

/// Runs `inner` only when `predicate` returns true; otherwise reports
/// `Completed` immediately and leaves `inner` untouched.
pub struct ConditionalTask {
    name: String,
    predicate: Arc<Predicate>,
    inner: Arc<dyn Task>,
}

impl ConditionalTask {
    pub fn new(predicate: impl Fn(&Item) -> bool + Send + Sync + 'static, inner: Arc<dyn Task>) -> Self {
        Self {
            name: format!("Conditional({})", inner.name()),
            predicate: Arc::new(predicate),
            inner,
        }
    }
}

#[async_trait]
impl Task for ConditionalTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, item: &Item) -> TaskOutcome {
        if (self.predicate)(item) {
            self.inner.run(item).await
        } else {
            item.log_output(format!("Skipping {}\n", self.inner.name()).as_bytes(), true);
            TaskOutcome::Completed
        }
    }
}

#[cfg(test)]
#[path = "conditional_tests.rs"]
mod tests;
