// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded-concurrency wrapper (spec §4.3 "LimitConcurrent").
//!
//! A FIFO admission queue rather than `tokio::sync::Semaphore`: the cap
//! is a [`Realize`] re-evaluated on every admission attempt (an operator
//! can retune it per item via config), and a semaphore's permit count is
//! fixed at construction.

use crate::task::{Task, TaskOutcome};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;
use warrior_core::{Item, Realize};

pub struct LimitConcurrent {
    name: String,
    max_concurrent: Realize,
    inner: Arc<dyn Task>,
    running: Mutex<usize>,
    queue: Mutex<VecDeque<oneshot::Sender<()>>>,
}

impl LimitConcurrent {
    pub fn new(max_concurrent: Realize, inner: Arc<dyn Task>) -> Self {
        Self {
            name: format!("LimitConcurrent({})", inner.name()),
            max_concurrent,
            inner,
            running: Mutex::new(0),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Blocks until a slot is free under the currently-realized cap. A
    /// waiter only re-checks the cap when woken by a [`Self::release`] —
    /// a cap that grows without any slot freeing up does not itself wake
    /// queued waiters.
    async fn acquire(&self, item: &Item) {
        loop {
            let cap = self.max_concurrent.realize_i64(item).unwrap_or(1).max(0) as usize;
            let waiter = {
                let mut running = self.running.lock();
                if *running < cap {
                    *running += 1;
                    None
                } else {
                    let (tx, rx) = oneshot::channel();
                    self.queue.lock().push_back(tx);
                    Some(rx)
                }
            };
            match waiter {
                None => return,
                Some(rx) => {
                    let _ = rx.await;
                }
            }
        }
    }

    fn release(&self) {
        {
            let mut running = self.running.lock();
            *running = running.saturating_sub(1);
        }
        if let Some(tx) = self.queue.lock().pop_front() {
            let _ = tx.send(());
        }
    }
}

#[async_trait]
impl Task for LimitConcurrent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, item: &Item) -> TaskOutcome {
        self.acquire(item).await;
        let outcome = self.inner.run(item).await;
        self.release();
        outcome
    }
}

#[cfg(test)]
#[path = "limit_concurrent_tests.rs"]
mod tests;
