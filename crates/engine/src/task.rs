// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Task` trait: a polymorphic pipeline stage (spec §3 "Task").
//!
//! The original expresses a task's completion through `on_complete_item`/
//! `on_fail_item` event slots fired from deep inside chained callbacks
//! (Design Notes: "chained callbacks for subprocess completion and HTTP
//! completion"). Rust's `async`/`await` lets a task's own future be the
//! completion signal instead: `run` resolves exactly once, with the
//! outcome as its return value, and the pipeline driver awaits it in
//! place rather than subscribing to an event.

use async_trait::async_trait;
use warrior_core::Item;

/// Result of one task's traversal of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed,
}

/// A stage in a pipeline. Implementations must not hold per-item state on
/// `self` — shared task instances serve every item concurrently, so
/// anything item-specific belongs on the `Item` (spec §5 "Shared
/// resources").
#[async_trait]
pub trait Task: Send + Sync {
    /// Stable name used in task-status maps, logs, and spans.
    fn name(&self) -> &str;

    /// Run this stage against `item`. Resolves once with the final
    /// outcome — retries, if any, happen inside this call.
    async fn run(&self, item: &Item) -> TaskOutcome;
}
