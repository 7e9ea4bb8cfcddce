// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A synchronous, in-band stage (spec §4.3 "SimpleTask").

use crate::error::TaskError;
use crate::task::{Task, TaskOutcome};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;
use warrior_core::{Item, Realize};

/// The body of a `SimpleTask`. Runs synchronously and in-line — long work
/// belongs in an `ExternalProcess`, not here (spec §5).
pub type SimpleTaskBody = dyn Fn(&Item) -> Result<(), TaskError> + Send + Sync;

/// A stage whose work is a short, synchronous closure (`SetItemKey`,
/// `PrintItem`, `PrepareStatsForTracker`, and project-supplied callouts
/// all take this shape).
pub struct SimpleTask {
    name: String,
    body: Arc<SimpleTaskBody>,
}

impl SimpleTask {
    pub fn new(name: impl Into<String>, body: impl Fn(&Item) -> Result<(), TaskError> + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            body: Arc::new(body),
        }
    }

    /// `SetItemKey(key, value)`.
    pub fn set_item_key(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let key = key.into();
        let value = value.into();
        Self::new("SetItemKey", move |item| {
            item.set(key.clone(), value.clone());
            Ok(())
        })
    }

    /// `SetItemKey(key, value)` with a deferred value — used by the
    /// pipeline-file loader, where the value may reference a config slot
    /// or another item property rather than a fixed literal.
    pub fn set_item_key_realized(key: impl Into<String>, value: Realize) -> Self {
        let key = key.into();
        Self::new("SetItemKey", move |item| {
            let resolved = value.realize(item)?;
            item.set(key.clone(), resolved);
            Ok(())
        })
    }

    /// `PrintItem` — writes the item's current properties to its own
    /// output log (there is no process-wide stdout to share across
    /// concurrently running items).
    pub fn print_item() -> Self {
        Self::new("PrintItem", |item| {
            item.log_output(format!("{:?}\n", item.snapshot()).as_bytes(), true);
            Ok(())
        })
    }
}

#[async_trait]
impl Task for SimpleTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, item: &Item) -> TaskOutcome {
        item.log_output(
            format!("Starting {} for {}\n", self.name, item.description()).as_bytes(),
            true,
        );

        let body = self.body.clone();
        let scoped_item = item.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| (body)(&scoped_item)));

        match result {
            Ok(Ok(())) => {
                item.log_output(
                    format!("Finished {} for {}\n", self.name, item.description()).as_bytes(),
                    true,
                );
                TaskOutcome::Completed
            }
            Ok(Err(e)) => {
                item.log_error(&self.name, &e);
                item.log_output(
                    format!("Failed {} for {}\n{e}\n", self.name, item.description()).as_bytes(),
                    true,
                );
                TaskOutcome::Failed
            }
            Err(panic) => {
                let message = panic_message(&panic);
                item.log_error(&self.name, &message);
                item.log_output(
                    format!(
                        "Failed {} for {}\nuncaught panic: {message}\n",
                        self.name,
                        item.description()
                    )
                    .as_bytes(),
                    true,
                );
                TaskOutcome::Failed
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "simple_tests.rs"]
mod tests;
