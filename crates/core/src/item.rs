// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The work unit processed end-to-end by one pipeline traversal (spec §3).

use crate::id::ItemId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("failed to prepare data directory {0}: {1}")]
    PrepareDataDir(PathBuf, std::io::Error),
}

/// Per-task completion marker stored in an item's `task_status` map
/// (spec §3 "Item").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Lifecycle state of an item. `Running` is the only non-terminal state;
/// transitions out of it are one-shot (spec §3 invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Running,
    Completed,
    Failed,
    Canceled,
}

impl ItemState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ItemState::Running)
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemState::Running => write!(f, "running"),
            ItemState::Completed => write!(f, "completed"),
            ItemState::Failed => write!(f, "failed"),
            ItemState::Canceled => write!(f, "canceled"),
        }
    }
}

/// Extension point for observers (the web UI, broadcast telemetry — both
/// out of scope per spec §1) that want to react to item-level changes.
/// Replaces seesaw-kit's per-object `Event` slots (Design Notes) with a
/// single typed subscriber list.
pub trait EventSink: Send + Sync {
    fn on_property(&self, _item: &Item, _key: &str, _value: &serde_json::Value) {}
    fn on_task_status(&self, _item: &Item, _task: &str, _status: TaskStatus) {}
    fn on_output(&self, _item: &Item, _chunk: &str) {}
    fn on_error(&self, _item: &Item, _task: &str, _message: &str) {}
    fn on_state(&self, _item: &Item, _state: ItemState) {}
}

struct Inner {
    properties: Mutex<serde_json::Map<String, serde_json::Value>>,
    task_status: Mutex<HashMap<String, TaskStatus>>,
    state: Mutex<ItemState>,
    may_be_canceled: AtomicBool,
    output_log: Mutex<String>,
    errors: Mutex<Vec<(String, String)>>,
    start_time: SystemTime,
    end_time: Mutex<Option<SystemTime>>,
    data_dir: PathBuf,
    keep_data: bool,
    sinks: Mutex<Vec<Arc<dyn EventSink>>>,
}

/// The unit of work carried through the pipeline (spec §3).
///
/// Cheaply cloneable: all mutable state lives behind the shared `Inner`,
/// matching how the runner, the pipeline, and every task instance need to
/// hold a reference to the same logical item concurrently.
#[derive(Clone)]
pub struct Item {
    pub id: ItemId,
    pub number: u64,
    inner: Arc<Inner>,
}

impl Item {
    pub fn new(
        id: ItemId,
        number: u64,
        properties: serde_json::Map<String, serde_json::Value>,
        data_dir: PathBuf,
        keep_data: bool,
        start_time: SystemTime,
    ) -> Self {
        Self {
            id,
            number,
            inner: Arc::new(Inner {
                properties: Mutex::new(properties),
                task_status: Mutex::new(HashMap::new()),
                state: Mutex::new(ItemState::Running),
                may_be_canceled: AtomicBool::new(false),
                output_log: Mutex::new(String::new()),
                errors: Mutex::new(Vec::new()),
                start_time,
                end_time: Mutex::new(None),
                data_dir,
                keep_data,
                sinks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn add_sink(&self, sink: Arc<dyn EventSink>) {
        self.inner.sinks.lock().push(sink);
    }

    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }

    pub fn start_time(&self) -> SystemTime {
        self.inner.start_time
    }

    pub fn end_time(&self) -> Option<SystemTime> {
        *self.inner.end_time.lock()
    }

    /// Create the per-item working directory (spec §3 `data_dir`).
    pub fn prepare_data_dir(&self) -> Result<(), ItemError> {
        std::fs::create_dir_all(&self.inner.data_dir)
            .map_err(|e| ItemError::PrepareDataDir(self.inner.data_dir.clone(), e))
    }

    /// `item.description()` from `seesaw/item.py`: used in log lines.
    pub fn description(&self) -> String {
        match self.get("item_name") {
            Some(serde_json::Value::String(s)) => format!("Item {s}"),
            _ => "Item".to_string(),
        }
    }

    // -- properties ---------------------------------------------------

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.properties.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.properties.lock().contains_key(key)
    }

    /// `item[key] = value`, firing a property-change event only when the
    /// value actually changes (spec §4.2 `set`).
    pub fn set(&self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        let key = key.into();
        let value = value.into();
        let changed = {
            let mut props = self.inner.properties.lock();
            let previous = props.get(&key);
            let changed = previous != Some(&value);
            props.insert(key.clone(), value.clone());
            changed
        };
        if changed {
            for sink in self.inner.sinks.lock().iter() {
                sink.on_property(self, &key, &value);
            }
        }
    }

    pub fn snapshot(&self) -> serde_json::Map<String, serde_json::Value> {
        self.inner.properties.lock().clone()
    }

    // -- task status ----------------------------------------------------

    /// Write-through task status update. A `Running` write is ignored (with
    /// a warning) if the task already reports `Completed`/`Failed`, per the
    /// "never downgraded" invariant (spec §3).
    pub fn set_task_status(&self, task: &str, status: TaskStatus) {
        let fired = {
            let mut map = self.inner.task_status.lock();
            match map.get(task) {
                Some(existing) if *existing != TaskStatus::Running && status == TaskStatus::Running => {
                    tracing::warn!(item = %self.id, task, "ignoring downgrade of task status to running");
                    false
                }
                Some(existing) if *existing == status => false,
                _ => {
                    map.insert(task.to_string(), status);
                    true
                }
            }
        };
        if fired {
            for sink in self.inner.sinks.lock().iter() {
                sink.on_task_status(self, task, status);
            }
        }
    }

    pub fn task_status(&self, task: &str) -> Option<TaskStatus> {
        self.inner.task_status.lock().get(task).copied()
    }

    // -- output / errors --------------------------------------------------

    /// Append output. When `full_line` is true, the chunk is newline
    /// delimited on both ends: a newline is inserted before it if the log
    /// doesn't already end with one, and after it if the chunk itself
    /// doesn't end with one (spec §4.2 `log_output`). Binary input is
    /// decoded as UTF-8 with replacement on error.
    pub fn log_output(&self, data: &[u8], full_line: bool) {
        let text = String::from_utf8_lossy(data).into_owned();
        {
            let mut log = self.inner.output_log.lock();
            if full_line {
                if !log.is_empty() && !log.ends_with('\n') {
                    log.push('\n');
                }
                log.push_str(&text);
                if !text.ends_with('\n') {
                    log.push('\n');
                }
            } else {
                log.push_str(&text);
            }
        }
        for sink in self.inner.sinks.lock().iter() {
            sink.on_output(self, &text);
        }
    }

    pub fn output_log(&self) -> String {
        self.inner.output_log.lock().clone()
    }

    pub fn log_error(&self, task: &str, value: impl fmt::Display) {
        let message = value.to_string();
        self.inner.errors.lock().push((task.to_string(), message.clone()));
        for sink in self.inner.sinks.lock().iter() {
            sink.on_error(self, task, &message);
        }
    }

    pub fn errors(&self) -> Vec<(String, String)> {
        self.inner.errors.lock().clone()
    }

    // -- cancellation hint ------------------------------------------------

    /// True only while the item is idle inside a cancellable long-poll
    /// (spec §3 `may_be_canceled`).
    pub fn may_be_canceled(&self) -> bool {
        self.inner.may_be_canceled.load(Ordering::SeqCst)
    }

    pub fn set_may_be_canceled(&self, value: bool) {
        self.inner.may_be_canceled.store(value, Ordering::SeqCst);
    }

    // -- lifecycle ----------------------------------------------------

    pub fn state(&self) -> ItemState {
        *self.inner.state.lock()
    }

    pub fn cancel(&self, end_time: SystemTime) {
        self.transition(ItemState::Canceled, end_time);
    }

    pub fn complete(&self, end_time: SystemTime) {
        self.transition(ItemState::Completed, end_time);
    }

    pub fn fail(&self, end_time: SystemTime) {
        self.transition(ItemState::Failed, end_time);
    }

    /// One-shot terminal transition. A second call is a logged no-op, not
    /// an error (spec §4.2 failure model: "invariants, not runtime
    /// errors").
    fn transition(&self, new_state: ItemState, end_time: SystemTime) {
        {
            let mut state = self.inner.state.lock();
            if state.is_terminal() {
                tracing::warn!(
                    item = %self.id,
                    current = %*state,
                    attempted = %new_state,
                    "ignoring redundant terminal transition"
                );
                return;
            }
            *state = new_state;
        }
        *self.inner.end_time.lock() = Some(end_time);
        self.clear_data_dir();
        for sink in self.inner.sinks.lock().iter() {
            sink.on_state(self, new_state);
        }
    }

    fn clear_data_dir(&self) {
        if self.inner.keep_data {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.inner.data_dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(item = %self.id, dir = %self.inner.data_dir.display(), error = %e, "failed to remove item data directory");
            }
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("number", &self.number)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
