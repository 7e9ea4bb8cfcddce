// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracker-backed task variants (spec §4.3 "TrackerRequest").
//!
//! `seesaw/tracker.py` expresses `GetItemFromTracker`/`SendDoneToTracker`
//! as subclasses overriding `data()`/`process_body()`. Rust has no
//! lightweight subclassing for that, so `TrackerRequest` takes both as
//! closures and the three concrete constructors below just supply them.

use crate::error::TaskError;
use crate::task::{Task, TaskOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use warrior_adapters::{TrackerClient, TrackerOutcome};
use warrior_core::{Item, ItemState, Realize};

const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(60);
const RETRY_DELAY_STEP: Duration = Duration::from_secs(10);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(300);

/// What a `process_body` closure decided after a 200 response.
pub enum BodyOutcome {
    Accepted,
    Retry(String),
}

type DataFn = dyn Fn(&Item) -> serde_json::Value + Send + Sync;
type ProcessBodyFn = dyn Fn(&str, &Item) -> Result<BodyOutcome, TaskError> + Send + Sync;

/// One named tracker endpoint (`request`, `done`, `upload`, ...).
pub struct TrackerRequest {
    name: String,
    command: String,
    cancelable: bool,
    client: TrackerClient,
    data: Arc<DataFn>,
    process_body: Arc<ProcessBodyFn>,
}

impl TrackerRequest {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        client: TrackerClient,
        cancelable: bool,
        data: impl Fn(&Item) -> serde_json::Value + Send + Sync + 'static,
        process_body: impl Fn(&str, &Item) -> Result<BodyOutcome, TaskError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            cancelable,
            client,
            data: Arc::new(data),
            process_body: Arc::new(process_body),
        }
    }

    /// `GetItemFromTracker` — cancelable, since this is the one point
    /// where a worker idles waiting on an assignment.
    pub fn get_item(client: TrackerClient, downloader: Realize, version: Option<Realize>) -> Self {
        Self::new(
            "GetItemFromTracker",
            "request",
            client,
            true,
            move |item| {
                let mut body = serde_json::Map::new();
                if let Ok(d) = downloader.realize(item) {
                    body.insert("downloader".to_string(), d);
                }
                body.insert("api_version".to_string(), serde_json::Value::String("2".into()));
                if let Some(version) = &version {
                    if let Ok(v) = version.realize(item) {
                        body.insert("version".to_string(), v);
                    }
                }
                serde_json::Value::Object(body)
            },
            |body, item| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    return Ok(BodyOutcome::Retry("Tracker responded with empty response.\n".to_string()));
                }
                if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str::<serde_json::Value>(trimmed) {
                    for (key, value) in fields {
                        item.set(key, value);
                    }
                } else {
                    item.set("item_name", trimmed);
                }
                if item.get("item_name").is_none() {
                    return Err(TaskError::Simple("tracker response missing item_name".to_string()));
                }
                item.log_output(
                    format!("Received item '{}' from tracker\n", item.get("item_name").unwrap_or_default()).as_bytes(),
                    true,
                );
                Ok(BodyOutcome::Accepted)
            },
        )
    }

    /// `SendDoneToTracker` — body must be exactly `OK`.
    pub fn send_done(client: TrackerClient, stats: Realize) -> Self {
        Self::new(
            "SendDoneToTracker",
            "done",
            client,
            false,
            move |item| stats.realize(item).unwrap_or(serde_json::Value::Null),
            |body, item| {
                if body.trim() == "OK" {
                    item.log_output(
                        format!("Tracker confirmed item '{}'.\n", item.get("item_name").unwrap_or_default()).as_bytes(),
                        true,
                    );
                    Ok(BodyOutcome::Accepted)
                } else {
                    Ok(BodyOutcome::Retry(format!(
                        "Tracker responded with unexpected '{}'.\n",
                        body.trim()
                    )))
                }
            },
        )
    }

    /// `UploadWithTracker` — asks the tracker for an `upload_target`, then
    /// fails with an explicit admin-facing error on any scheme other than
    /// `rsync://` or `http(s)://` (spec §6, Open Question pinned in
    /// DESIGN.md: no silent fallback).
    pub fn upload(client: TrackerClient, downloader: Realize, version: Option<Realize>) -> Self {
        Self::new(
            "UploadWithTracker",
            "upload",
            client,
            false,
            move |item| {
                let mut body = serde_json::Map::new();
                if let Ok(d) = downloader.realize(item) {
                    body.insert("downloader".to_string(), d);
                }
                body.insert(
                    "item_name".to_string(),
                    item.get("item_name").unwrap_or(serde_json::Value::Null),
                );
                if let Some(version) = &version {
                    if let Ok(v) = version.realize(item) {
                        body.insert("version".to_string(), v);
                    }
                }
                serde_json::Value::Object(body)
            },
            |body, item| {
                let parsed: serde_json::Value = serde_json::from_str(body.trim())
                    .map_err(|_| TaskError::Simple("tracker upload response was not JSON".to_string()))?;
                let target = parsed
                    .get("upload_target")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| TaskError::Simple("tracker upload response missing upload_target".to_string()))?;
                if target.starts_with("rsync://") || target.starts_with("http://") || target.starts_with("https://") {
                    item.set("upload_target", target);
                    Ok(BodyOutcome::Accepted)
                } else {
                    Err(TaskError::Simple(format!(
                        "tracker returned an upload_target with an unsupported scheme: {target}"
                    )))
                }
            },
        )
    }
}

#[async_trait]
impl Task for TrackerRequest {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, item: &Item) -> TaskOutcome {
        item.log_output(format!("Starting {} for {}\n", self.name, item.description()).as_bytes(), true);

        let mut delay = INITIAL_RETRY_DELAY;
        loop {
            if item.state() != ItemState::Running {
                return TaskOutcome::Failed;
            }

            item.set_may_be_canceled(false);
            let body = (self.data)(item);
            let outcome = self.client.post(&self.command, body, delay).await;

            let retry_message = match outcome {
                Ok(TrackerOutcome::Ok(text)) => match (self.process_body)(&text, item) {
                    Ok(BodyOutcome::Accepted) => {
                        item.log_output(format!("Finished {} for {}\n", self.name, item.description()).as_bytes(), true);
                        return TaskOutcome::Completed;
                    }
                    Ok(BodyOutcome::Retry(message)) => {
                        delay = INITIAL_RETRY_DELAY;
                        message
                    }
                    Err(e) => {
                        item.log_error(&self.name, &e);
                        item.log_output(format!("Failed {} for {}\n{e}\n", self.name, item.description()).as_bytes(), true);
                        return TaskOutcome::Failed;
                    }
                },
                Ok(TrackerOutcome::Retry { message, .. }) => message,
                Err(e) => {
                    item.log_error(&self.name, &e);
                    return TaskOutcome::Failed;
                }
            };

            item.log_output(format!("{retry_message}Retrying after {}s...\n", delay.as_secs()).as_bytes(), true);
            item.set_may_be_canceled(self.cancelable);
            tokio::time::sleep(delay).await;
            delay = (delay + RETRY_DELAY_STEP).min(MAX_RETRY_DELAY);
        }
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
