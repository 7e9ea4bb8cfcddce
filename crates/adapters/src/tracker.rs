// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the ArchiveTeam tracker protocol.
//!
//! Mirrors `seesaw/tracker.py`'s `TrackerRequest.send_request` /
//! `handle_response`: a POST of a small JSON body, with tracker-specific
//! status codes translated into a retry decision rather than a hard
//! error, since rate limiting (420/429) and transient outages are
//! expected steady-state traffic for a tracker.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to read tracker response body: {0}")]
    Body(reqwest::Error),
}

/// Outcome of a single tracker request.
#[derive(Debug, Clone)]
pub enum TrackerOutcome {
    /// HTTP 200; body is the raw response text for the caller to parse.
    Ok(String),
    /// Any other outcome (non-200 status, or no response at all). The
    /// caller should log `message`, wait `delay`, and retry.
    Retry { message: String, delay: Duration },
}

/// Thin wrapper over a `reqwest::Client` bound to one tracker URL and
/// user agent string.
#[derive(Clone)]
pub struct TrackerClient {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl TrackerClient {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            user_agent: user_agent.into(),
        }
    }

    /// POST `body` to `{base_url}/{command}`, classifying the response the
    /// way `TrackerRequest.handle_response` does.
    pub async fn post(
        &self,
        command: &str,
        body: serde_json::Value,
        retry_delay: Duration,
    ) -> Result<TrackerOutcome, TrackerError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), command);
        let sent = self
            .http
            .post(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                return Ok(TrackerOutcome::Retry {
                    message: format!("No HTTP response received from tracker ({e}). "),
                    delay: retry_delay,
                });
            }
        };

        let status = response.status();
        if status.is_success() {
            let text = response.text().await.map_err(TrackerError::Body)?;
            return Ok(TrackerOutcome::Ok(text));
        }

        Ok(TrackerOutcome::Retry {
            message: classify_status(status.as_u16()),
            delay: retry_delay,
        })
    }
}

/// Mirrors the status-code ladder in `TrackerRequest.handle_response`.
fn classify_status(status: u16) -> String {
    match status {
        420 | 429 => "Tracker rate limiting is in effect. ".to_string(),
        404 => "No item received. ".to_string(),
        455 => "Project code is out of date and needs to be upgraded. ".to_string(),
        599 => "No HTTP response received from tracker. ".to_string(),
        other => format!("Tracker returned status code {other}. \n"),
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
