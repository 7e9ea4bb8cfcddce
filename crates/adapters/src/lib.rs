// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: subprocess supervision, the tracker HTTP
//! client, and stop-file detection.

pub mod process;
pub mod stopfile;
pub mod tracker;

pub use process::{ProcessError, ProcessOutcome, ProcessSpec};
pub use stopfile::StopFile;
pub use tracker::{TrackerClient, TrackerError, TrackerOutcome};
