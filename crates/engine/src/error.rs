// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-level error type.

use thiserror::Error;
use warrior_adapters::{ProcessError, TrackerError};
use warrior_core::RealizeError;

/// Error surfaced by a `SimpleTask` body or a realization step inside a
/// task. Corresponds to the "Uncaught exception inside SimpleTask.process"
/// row of the error-handling table: this is caught, logged, and turned
/// into a failed item, never propagated past the task.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    Simple(String),

    #[error(transparent)]
    Realize(#[from] RealizeError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
