// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with output streamed straight to an item's log.
//!
//! Mirrors `seesaw/externalprocess.py`'s `ExternalProcess.process`: a pty
//! in the original, piped stdout/stderr here, both forwarded to the item
//! line by line as they arrive rather than buffered until exit.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use warrior_core::Item;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {0}: {1}")]
    Spawn(String, std::io::Error),
    #[error("failed to wait on {0}: {1}")]
    Wait(String, std::io::Error),
    #[error("{0} did not expose its stdio pipes")]
    MissingPipes(String),
}

/// A command to run, already realized against the item.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    pub stdin: Option<String>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: Vec::new(),
            cwd: None,
            stdin: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Exited(i32),
    TimedOut,
}

/// Run `spec`, streaming stdout/stderr into `item`'s output log as full
/// lines, and kill it if it outlives `timeout`. Killing on timeout relies
/// on `kill_on_drop`: dropping the in-flight `run_streamed` future drops
/// the child handle it owns.
pub async fn run_with_timeout(
    spec: ProcessSpec,
    item: &Item,
    timeout: Duration,
) -> Result<ProcessOutcome, ProcessError> {
    let program = spec.program.clone();
    match tokio::time::timeout(timeout, run(spec, item)).await {
        Ok(Ok(code)) => Ok(ProcessOutcome::Exited(code)),
        Ok(Err(e)) => Err(e),
        Err(_elapsed) => {
            item.log_output(
                format!("{program} timed out after {}s\n", timeout.as_secs()).as_bytes(),
                true,
            );
            Ok(ProcessOutcome::TimedOut)
        }
    }
}

/// Run `spec` to completion with no timeout, streaming output as it
/// arrives. `ExternalProcess` uses this directly: the engine imposes no
/// wall-clock limit on subprocesses (the rsync/curl subclasses pass their
/// own timeout flags to the binary instead).
pub async fn run(spec: ProcessSpec, item: &Item) -> Result<i32, ProcessError> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| ProcessError::Spawn(spec.program.clone(), e))?;

    match (child.stdin.take(), &spec.stdin) {
        (Some(mut stdin), Some(data)) => {
            let data = data.clone();
            tokio::spawn(async move {
                let _ = stdin.write_all(data.as_bytes()).await;
                let _ = stdin.shutdown().await;
            });
        }
        (Some(stdin), None) => drop(stdin),
        (None, _) => {}
    }

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ProcessError::MissingPipes(spec.program.clone()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| ProcessError::MissingPipes(spec.program.clone()))?;

    let out_item = item.clone();
    let err_item = item.clone();
    let out_task = tokio::spawn(stream_lines(stdout, out_item));
    let err_task = tokio::spawn(stream_lines(stderr, err_item));

    let status = child
        .wait()
        .await
        .map_err(|e| ProcessError::Wait(spec.program.clone(), e))?;
    let _ = out_task.await;
    let _ = err_task.await;

    Ok(status.code().unwrap_or(-1))
}

async fn stream_lines(pipe: impl tokio::io::AsyncRead + Unpin, item: Item) {
    let mut lines = BufReader::new(pipe).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => item.log_output(line.as_bytes(), true),
            Ok(None) | Err(_) => break,
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
