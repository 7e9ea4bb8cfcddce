// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess supervision with retry/backoff (spec §4.3 "ExternalProcess").
//!
//! Grounded on `seesaw/externalprocess.py`'s `ExternalProcess` /
//! `WgetDownload` / `RsyncUpload`: argv and stdin are realized fresh on
//! every attempt, output streams straight into the item's log, and a
//! rejected exit code is retried up to `max_tries` with a fixed delay.

use crate::error::TaskError;
use crate::task::{Task, TaskOutcome};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use warrior_adapters::process::{self, ProcessSpec};
use warrior_core::{Item, Realize};

type StdinProvider = dyn Fn(&Item) -> Result<String, TaskError> + Send + Sync;

/// Subprocess stage. `args[0]` is the program, the rest are its
/// arguments; every element is realized fresh on each attempt.
pub struct ExternalProcess {
    name: String,
    args: Vec<Realize>,
    env: Vec<(Realize, Realize)>,
    stdin: Option<Arc<StdinProvider>>,
    max_tries: Option<u32>,
    retry_delay: Duration,
    accept_on_exit_code: Vec<i32>,
    retry_on_exit_code: Option<Vec<i32>>,
}

impl ExternalProcess {
    pub fn new(name: impl Into<String>, args: Vec<Realize>) -> Self {
        Self {
            name: name.into(),
            args,
            env: Vec::new(),
            stdin: None,
            max_tries: Some(1),
            retry_delay: Duration::from_secs(30),
            accept_on_exit_code: vec![0],
            retry_on_exit_code: None,
        }
    }

    pub fn with_env(mut self, env: Vec<(Realize, Realize)>) -> Self {
        self.env = env;
        self
    }

    pub fn with_stdin(mut self, provider: impl Fn(&Item) -> Result<String, TaskError> + Send + Sync + 'static) -> Self {
        self.stdin = Some(Arc::new(provider));
        self
    }

    pub fn with_max_tries(mut self, max_tries: Option<u32>) -> Self {
        self.max_tries = max_tries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_accept_on_exit_code(mut self, codes: Vec<i32>) -> Self {
        self.accept_on_exit_code = codes;
        self
    }

    pub fn with_retry_on_exit_code(mut self, codes: Option<Vec<i32>>) -> Self {
        self.retry_on_exit_code = codes;
        self
    }

    /// `WgetDownload` — a plain `ExternalProcess` with the base class's
    /// empty stdin, kept as a named constructor for readability.
    pub fn download(name: impl Into<String>, args: Vec<Realize>) -> Self {
        Self::new(name, args)
    }

    /// `RsyncUpload` — builds the fixed rsync argv and a `--files-from=-`
    /// stdin stream of paths relative to `target_source_path`.
    pub fn rsync_upload(
        target: Realize,
        files: Vec<Realize>,
        target_source_path: Realize,
        bwlimit: Realize,
        max_tries: Option<u32>,
    ) -> Self {
        let args = vec![
            Realize::literal("rsync"),
            Realize::literal("-avz"),
            Realize::literal("--compress-level=9"),
            Realize::literal("--progress"),
            Realize::literal("--bwlimit"),
            bwlimit,
            Realize::literal("--files-from=-"),
            target_source_path.clone(),
            target,
        ];
        let base = target_source_path;
        Self::new("RsyncUpload", args)
            .with_max_tries(max_tries)
            .with_stdin(move |item| {
                let base_path = PathBuf::from(base.realize_string(item)?);
                let mut out = String::new();
                for file in &files {
                    let realized = file.realize_string(item)?;
                    let relative = relative_path(Path::new(&realized), &base_path);
                    out.push_str(&relative.to_string_lossy());
                    out.push('\n');
                }
                Ok(out)
            })
    }

    /// Single-file upload via curl with speed/time limits, per spec §4.3's
    /// "single-file upload wrapper using curl with speed/time limits".
    pub fn curl_upload(target: Realize, file: Realize, max_tries: Option<u32>) -> Self {
        let args = vec![
            Realize::literal("curl"),
            Realize::literal("--silent"),
            Realize::literal("--show-error"),
            Realize::literal("--speed-limit"),
            Realize::literal("1"),
            Realize::literal("--speed-time"),
            Realize::literal("900"),
            Realize::literal("--upload-file"),
            file,
            target,
        ];
        Self::new("CurlUpload", args).with_max_tries(max_tries)
    }

    fn build_spec(&self, item: &Item) -> Result<(ProcessSpec, bool), TaskError> {
        let mut argv = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            argv.push(arg.realize_string(item)?);
        }
        if argv.is_empty() {
            return Err(TaskError::Simple(format!("{}: empty argv", self.name)));
        }
        let program = argv.remove(0);

        let mut env = Vec::with_capacity(self.env.len());
        for (key, value) in &self.env {
            env.push((key.realize_string(item)?, value.realize_string(item)?));
        }

        let (stdin, stdin_ok) = match &self.stdin {
            None => (None, true),
            Some(provider) => match provider(item) {
                Ok(data) => (Some(data), true),
                Err(e) => {
                    item.log_error(&self.name, &e);
                    (None, false)
                }
            },
        };

        let mut spec = ProcessSpec::new(program, argv);
        spec.env = env;
        spec.stdin = stdin;
        Ok((spec, stdin_ok))
    }
}

#[async_trait]
impl Task for ExternalProcess {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, item: &Item) -> TaskOutcome {
        item.log_output(
            format!("Starting {} for {}\n", self.name, item.description()).as_bytes(),
            true,
        );
        item.set("tries", 0);

        let mut tries: u32 = 0;
        loop {
            let (spec, stdin_ok) = match self.build_spec(item) {
                Ok(pair) => pair,
                Err(e) => {
                    item.log_error(&self.name, &e);
                    item.log_output(format!("Failed {} for {}\n{e}\n", self.name, item.description()).as_bytes(), true);
                    return TaskOutcome::Failed;
                }
            };

            let (code, spawn_failed) = match process::run(spec, item).await {
                Ok(code) => (code, false),
                Err(e) => {
                    item.log_error(&self.name, &e);
                    (-1, true)
                }
            };

            if !spawn_failed && stdin_ok && self.accept_on_exit_code.contains(&code) {
                item.log_output(format!("Finished {} for {}\n", self.name, item.description()).as_bytes(), true);
                return TaskOutcome::Completed;
            }

            tries += 1;
            item.set("tries", tries as i64);
            item.log_error(&self.name, code);
            item.log_output(
                format!("Process {} returned exit code {} for {}\n", self.name, code, item.description()).as_bytes(),
                true,
            );

            let code_retry_eligible = self
                .retry_on_exit_code
                .as_ref()
                .map(|codes| codes.contains(&code))
                .unwrap_or(true);
            let retry_eligible = code_retry_eligible || !stdin_ok || spawn_failed;
            let tries_remaining = self.max_tries.map(|max| tries < max).unwrap_or(true);

            if tries_remaining && retry_eligible {
                item.log_output(
                    format!(
                        "Retrying {} for {} after {}s...\n",
                        self.name,
                        item.description(),
                        self.retry_delay.as_secs()
                    )
                    .as_bytes(),
                    true,
                );
                tokio::time::sleep(self.retry_delay).await;
                continue;
            }

            item.log_output(format!("Failed {} for {}\n", self.name, item.description()).as_bytes(), true);
            return TaskOutcome::Failed;
        }
    }
}

/// Minimal `os.path.relpath`-equivalent: strips the common prefix shared
/// with `base` and walks `..` for whatever of `base` remains. Good enough
/// for the file lists a pipeline author realistically passes to rsync —
/// both paths are expected to be within the item's own data directory.
fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path_components: Vec<_> = path.components().collect();
    let base_components: Vec<_> = base.components().collect();

    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..base_components.len() {
        result.push("..");
    }
    for component in &path_components[common..] {
        result.push(component.as_os_str());
    }
    if result.as_os_str().is_empty() {
        result.push(".");
    }
    result
}

#[cfg(test)]
#[path = "external_process_tests.rs"]
mod tests;
