// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers for the black-box `warrior` specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// A temporary project directory holding a pipeline file and a data dir.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().expect("tempdir should be creatable") }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.path().join("data")
    }

    /// Write a pipeline description file under the project and return its path.
    pub fn pipeline(&self, name: &str, toml: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, toml).expect("writing a pipeline file should not fail");
        path
    }

    /// Write an arbitrary file under the project (parent dirs created).
    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("creating parent dirs should not fail");
        }
        std::fs::write(full_path, content).expect("writing a file should not fail");
    }

    /// Build a `warrior run` invocation scoped to this project's data dir.
    pub fn warrior(&self, pipeline_file: &Path, downloader: &str) -> Command {
        let mut cmd = warrior();
        cmd.arg("run").arg(pipeline_file).arg(downloader).arg("--data-dir").arg(self.data_dir());
        cmd
    }
}

/// Returns a bare `Command` for the `warrior` binary under test.
pub fn warrior() -> Command {
    Command::cargo_bin("warrior").expect("the warrior binary should build for the spec suite")
}

/// Spawns an `assert_cmd::Command` as a background child process.
///
/// `assert_cmd::Command::spawn` is private, so this rebuilds an equivalent
/// `std::process::Command` from the public accessors and spawns that instead.
pub fn spawn(cmd: &mut Command) -> std::io::Result<std::process::Child> {
    let mut std_cmd = std::process::Command::new(cmd.get_program());
    std_cmd.args(cmd.get_args());
    std_cmd.envs(cmd.get_envs().filter_map(|(k, v)| v.map(|v| (k, v))));
    if let Some(dir) = cmd.get_current_dir() {
        std_cmd.current_dir(dir);
    }
    std_cmd.spawn()
}

/// Poll a condition until it returns true or the timeout elapses.
pub fn wait_for<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}
