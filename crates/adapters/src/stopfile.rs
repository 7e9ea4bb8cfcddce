// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stop-file detection for graceful runner shutdown.
//!
//! Mirrors `seesaw/runner.py`'s `Runner.stop_file_changed`: the file's
//! mtime at construction is the baseline, and the runner is asked to stop
//! once the file exists with a later mtime. Polling the filesystem
//! instead of watching for inotify events is deliberate — warrior data
//! directories are frequently mounted over NFS/SMB, which inotify doesn't
//! see.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Watches one path for the "please stop admitting new items" signal.
pub struct StopFile {
    path: PathBuf,
    initial_mtime: Option<SystemTime>,
}

impl StopFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial_mtime = mtime(&path);
        Self { path, initial_mtime }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once the file exists with an mtime later than when this
    /// watcher was constructed (or, if it didn't exist yet at
    /// construction, as soon as it exists at all).
    pub fn changed(&self) -> bool {
        match (mtime(&self.path), self.initial_mtime) {
            (Some(current), Some(initial)) => current > initial,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
#[path = "stopfile_tests.rs"]
mod tests;
