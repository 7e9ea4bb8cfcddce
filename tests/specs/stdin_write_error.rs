// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8: an archive upload whose file list references a missing
//! item property can't build its stdin stream; that's treated the same
//! as a rejected exit code (retry-eligible, but here `max_tries = 1`
//! exhausts on the first attempt) rather than a panic. A nonzero
//! `retry_delay_secs` isn't exposed on `archive_upload`, so `max_tries`
//! is kept at 1 to avoid waiting out the engine's default 30s backoff.

use crate::prelude::Project;
use std::time::Duration;

#[test]
fn a_stdin_realization_failure_fails_the_item_without_crashing_the_runner() {
    let project = Project::empty();
    let pipeline_file = project.pipeline(
        "pipeline.toml",
        r#"
[[task]]
kind = "archive_upload"
target = "rsync://example.invalid/incoming/"
files = [ { item = "no_such_property" } ]
target_source_path = "."
max_tries = 1
"#,
    );

    project
        .warrior(&pipeline_file, "spectester")
        .arg("--max-items")
        .arg("1")
        .timeout(Duration::from_secs(10))
        .assert()
        .success();
}
