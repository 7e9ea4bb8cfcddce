// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8: referencing a binary that doesn't exist fails the one
//! attempt immediately (no retry delay, since `max_tries` defaults to 1)
//! and the `warrior` process still exits 0.

use crate::prelude::Project;
use std::time::{Duration, Instant};

#[test]
fn a_nonexistent_program_fails_fast_without_crashing_the_runner() {
    let project = Project::empty();
    let pipeline_file = project.pipeline(
        "pipeline.toml",
        r#"
[[task]]
kind = "external_process"
name = "Phantom"
args = ["warrior-spec-test-no-such-binary-9f3c"]
"#,
    );

    let started = Instant::now();
    project
        .warrior(&pipeline_file, "spectester")
        .arg("--max-items")
        .arg("1")
        .timeout(Duration::from_secs(10))
        .assert()
        .success();

    assert!(
        started.elapsed() < Duration::from_secs(5),
        "a single failed spawn attempt should not wait out a retry delay"
    );
}
