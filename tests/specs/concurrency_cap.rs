// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8: `--concurrent N` bounds how many items run at once. Four
//! items that each sleep 300ms under a cap of two should take roughly two
//! batches (~600ms), not one fully-parallel batch (~300ms) and not four
//! fully-serial ones (~1200ms).

use crate::prelude::Project;
use std::time::{Duration, Instant};

#[test]
fn concurrent_flag_bounds_how_many_items_run_at_once() {
    let project = Project::empty();
    let pipeline_file = project.pipeline(
        "pipeline.toml",
        r#"
[[task]]
kind = "external_process"
name = "Sleep"
args = ["sh", "-c", "sleep 0.3"]
"#,
    );

    let started = Instant::now();
    project
        .warrior(&pipeline_file, "spectester")
        .arg("--concurrent")
        .arg("2")
        .arg("--max-items")
        .arg("4")
        .timeout(Duration::from_secs(10))
        .assert()
        .success();
    let elapsed = started.elapsed();

    assert!(
        elapsed >= Duration::from_millis(500),
        "four 300ms items under a cap of two should take at least two batches, took {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_millis(1100),
        "a cap of two on four items should be well under fully-serial execution, took {elapsed:?}"
    );
}
