// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8: a task that always fails is retried up to `max_tries` and
//! no further — the item fails, but the `warrior` process itself still
//! exits 0 (item-level failures never set a nonzero exit code).

use crate::prelude::Project;
use std::time::Duration;

#[test]
fn a_task_that_always_fails_is_retried_exactly_max_tries_times() {
    let project = Project::empty();
    let attempts_log = project.path().join("attempts.log");
    let pipeline_file = project.pipeline(
        "pipeline.toml",
        &format!(
            r#"
[[task]]
kind = "external_process"
name = "AlwaysFails"
args = ["sh", "-c", "echo x >> {attempts}; exit 1"]
max_tries = 3
retry_delay_secs = 0
"#,
            attempts = attempts_log.display(),
        ),
    );

    project
        .warrior(&pipeline_file, "spectester")
        .arg("--max-items")
        .arg("1")
        .timeout(Duration::from_secs(10))
        .assert()
        .success();

    let attempts = std::fs::read_to_string(&attempts_log).expect("the retrying task should have run at least once");
    assert_eq!(attempts.lines().count(), 3, "expected exactly max_tries attempts, got: {attempts:?}");
}
