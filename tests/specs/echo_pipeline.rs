// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8: a one-task pipeline that shells out and writes a file
//! completes with exit code 0 and prints the pipeline banner.

use crate::prelude::Project;

#[test]
fn running_a_single_external_process_pipeline_succeeds_and_prints_the_banner() {
    let project = Project::empty();
    let marker = project.path().join("echoed.txt");
    let pipeline_file = project.pipeline(
        "pipeline.toml",
        r#"
[[task]]
kind = "custom"
name = "apply_context_values"

[[task]]
kind = "external_process"
name = "Echo"
args = [
    "sh",
    "-c",
    { template = "echo hello > %(context_marker)s" },
]
"#,
    );

    project
        .warrior(&pipeline_file, "spectester")
        .arg("--context-value")
        .arg(format!("marker={}", marker.display()))
        .arg("--max-items")
        .arg("1")
        .assert()
        .success()
        .stdout(predicates::str::contains("Pipeline:"));

    let contents = std::fs::read_to_string(&marker).expect("the echoed file should have been written");
    assert_eq!(contents.trim(), "hello");
}
