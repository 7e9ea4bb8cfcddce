// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8: touching the stop file stops the runner from admitting new
//! items, but items already in flight are allowed to finish.

use crate::prelude::{self, Project};
use std::sync::mpsc;
use std::time::Duration;

#[test]
fn touching_the_stop_file_drains_in_flight_items_without_admitting_more() {
    let project = Project::empty();
    let marker = project.path().join("started.log");
    let stop_file = project.path().join("stop");
    let pipeline_file = project.pipeline(
        "pipeline.toml",
        &format!(
            r#"
[[task]]
kind = "external_process"
name = "Tick"
args = ["sh", "-c", "echo x >> {marker}; sleep 0.1"]
"#,
            marker = marker.display(),
        ),
    );

    let mut cmd = project.warrior(&pipeline_file, "spectester");
    cmd.arg("--concurrent").arg("1").arg("--stop-file").arg(&stop_file);
    let mut child = prelude::spawn(&mut cmd).expect("the warrior process should start");

    // Let a couple of items start before asking the runner to stop.
    std::thread::sleep(Duration::from_millis(250));
    std::fs::write(&stop_file, "stop").expect("writing the stop file should not fail");

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(child.wait());
    });

    let status = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("the runner should exit shortly after the stop file is touched")
        .expect("waiting on the child process should not fail");
    assert!(status.success(), "graceful stop should still exit 0");

    let started = std::fs::read_to_string(&marker).expect("at least one item should have started");
    let started_count = started.lines().count();
    assert!(started_count >= 1, "expected at least one item to start before the stop file was touched");
    assert!(
        started_count < 50,
        "the runner kept admitting items well past the stop signal: {started_count} started"
    );
}
