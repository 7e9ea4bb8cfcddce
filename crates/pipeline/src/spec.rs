// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The declarative pipeline description file's on-disk shape (spec §6,
//! SPEC_FULL.md §6).
//!
//! Per the REDESIGN FLAG, pipeline composition is never host-language
//! eval: a pipeline file is data, not code, and every `Realize`-typed
//! field is one of a fixed set of shapes (`RealizeSpec`) rather than an
//! expression.

use serde::Deserialize;

/// A deferred value as written in a pipeline file: a plain scalar
/// (`Literal`), `{ item = "key" }`, `{ template = "..." }`, or a nested
/// `{ config = { ... } }` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RealizeSpec {
    Config { config: ConfigSpec },
    Item { item: String },
    Template { template: String },
    Literal(toml::Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKindSpec {
    String,
    Number,
}

/// A named, independently-editable configuration slot, declared inline
/// wherever it's first referenced.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSpec {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub default: toml::Value,
    pub kind: ConfigKindSpec,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsGroupSpec {
    pub name: String,
    pub files: Vec<RealizeSpec>,
}

/// One `[[task]]` entry. `kind` is the discriminant named in SPEC_FULL.md
/// §6; `limit_concurrent` and `conditional` nest one `inner` task, the
/// file format's only form of composition — there is no branching.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskSpec {
    SetItemKey {
        key: String,
        value: RealizeSpec,
    },
    PrintItem {},
    PrepareStats {
        #[serde(default)]
        groups: Vec<StatsGroupSpec>,
    },
    ExternalProcess {
        name: String,
        args: Vec<RealizeSpec>,
        #[serde(default)]
        env: Vec<(RealizeSpec, RealizeSpec)>,
        #[serde(default)]
        max_tries: Option<u32>,
        #[serde(default)]
        retry_delay_secs: Option<u64>,
        #[serde(default)]
        accept_on_exit_code: Option<Vec<i32>>,
        #[serde(default)]
        retry_on_exit_code: Option<Vec<i32>>,
    },
    ArchiveUpload {
        target: RealizeSpec,
        files: Vec<RealizeSpec>,
        target_source_path: RealizeSpec,
        #[serde(default)]
        bwlimit: Option<RealizeSpec>,
        #[serde(default)]
        max_tries: Option<u32>,
    },
    FileUpload {
        target: RealizeSpec,
        file: RealizeSpec,
        #[serde(default)]
        max_tries: Option<u32>,
    },
    TrackerGetItem {
        tracker_url: String,
        downloader: RealizeSpec,
        #[serde(default)]
        version: Option<RealizeSpec>,
    },
    TrackerSendDone {
        tracker_url: String,
        stats: RealizeSpec,
    },
    TrackerUpload {
        tracker_url: String,
        downloader: RealizeSpec,
        #[serde(default)]
        version: Option<RealizeSpec>,
    },
    LimitConcurrent {
        max_concurrent: RealizeSpec,
        inner: Box<TaskSpec>,
    },
    Conditional {
        predicate: String,
        inner: Box<TaskSpec>,
    },
    Custom {
        name: String,
    },
}

/// The whole pipeline file: an ordered task list plus the user-agent
/// components the tracker client needs (spec.md §6).
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineFile {
    pub task: Vec<TaskSpec>,
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
