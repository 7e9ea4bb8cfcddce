// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warrior-pipeline: the declarative pipeline description file format
//! and the builder that turns one, plus a project's callout registry,
//! into a live `warrior_engine::Pipeline`.

pub mod build;
pub mod registry;
pub mod spec;

pub use build::{build, PipelineFileError};
pub use registry::StepRegistry;
pub use spec::{ConfigKindSpec, ConfigSpec, PipelineFile, RealizeSpec, StatsGroupSpec, TaskSpec};
