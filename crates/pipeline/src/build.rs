// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a parsed [`PipelineFile`] plus a [`StepRegistry`] into a live
//! `Pipeline` (SPEC_FULL.md §6).

use crate::registry::StepRegistry;
use crate::spec::{ConfigKindSpec, ConfigSpec, PipelineFile, RealizeSpec, StatsGroupSpec, TaskSpec};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use warrior_adapters::TrackerClient;
use warrior_core::{ConfigKind, ConfigScalar, ConfigSlot, Realize};
use warrior_engine::{ConditionalTask, ExternalProcess, LimitConcurrent, Pipeline, SimpleTask, Task, TaskError, TrackerRequest};

#[derive(Debug, Error)]
pub enum PipelineFileError {
    #[error("failed to parse pipeline file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown custom step '{0}'")]
    UnknownCustom(String),

    #[error("unknown predicate '{0}'")]
    UnknownPredicate(String),

    #[error("config slot '{name}' was declared more than once with incompatible kinds")]
    ConflictingConfigKind { name: String },

    #[error("config slot '{name}' has an invalid default: {reason}")]
    InvalidConfigDefault { name: String, reason: String },
}

/// Tracks config slots by name so two references to the same slot (e.g.
/// `bwlimit` used by both a `set_item_key` and an `archive_upload` task)
/// share one `Arc<ConfigSlot>` — the first declaration wins.
#[derive(Default)]
struct ConfigRegistry {
    slots: HashMap<String, Arc<ConfigSlot>>,
}

impl ConfigRegistry {
    fn resolve(&mut self, spec: &ConfigSpec) -> Result<Arc<ConfigSlot>, PipelineFileError> {
        if let Some(existing) = self.slots.get(&spec.name) {
            return Ok(existing.clone());
        }

        let kind = match spec.kind {
            ConfigKindSpec::String => ConfigKind::String { regex: spec.regex.clone() },
            ConfigKindSpec::Number => ConfigKind::Number { min: spec.min, max: spec.max },
        };
        let default = match (&spec.kind, &spec.default) {
            (ConfigKindSpec::String, toml::Value::String(s)) => ConfigScalar::Str(s.clone()),
            (ConfigKindSpec::Number, toml::Value::Integer(n)) => ConfigScalar::Num(*n),
            _ => {
                return Err(PipelineFileError::InvalidConfigDefault {
                    name: spec.name.clone(),
                    reason: "default does not match the declared kind".to_string(),
                })
            }
        };

        let slot = Arc::new(ConfigSlot::new(
            spec.name.clone(),
            spec.title.clone().unwrap_or_else(|| spec.name.clone()),
            kind,
            default,
        ));
        self.slots.insert(spec.name.clone(), slot.clone());
        Ok(slot)
    }
}

fn toml_to_json(value: &toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s.clone()),
        toml::Value::Integer(n) => serde_json::Value::from(*n),
        toml::Value::Float(n) => serde_json::Value::from(*n),
        toml::Value::Boolean(b) => serde_json::Value::Bool(*b),
        toml::Value::Datetime(d) => serde_json::Value::String(d.to_string()),
        toml::Value::Array(items) => serde_json::Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            let mut map = serde_json::Map::new();
            for (key, value) in table {
                map.insert(key.clone(), toml_to_json(value));
            }
            serde_json::Value::Object(map)
        }
    }
}

fn realize(spec: &RealizeSpec, configs: &mut ConfigRegistry) -> Result<Realize, PipelineFileError> {
    Ok(match spec {
        RealizeSpec::Literal(value) => Realize::Literal(toml_to_json(value)),
        RealizeSpec::Item { item } => Realize::item_value(item.clone()),
        RealizeSpec::Template { template } => Realize::template(template.clone()),
        RealizeSpec::Config { config } => Realize::Config(configs.resolve(config)?),
    })
}

fn realize_vec(specs: &[RealizeSpec], configs: &mut ConfigRegistry) -> Result<Vec<Realize>, PipelineFileError> {
    specs.iter().map(|spec| realize(spec, configs)).collect()
}

fn prepare_stats_body(groups: &[StatsGroupSpec], configs: &mut ConfigRegistry) -> Result<impl Fn(&warrior_core::Item) -> Result<(), TaskError> + Send + Sync + 'static, PipelineFileError> {
    let mut realized_groups = Vec::with_capacity(groups.len());
    for group in groups {
        realized_groups.push((group.name.clone(), realize_vec(&group.files, configs)?));
    }
    Ok(move |item: &warrior_core::Item| -> Result<(), TaskError> {
        let mut stats = serde_json::Map::new();
        for (name, files) in &realized_groups {
            let mut total: u64 = 0;
            for file in files {
                let path = file.realize_string(item)?;
                if let Ok(metadata) = std::fs::metadata(&path) {
                    total += metadata.len();
                }
            }
            stats.insert(name.clone(), serde_json::Value::from(total));
        }
        item.set("stats", serde_json::Value::Object(stats));
        Ok(())
    })
}

fn build_task(
    spec: &TaskSpec,
    registry: &StepRegistry,
    configs: &mut ConfigRegistry,
    user_agent: &str,
) -> Result<Arc<dyn Task>, PipelineFileError> {
    Ok(match spec {
        TaskSpec::SetItemKey { key, value } => {
            Arc::new(SimpleTask::set_item_key_realized(key.clone(), realize(value, configs)?))
        }
        TaskSpec::PrintItem {} => Arc::new(SimpleTask::print_item()),
        TaskSpec::PrepareStats { groups } => {
            let body = prepare_stats_body(groups, configs)?;
            Arc::new(SimpleTask::new("PrepareStats", body))
        }
        TaskSpec::ExternalProcess {
            name,
            args,
            env,
            max_tries,
            retry_delay_secs,
            accept_on_exit_code,
            retry_on_exit_code,
        } => {
            let mut task = ExternalProcess::new(name.clone(), realize_vec(args, configs)?);
            if !env.is_empty() {
                let mut realized_env = Vec::with_capacity(env.len());
                for (key, value) in env {
                    realized_env.push((realize(key, configs)?, realize(value, configs)?));
                }
                task = task.with_env(realized_env);
            }
            if let Some(max_tries) = max_tries {
                task = task.with_max_tries(Some(*max_tries));
            }
            if let Some(delay) = retry_delay_secs {
                task = task.with_retry_delay(std::time::Duration::from_secs(*delay));
            }
            if let Some(codes) = accept_on_exit_code {
                task = task.with_accept_on_exit_code(codes.clone());
            }
            if let Some(codes) = retry_on_exit_code {
                task = task.with_retry_on_exit_code(Some(codes.clone()));
            }
            Arc::new(task)
        }
        TaskSpec::ArchiveUpload {
            target,
            files,
            target_source_path,
            bwlimit,
            max_tries,
        } => {
            let bwlimit = match bwlimit {
                Some(spec) => realize(spec, configs)?,
                None => Realize::literal(0i64),
            };
            Arc::new(ExternalProcess::rsync_upload(
                realize(target, configs)?,
                realize_vec(files, configs)?,
                realize(target_source_path, configs)?,
                bwlimit,
                *max_tries,
            ))
        }
        TaskSpec::FileUpload { target, file, max_tries } => Arc::new(ExternalProcess::curl_upload(
            realize(target, configs)?,
            realize(file, configs)?,
            *max_tries,
        )),
        TaskSpec::TrackerGetItem {
            tracker_url,
            downloader,
            version,
        } => {
            let client = TrackerClient::new(tracker_url.clone(), user_agent.to_string());
            let version = version.as_ref().map(|v| realize(v, configs)).transpose()?;
            Arc::new(TrackerRequest::get_item(client, realize(downloader, configs)?, version))
        }
        TaskSpec::TrackerSendDone { tracker_url, stats } => {
            let client = TrackerClient::new(tracker_url.clone(), user_agent.to_string());
            Arc::new(TrackerRequest::send_done(client, realize(stats, configs)?))
        }
        TaskSpec::TrackerUpload {
            tracker_url,
            downloader,
            version,
        } => {
            let client = TrackerClient::new(tracker_url.clone(), user_agent.to_string());
            let version = version.as_ref().map(|v| realize(v, configs)).transpose()?;
            Arc::new(TrackerRequest::upload(client, realize(downloader, configs)?, version))
        }
        TaskSpec::LimitConcurrent { max_concurrent, inner } => {
            let inner = build_task(inner, registry, configs, user_agent)?;
            Arc::new(LimitConcurrent::new(realize(max_concurrent, configs)?, inner))
        }
        TaskSpec::Conditional { predicate, inner } => {
            let predicate_fn = registry
                .predicate(predicate)
                .ok_or_else(|| PipelineFileError::UnknownPredicate(predicate.clone()))?;
            let inner = build_task(inner, registry, configs, user_agent)?;
            Arc::new(ConditionalTask::new(move |item| predicate_fn(item), inner))
        }
        TaskSpec::Custom { name } => {
            let body = registry.custom(name).ok_or_else(|| PipelineFileError::UnknownCustom(name.clone()))?;
            Arc::new(SimpleTask::new(name.clone(), move |item| body(item)))
        }
    })
}

/// Parses `source` as a pipeline file and builds a live [`Pipeline`]
/// against it. Unknown `kind`, unknown `custom` name, or unknown
/// `conditional` predicate is a build-time error, never a panic.
pub fn build(source: &str, registry: &StepRegistry, user_agent: &str) -> Result<Pipeline, PipelineFileError> {
    let file: PipelineFile = toml::from_str(source)?;
    let mut configs = ConfigRegistry::default();
    let mut tasks = Vec::with_capacity(file.task.len());
    for spec in &file.task {
        tasks.push(build_task(spec, registry, &mut configs, user_agent)?);
    }
    Ok(Pipeline::new(tasks))
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
