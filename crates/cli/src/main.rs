// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! warrior — runs a declarative download pipeline under a concurrency cap
//! (spec.md §6, SPEC_FULL.md §7).
//!
//! The web admin UI, the fleet-level project supervisor, and HQ
//! registration are out of scope (spec §1) and not started here;
//! `--disable-web-server` is accepted for command-line compatibility with
//! existing seesaw-kit invocations and only suppresses the startup banner
//! line.

use anyhow::{bail, Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant, SystemTime};
use warrior_adapters::StopFile;
use warrior_core::{ConfigKind, ConfigScalar, ConfigSlot, Item, ItemId};
use warrior_engine::Runner;
use warrior_pipeline::StepRegistry;

const SIGINT_FORCE_WINDOW: Duration = Duration::from_secs(5);

// Allow expect here as the regex is compile-time verified to be valid.
#[allow(clippy::expect_used)]
static DOWNLOADER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-_a-zA-Z0-9]{3,30}$").expect("constant regex pattern is valid"));

#[derive(Parser, Debug)]
#[command(name = "warrior", version, about = "Runs a declarative download pipeline under a concurrency cap")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Run a pipeline file.
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Path to the pipeline description file (TOML).
    pipeline_file: PathBuf,

    /// Downloader nickname reported to the tracker.
    downloader: String,

    /// Maximum number of items in flight at once.
    #[arg(long)]
    concurrent: Option<i64>,

    /// Stop admitting new items after this many have started.
    #[arg(long)]
    max_items: Option<u64>,

    /// Poll this file's mtime; any change triggers a graceful stop.
    #[arg(long)]
    stop_file: Option<PathBuf>,

    /// Don't delete an item's data directory once it finishes.
    #[arg(long)]
    keep_data: bool,

    /// Accepted for compatibility; the web admin UI is out of scope here.
    #[arg(long)]
    disable_web_server: bool,

    /// NAME=VALUE pairs made available to `custom` pipeline steps.
    #[arg(long = "context-value", value_name = "NAME=VALUE")]
    context_value: Vec<String>,

    /// Root directory under which each item gets its own data directory.
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args).await,
    }
}

fn validate_downloader(downloader: &str) -> Result<()> {
    if !DOWNLOADER_PATTERN.is_match(downloader) {
        bail!("downloader nickname '{downloader}' must match {}", DOWNLOADER_PATTERN.as_str());
    }
    Ok(())
}

fn validate_concurrency(concurrent: Option<i64>) -> Result<i64> {
    let concurrent = concurrent.unwrap_or(1);
    if concurrent > 20 {
        bail!("--concurrent {concurrent} exceeds the hard limit of 20");
    }
    if concurrent > 6 {
        tracing::warn!(concurrent, "running with more than 6 concurrent items; this is unusual for a single warrior");
    }
    Ok(concurrent)
}

fn parse_context_values(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut context = HashMap::new();
    for pair in pairs {
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("--context-value '{pair}' is not in NAME=VALUE form"))?;
        context.insert(name.to_string(), value.to_string());
    }
    Ok(context)
}

/// Built-in steps available to every pipeline file, independent of any
/// project-specific callouts a custom binary might register.
fn register_builtin_steps(registry: &mut StepRegistry, context: HashMap<String, String>) {
    registry.register_custom("apply_context_values", move |item| {
        for (name, value) in &context {
            item.set(format!("context_{name}"), value.clone());
        }
        Ok(())
    });
}

async fn run(args: RunArgs) -> Result<()> {
    validate_downloader(&args.downloader)?;
    let concurrent = validate_concurrency(args.concurrent)?;
    let context = parse_context_values(&args.context_value)?;

    let source = std::fs::read_to_string(&args.pipeline_file)
        .with_context(|| format!("reading pipeline file {}", args.pipeline_file.display()))?;

    let mut registry = StepRegistry::new();
    register_builtin_steps(&mut registry, context);

    let user_agent = format!(
        "ArchiveTeam Warrior/{} warrior-rs (build {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("WARRIOR_BUILD").unwrap_or("dev")
    );

    let pipeline = warrior_pipeline::build(&source, &registry, &user_agent)
        .with_context(|| format!("building pipeline from {}", args.pipeline_file.display()))?;
    let pipeline = Arc::new(pipeline);

    println!("{pipeline}");
    if args.disable_web_server {
        tracing::info!("web interface disabled by --disable-web-server");
    } else {
        tracing::info!("web interface is out of scope for this engine; ignoring");
    }

    let concurrent_items = Arc::new(ConfigSlot::new(
        "concurrent_items",
        "Concurrent items",
        ConfigKind::Number { min: Some(0), max: None },
        ConfigScalar::Num(concurrent),
    ));
    let stop_file = args.stop_file.as_ref().map(|path| StopFile::new(path.clone()));

    let data_dir = args.data_dir.clone();
    let keep_data = args.keep_data;
    let downloader = args.downloader.clone();
    let new_item = move |number: u64| -> Item {
        let mut properties = serde_json::Map::new();
        properties.insert("downloader".to_string(), serde_json::Value::String(downloader.clone()));
        Item::new(
            ItemId::for_sequence(&downloader, number),
            number,
            properties,
            data_dir.join(number.to_string()),
            keep_data,
            SystemTime::now(),
        )
    };

    let (runner, handle) = Runner::new(pipeline.clone(), concurrent_items, args.max_items, stop_file, new_item);

    let last_sigint: Arc<Mutex<Option<Instant>>> = Arc::new(Mutex::new(None));
    let sigint_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            let now = Instant::now();
            let forced = {
                let mut last = last_sigint.lock();
                let within_window = last.map(|t| now.duration_since(t) < SIGINT_FORCE_WINDOW).unwrap_or(false);
                *last = Some(now);
                within_window
            };
            if forced {
                tracing::warn!("second SIGINT within 5s, forcing immediate stop");
                sigint_handle.stop_forcefully();
                std::process::exit(130);
            } else {
                tracing::warn!("SIGINT received, stopping gracefully (press again within 5s to force)");
                sigint_handle.stop_gracefully();
            }
        }
    });

    runner.run().await;
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
