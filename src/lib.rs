// src/lib.rs

pub mod cli;
pub mod config;
pub mod coord;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod master;
pub mod queue;
pub mod report;
pub mod rules;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::cli::{CliArgs, Command};
use crate::config::Config;
use crate::coord::{CoordinationStore, RedisStore};
use crate::errors::DmakeError;
use crate::exec::{CommandRunner, ShellRunner};
use crate::master::DispatchMode;
use crate::queue::{RedisQueue, TaskQueue};

/// Rule-file names probed when `-f` is not given, in order.
const DEFAULT_RULE_FILES: &[&str] = &["GNU-makefile", "makefile", "Makefile"];

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = config::load(args.config.as_deref())?;

    match args.command {
        Command::Run {
            file,
            target,
            async_mode,
        } => run_build(&cfg, file, target, async_mode).await,
        Command::Worker { concurrency } => run_worker(&cfg, concurrency).await,
        Command::Graph { file } => print_graph(file),
        Command::Report { result_file } => {
            let store = RedisStore::connect(&cfg.broker.url).await?;
            let duration = report::append_duration(&store, &result_file).await?;
            println!("{duration}");
            Ok(())
        }
    }
}

/// The master role: parse, validate, dispatch.
async fn run_build(
    cfg: &Config,
    file: Option<PathBuf>,
    target: Option<String>,
    async_mode: bool,
) -> Result<()> {
    let Some(text) = load_rule_file(file)? else {
        println!("No makefile was found. Stopping.");
        return Ok(());
    };

    let mut graph = rules::parse(&text)?;
    rules::validate(&graph)?;

    let store = RedisStore::connect(&cfg.broker.url).await?;
    let queue = RedisQueue::connect(&cfg.broker.url, &cfg.broker.queue).await?;

    let mode = if async_mode {
        DispatchMode::Async
    } else {
        DispatchMode::Sync
    };
    let requested = target.unwrap_or_default();

    match master::run(&store, &queue, &mut graph, &requested, mode).await {
        Ok(()) => Ok(()),
        // Unknown or unbuildable targets are user information, not failures.
        Err(DmakeError::TaskNotFound(name)) => {
            println!("No rules found for target '{name}'");
            Ok(())
        }
        Err(DmakeError::NothingToBuild(name)) => {
            println!("Target '{name}' is a file dependency; nothing to build");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// The worker role: process queue deliveries until Ctrl-C.
async fn run_worker(cfg: &Config, concurrency: Option<usize>) -> Result<()> {
    let store: Arc<dyn CoordinationStore> =
        Arc::new(RedisStore::connect(&cfg.broker.url).await?);
    let queue: Arc<dyn TaskQueue> =
        Arc::new(RedisQueue::connect(&cfg.broker.url, &cfg.broker.queue).await?);
    let runner: Arc<dyn CommandRunner> = Arc::new(ShellRunner);

    let concurrency = concurrency.unwrap_or(cfg.worker.concurrency);

    tokio::select! {
        result = exec::run_worker(store, queue, runner, concurrency) => result.map_err(Into::into),
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested; stopping worker");
            Ok(())
        }
    }
}

fn print_graph(file: Option<PathBuf>) -> Result<()> {
    let Some(text) = load_rule_file(file)? else {
        println!("No makefile was found. Stopping.");
        return Ok(());
    };

    let graph = rules::parse(&text)?;
    rules::validate(&graph)?;
    println!("{}", rules::dot::to_dot(&graph));
    Ok(())
}

/// Read the requested rule file, or probe the conventional names when none
/// was given. `Ok(None)` means no file was found (not an error).
fn load_rule_file(file: Option<PathBuf>) -> Result<Option<String>> {
    let path = match file {
        Some(path) => path,
        None => {
            let Some(found) = DEFAULT_RULE_FILES
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            else {
                return Ok(None);
            };
            found
        }
    };

    info!(path = %path.display(), "reading rule file");
    Ok(Some(std::fs::read_to_string(path)?))
}
