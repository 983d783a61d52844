// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `dmake`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dmake",
    version,
    about = "Distributed make: run a rule file's task DAG across worker processes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the broker config file (TOML).
    ///
    /// Default: `DMAKE_CONFIG` or `Dmake.toml` in the current working
    /// directory, falling back to built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DMAKE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Dispatch a build (the master role).
    Run {
        /// The rule file to use.
        ///
        /// Default: the first of `GNU-makefile`, `makefile`, `Makefile`
        /// present in the working directory.
        #[arg(short = 'f', long = "file", value_name = "PATH")]
        file: Option<PathBuf>,

        /// The target to create. Defaults to the first declared target.
        target: Option<String>,

        /// Return right after dispatching the leaves instead of blocking
        /// until the build completes.
        #[arg(short = 'a', long = "async")]
        async_mode: bool,
    },

    /// Process tasks from the queue (the worker role). Runs until stopped.
    Worker {
        /// Maximum concurrent tasks; overrides `[worker].concurrency`.
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,
    },

    /// Print the parsed task graph in DOT format.
    Graph {
        /// The rule file to use (same default as `run`).
        #[arg(short = 'f', long = "file", value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Append the last build's wall-clock duration to a results file.
    Report {
        #[arg(value_name = "PATH", default_value = "results.log")]
        result_file: PathBuf,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
