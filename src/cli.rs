// src/cli.rs

//! CLI argument parsing using `clap` (derive feature).

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `pipewright`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipewright",
    version,
    about = "Build, watch, serve and publish a front-end asset tree.",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the config file (TOML).
    ///
    /// Default: `Pipewright.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Pipewright.toml", global = true)]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPEWRIGHT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task graph, but don't execute anything.
    #[arg(long, global = true)]
    pub dry_run: bool,
}

/// Operator-facing entry points.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the full pipeline once (or a single named task).
    Build {
        /// Task to run instead of the aggregate `build` task.
        #[arg(value_name = "TASK")]
        task: Option<String>,
    },
    /// Watch input patterns and re-run affected tasks until Ctrl-C.
    Watch,
    /// Watch, plus a local preview server over the output directory.
    Serve,
    /// Run `build`, then publish the output via the configured command.
    Deploy,
    /// Remove generated output directories.
    Clean,
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
