// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod deploy;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod project;
pub mod registry;
pub mod serve;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::cli::{CliArgs, Command};
use crate::config::loader::load_and_validate;
use crate::dag::scheduler;
use crate::errors::PipewrightError;
use crate::project::Project;
use crate::watch::dispatcher::start_watch_session;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - registry / scheduler
/// - (optional) file watcher and preview server
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let root = config_root_dir(&config_path);

    let project = Project::assemble(cfg, root)?;

    if args.dry_run {
        project.print_plan();
        return Ok(());
    }

    match args.command {
        Command::Build { task } => {
            let target = task.as_deref().unwrap_or("build");
            let report = scheduler::run(project.registry(), target).await?;
            info!(
                task = target,
                executed = report.executed.len(),
                "build finished"
            );
        }

        Command::Clean => {
            scheduler::run(project.registry(), "clean").await?;
        }

        Command::Watch => {
            let session = start_watch_session(
                project.root().to_path_buf(),
                project.watch_bindings(),
                project.registry().clone(),
            )?;
            info!("watching for changes; press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            info!("shutting down watch session");
            drop(session);
        }

        Command::Serve => {
            let output_dir = project.output_dir();
            if !output_dir.is_dir() {
                return Err(PipewrightError::Config(format!(
                    "output directory {} is missing; run `pipewright build` first",
                    output_dir.display()
                ))
                .into());
            }

            let session = start_watch_session(
                project.root().to_path_buf(),
                project.watch_bindings(),
                project.registry().clone(),
            )?;

            let port = project.config().serve().port;
            tokio::select! {
                res = serve::serve(&output_dir, port) => res?,
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down preview server");
                }
            }
            drop(session);
        }

        Command::Deploy => {
            scheduler::run(project.registry(), "build").await?;

            let Some(cmd) = project.config().deploy().cmd.clone() else {
                return Err(PipewrightError::Config(
                    "deploy requires [deploy].cmd in the config".to_string(),
                )
                .into());
            };
            deploy::publish(project.root(), &cmd).await?;
        }
    }

    Ok(())
}

/// Figure out a sensible project root.
///
/// - If the config path has a non-empty parent (e.g. "site/Pipewright.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Pipewright.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
