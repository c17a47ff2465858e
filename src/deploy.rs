// src/deploy.rs

//! Publish hook: hand the built output tree to an external command.
//!
//! The transport (rsync, scp, a gh-pages helper, ...) is entirely the
//! command's business; pipewright only runs it from the project root after
//! a successful build and surfaces its exit status.

use std::path::Path;
use std::process::Stdio;

use anyhow::{anyhow, Context};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::Result;

/// Run the configured publish command in `root`, streaming its output into
/// the log. Non-zero exit fails the deploy.
pub async fn publish(root: &Path, command: &str) -> Result<()> {
    info!(cmd = command, "publishing output");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    };

    cmd.current_dir(root)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning deploy command '{command}'"))?;

    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!("deploy: {line}");
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("deploy stderr: {line}");
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for deploy command '{command}'"))?;

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        warn!(exit_code = code, "deploy command failed");
        return Err(anyhow!("deploy command exited with code {code}").into());
    }

    info!("deploy finished");
    Ok(())
}
