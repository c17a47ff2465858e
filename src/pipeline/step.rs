// src/pipeline/step.rs

//! Pipeline steps: named content transforms.
//!
//! A step is polymorphic over "transform content, optionally reporting a
//! step-local error". The runner treats a step error as per-file: it logs,
//! skips that file, and moves on to siblings. The crate ships one
//! implementation, [`ToolStep`], which delegates the actual transformation
//! to an external command (sass, babel, uglifyjs, an image optimizer, ...)
//! by piping the file content through stdin/stdout.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// One matched file flowing through a pipeline: its base-relative path and
/// current content (updated after each step).
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub rel_path: PathBuf,
    pub content: Vec<u8>,
}

/// Completion signal of a step application.
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;

/// A single content transform in a pipeline.
pub trait PipelineStep: Send + Sync {
    /// Human-readable step name for logs.
    fn name(&self) -> &str;

    /// Transform the file's content, returning the new content or a
    /// step-local error.
    fn apply<'a>(&'a self, file: &'a SourceFile) -> StepFuture<'a>;
}

/// A step backed by an external command.
///
/// The command receives the file content on stdin and must write the
/// transformed content to stdout. Non-zero exit is a step failure carrying
/// the captured stderr.
#[derive(Debug, Clone)]
pub struct ToolStep {
    command: String,
}

impl ToolStep {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl PipelineStep for ToolStep {
    fn name(&self) -> &str {
        &self.command
    }

    fn apply<'a>(&'a self, file: &'a SourceFile) -> StepFuture<'a> {
        Box::pin(self.run_tool(file))
    }
}

impl ToolStep {
    async fn run_tool(&self, file: &SourceFile) -> Result<Vec<u8>> {
        // Build a shell command appropriate for the platform.
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.command);
            c
        };

        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning step '{}'", self.command))?;

        let mut stdin = child
            .stdin
            .take()
            .with_context(|| format!("no stdin handle for step '{}'", self.command))?;

        // Feed stdin on a separate task so a tool that writes a lot of
        // output before reading all of its input cannot deadlock us.
        let content = file.content.clone();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&content).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("waiting for step '{}'", self.command))?;

        // A tool may exit before consuming all of its input (e.g. a linter
        // that fails fast); the exit status is the verdict that matters.
        let _ = writer.await;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.is_empty() {
                bail!(
                    "step '{}' failed for {} (exit code {code})",
                    self.command,
                    file.rel_path.display()
                );
            }
            bail!(
                "step '{}' failed for {} (exit code {code}): {stderr}",
                self.command,
                file.rel_path.display()
            );
        }

        Ok(output.stdout)
    }
}
