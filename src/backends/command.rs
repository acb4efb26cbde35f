// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Command runner abstraction for invoking external tools.
//!
//! `CommandRunner` is the seam collaborators use to spawn `docker`, `git` and
//! `kubectl`. `ProcessRunner` is the production implementation; the scripted
//! `MockRunner` lives in [`crate::backends::mock`].

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::Context as _;
use async_trait::async_trait;

use crate::engine::Context;
use crate::observability::messages::node::CommandSpawned;
use crate::observability::messages::StructuredLog;

/// A program invocation: program, arguments and optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Trait for executing external commands.
///
/// `run` only fails when the command could not be executed at all (missing
/// program, cancellation). A non-zero exit is returned as a normal
/// [`CommandOutput`] so satisfied checks can treat it as "no".
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, ctx: &Context, cmd: &CommandSpec) -> anyhow::Result<CommandOutput>;

    /// Run `cmd` and fail unless it exits successfully.
    async fn run_checked(&self, ctx: &Context, cmd: &CommandSpec) -> anyhow::Result<CommandOutput> {
        let output = self.run(ctx, cmd).await?;
        if !output.success() {
            let status = output
                .status
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string());
            anyhow::bail!(
                "'{}' exited with status {}: {}",
                cmd,
                status,
                output.stderr.trim()
            );
        }
        Ok(output)
    }
}

/// Production runner backed by `tokio::process`.
///
/// The child is raced against the context; on cancellation the child is
/// killed (`kill_on_drop`) and the call fails.
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, ctx: &Context, cmd: &CommandSpec) -> anyhow::Result<CommandOutput> {
        CommandSpawned {
            program: &cmd.program,
            args: &cmd.args,
        }
        .log();

        let mut command = tokio::process::Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &cmd.cwd {
            command.current_dir(dir);
        }

        let child = command
            .spawn()
            .with_context(|| format!("failed to spawn '{}'", cmd.program))?;

        let output = tokio::select! {
            output = child.wait_with_output() => {
                output.with_context(|| format!("failed to wait for '{}'", cmd))?
            }
            _ = ctx.cancelled() => {
                anyhow::bail!("'{}' interrupted by cancellation", cmd);
            }
        };

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::MockRunner;

    #[tokio::test]
    async fn test_mock_runner_records_and_matches_prefix() {
        let runner = MockRunner::new()
            .respond("docker manifest inspect", CommandOutput::failed(1, "no such manifest"));
        let ctx = Context::new();

        let inspect = CommandSpec::new("docker").args(["manifest", "inspect", "r/app:1"]);
        let output = runner.run(&ctx, &inspect).await.unwrap();
        assert!(!output.success());

        let push = CommandSpec::new("docker").args(["push", "r/app:1"]);
        assert!(runner.run(&ctx, &push).await.unwrap().success());

        assert_eq!(
            runner.executed_lines(),
            vec!["docker manifest inspect r/app:1", "docker push r/app:1"]
        );
    }

    #[tokio::test]
    async fn test_run_checked_reports_status_and_stderr() {
        let runner = MockRunner::new().respond("kubectl", CommandOutput::failed(2, "forbidden\n"));
        let cmd = CommandSpec::new("kubectl").args(["apply", "-f", "web.yaml"]);

        let err = runner
            .run_checked(&Context::new(), &cmd)
            .await
            .expect_err("non-zero exit should fail");

        assert_eq!(
            err.to_string(),
            "'kubectl apply -f web.yaml' exited with status 2: forbidden"
        );
    }

    #[tokio::test]
    async fn test_mock_runner_spawn_failure() {
        let runner = MockRunner::new().fail("git", "git: command not found");
        let err = runner
            .run(&Context::new(), &CommandSpec::new("git").arg("status"))
            .await
            .expect_err("spawn failure should error");
        assert_eq!(err.to_string(), "git: command not found");
    }

    #[tokio::test]
    async fn test_process_runner_missing_program() {
        let cmd = CommandSpec::new("rigging-definitely-not-a-real-program");
        let err = ProcessRunner
            .run(&Context::new(), &cmd)
            .await
            .expect_err("missing program should fail to spawn");
        assert!(err.to_string().contains("failed to spawn"));
    }

    #[test]
    fn test_command_spec_display() {
        let cmd = CommandSpec::new("git")
            .args(["-C", "/src/shop"])
            .arg("fetch")
            .current_dir("/tmp");
        assert_eq!(cmd.to_string(), "git -C /src/shop fetch");
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
    }
}
