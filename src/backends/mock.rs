// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scripted [`CommandRunner`] for tests.
//!
//! Compiled for this crate's tests, and for downstream tests through the
//! `testing` feature.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::backends::command::{CommandOutput, CommandRunner, CommandSpec};
use crate::engine::Context;

/// Test-double runner that records commands and returns scripted outputs.
///
/// Responses are matched by prefix against the rendered command line; the
/// first matching rule wins. Unmatched commands succeed with empty output.
#[derive(Default)]
pub struct MockRunner {
    rules: Vec<(String, Result<CommandOutput, String>)>,
    commands: Mutex<Vec<CommandSpec>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to commands starting with `prefix` with `output`.
    pub fn respond(mut self, prefix: impl Into<String>, output: CommandOutput) -> Self {
        self.rules.push((prefix.into(), Ok(output)));
        self
    }

    /// Fail commands starting with `prefix` as if they could not be spawned.
    pub fn fail(mut self, prefix: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push((prefix.into(), Err(message.into())));
        self
    }

    pub fn executed(&self) -> Vec<CommandSpec> {
        match self.commands.lock() {
            Ok(commands) => commands.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Executed commands rendered as command lines.
    pub fn executed_lines(&self) -> Vec<String> {
        self.executed().iter().map(ToString::to_string).collect()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, _ctx: &Context, cmd: &CommandSpec) -> anyhow::Result<CommandOutput> {
        match self.commands.lock() {
            Ok(mut commands) => commands.push(cmd.clone()),
            Err(poisoned) => poisoned.into_inner().push(cmd.clone()),
        }

        let line = cmd.to_string();
        match self.rules.iter().find(|(prefix, _)| line.starts_with(prefix.as_str())) {
            Some((_, Ok(output))) => Ok(output.clone()),
            Some((_, Err(message))) => Err(anyhow::anyhow!(message.clone())),
            None => Ok(CommandOutput::ok("")),
        }
    }
}
