// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use anyhow::Context as _;
use async_trait::async_trait;
use regex::Regex;

use crate::backends::command::{CommandRunner, CommandSpec};
use crate::backends::git::GitCheckoutConfig;
use crate::engine::Context;
use crate::traits::{Applier, Configuration};

/// A container image that must be present in its registry.
///
/// When the image is built from a git checkout, that checkout is the node's
/// only dependent and is resolved before the image is built.
#[derive(Clone)]
pub struct ImageConfig {
    name: String,
    reference: String,
    context: PathBuf,
    dockerfile: Option<PathBuf>,
    build_args: BTreeMap<String, String>,
    source: Option<GitCheckoutConfig>,
    runner: Arc<dyn CommandRunner>,
}

impl ImageConfig {
    pub fn new(
        name: impl Into<String>,
        reference: impl Into<String>,
        context: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            name: name.into(),
            reference: reference.into(),
            context: context.into(),
            dockerfile: None,
            build_args: BTreeMap::new(),
            source: None,
            runner,
        }
    }

    pub fn with_dockerfile(mut self, dockerfile: impl Into<PathBuf>) -> Self {
        self.dockerfile = Some(dockerfile.into());
        self
    }

    pub fn with_build_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.build_args.insert(key.into(), value.into());
        self
    }

    pub fn with_source(mut self, source: GitCheckoutConfig) -> Self {
        self.source = Some(source);
        self
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl Configuration for ImageConfig {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn children(&self, _ctx: &Context) -> anyhow::Result<Vec<Box<dyn Configuration>>> {
        Ok(self
            .source
            .iter()
            .map(|source| Box::new(source.clone()) as Box<dyn Configuration>)
            .collect())
    }

    fn applier(&self) -> Option<Box<dyn Applier>> {
        Some(Box::new(ImageApplier {
            reference: self.reference.clone(),
            context: self.context.clone(),
            dockerfile: self.dockerfile.clone(),
            build_args: self.build_args.clone(),
            runner: self.runner.clone(),
        }))
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("image name is empty");
        }
        Ok(())
    }
}

/// Builds and pushes an image unless the registry already has it.
pub struct ImageApplier {
    reference: String,
    context: PathBuf,
    dockerfile: Option<PathBuf>,
    build_args: BTreeMap<String, String>,
    runner: Arc<dyn CommandRunner>,
}

impl ImageApplier {
    fn build_command(&self) -> CommandSpec {
        let mut cmd = CommandSpec::new("docker").args(["build", "-t", self.reference.as_str()]);
        if let Some(dockerfile) = &self.dockerfile {
            cmd = cmd.arg("-f").arg(self.context.join(dockerfile).display().to_string());
        }
        for (key, value) in &self.build_args {
            cmd = cmd.arg("--build-arg").arg(format!("{}={}", key, value));
        }
        cmd.arg(self.context.display().to_string())
    }
}

#[async_trait]
impl Applier for ImageApplier {
    async fn satisfied(&self, ctx: &Context) -> anyhow::Result<bool> {
        let inspect = CommandSpec::new("docker").args(["manifest", "inspect", self.reference.as_str()]);
        let output = self.runner.run(ctx, &inspect).await?;
        Ok(output.success())
    }

    async fn apply(&self, ctx: &Context) -> anyhow::Result<()> {
        self.runner
            .run_checked(ctx, &self.build_command())
            .await
            .with_context(|| format!("building {}", self.reference))?;

        let push = CommandSpec::new("docker").args(["push", self.reference.as_str()]);
        self.runner
            .run_checked(ctx, &push)
            .await
            .with_context(|| format!("pushing {}", self.reference))?;
        Ok(())
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        validate_reference(&self.reference)?;
        if self.context.as_os_str().is_empty() {
            anyhow::bail!("build context for '{}' is empty", self.reference);
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "image"
    }
}

/// `[host[:port]/]path[:tag][@digest]`, following the registry
/// distribution grammar.
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^
        (?P<name>
            (?:
                (?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9])
                (?:\.(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]))*
                (?::[0-9]+)?
                /
            )?
            [a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*
            (?:/[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*)*
        )
        (?::(?P<tag>[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}))?
        (?:@(?P<digest>[A-Za-z][A-Za-z0-9]*(?:[-_+.][A-Za-z][A-Za-z0-9]*)*:[0-9a-fA-F]{32,}))?
        $",
    )
    .expect("regex for image references")
});

const MAX_NAME_LEN: usize = 255;

/// Check that `reference` is a pushable reference: a well formed name with a
/// tag, a digest, or both.
pub fn validate_reference(reference: &str) -> anyhow::Result<()> {
    if reference.is_empty() {
        anyhow::bail!("image reference is empty");
    }
    if reference.chars().any(char::is_whitespace) {
        anyhow::bail!("image reference '{}' contains whitespace", reference);
    }

    let Some(captures) = REFERENCE.captures(reference) else {
        anyhow::bail!("image reference '{}' is malformed", reference);
    };
    if captures.name("tag").is_none() && captures.name("digest").is_none() {
        anyhow::bail!("image reference '{}' has no tag or digest", reference);
    }
    let name = captures.name("name").map(|m| m.as_str()).unwrap_or_default();
    if name.len() > MAX_NAME_LEN {
        anyhow::bail!(
            "image reference '{}' has a name longer than {} characters",
            reference,
            MAX_NAME_LEN
        );
    }
    Ok(())
}
