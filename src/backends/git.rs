// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;

use crate::backends::command::{CommandRunner, CommandSpec};
use crate::engine::Context;
use crate::traits::{Applier, Configuration};

/// A git repository that must be checked out at a revision before something
/// can be built from it. Always a leaf.
#[derive(Clone)]
pub struct GitCheckoutConfig {
    url: String,
    rev: String,
    dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl GitCheckoutConfig {
    pub fn new(
        url: impl Into<String>,
        rev: impl Into<String>,
        dir: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            url: url.into(),
            rev: rev.into(),
            dir: dir.into(),
            runner,
        }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl Configuration for GitCheckoutConfig {
    fn name(&self) -> String {
        "source".to_string()
    }

    fn children(&self, _ctx: &Context) -> anyhow::Result<Vec<Box<dyn Configuration>>> {
        Ok(Vec::new())
    }

    fn applier(&self) -> Option<Box<dyn Applier>> {
        Some(Box::new(GitApplier {
            url: self.url.clone(),
            rev: self.rev.clone(),
            dir: self.dir.clone(),
            runner: self.runner.clone(),
        }))
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        if self.dir.as_os_str().is_empty() {
            anyhow::bail!("checkout directory is empty");
        }
        Ok(())
    }
}

/// Clones and checks out a revision.
///
/// Only a full commit hash can be confirmed without touching the network, so
/// branch and tag revisions always report unsatisfied and are re-fetched.
pub struct GitApplier {
    url: String,
    rev: String,
    dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl GitApplier {
    fn git(&self) -> CommandSpec {
        CommandSpec::new("git").arg("-C").arg(self.dir.display().to_string())
    }

    async fn is_cloned(&self) -> bool {
        tokio::fs::try_exists(self.dir.join(".git"))
            .await
            .unwrap_or(false)
    }
}

#[async_trait]
impl Applier for GitApplier {
    async fn satisfied(&self, ctx: &Context) -> anyhow::Result<bool> {
        if !is_commit_hash(&self.rev) || !self.is_cloned().await {
            return Ok(false);
        }

        let output = self
            .runner
            .run(ctx, &self.git().args(["rev-parse", "HEAD"]))
            .await?;
        Ok(output.success() && output.stdout.trim() == self.rev)
    }

    async fn apply(&self, ctx: &Context) -> anyhow::Result<()> {
        let fresh = !self.is_cloned().await;
        if fresh {
            let clone = CommandSpec::new("git")
                .arg("clone")
                .arg(self.url.as_str())
                .arg(self.dir.display().to_string());
            self.runner
                .run_checked(ctx, &clone)
                .await
                .with_context(|| format!("cloning {}", self.url))?;
        }

        // A commit is addressable once fetched. A branch or tag is fetched by
        // name and checked out from FETCH_HEAD, never from a stale local ref.
        let (fetch, target) = if is_commit_hash(&self.rev) {
            let fetch = (!fresh).then(|| self.git().args(["fetch", "--tags", "origin"]));
            (fetch, self.rev.as_str())
        } else {
            let fetch = self.git().args(["fetch", "--tags", "origin", self.rev.as_str()]);
            (Some(fetch), "FETCH_HEAD")
        };

        if let Some(fetch) = fetch {
            self.runner
                .run_checked(ctx, &fetch)
                .await
                .with_context(|| format!("fetching {} from {}", self.rev, self.url))?;
        }

        self.runner
            .run_checked(ctx, &self.git().args(["checkout", "--detach", target]))
            .await
            .with_context(|| format!("checking out {} in {}", self.rev, self.dir.display()))?;
        Ok(())
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        if self.url.trim().is_empty() {
            anyhow::bail!("git url is empty");
        }
        if self.rev.is_empty() || self.rev.chars().any(char::is_whitespace) {
            anyhow::bail!("git revision '{}' is not a valid revision", self.rev);
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "git"
    }
}

fn is_commit_hash(rev: &str) -> bool {
    rev.len() == 40 && rev.chars().all(|c| c.is_ascii_hexdigit())
}
