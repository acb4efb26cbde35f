// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;

use crate::backends::command::{CommandRunner, CommandSpec};
use crate::backends::image::ImageConfig;
use crate::engine::Context;
use crate::traits::{Applier, Configuration};

/// A manifest file applied to a cluster. The images it references are its
/// dependents and exist in the registry before it is applied.
#[derive(Clone)]
pub struct ManifestConfig {
    name: String,
    path: PathBuf,
    kube_context: String,
    namespace: Option<String>,
    images: Vec<ImageConfig>,
    runner: Arc<dyn CommandRunner>,
}

impl ManifestConfig {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        kube_context: impl Into<String>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kube_context: kube_context.into(),
            namespace: None,
            images: Vec::new(),
            runner,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_image(mut self, image: ImageConfig) -> Self {
        self.images.push(image);
        self
    }
}

impl Configuration for ManifestConfig {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn children(&self, _ctx: &Context) -> anyhow::Result<Vec<Box<dyn Configuration>>> {
        Ok(self
            .images
            .iter()
            .map(|image| Box::new(image.clone()) as Box<dyn Configuration>)
            .collect())
    }

    fn applier(&self) -> Option<Box<dyn Applier>> {
        Some(Box::new(KubectlApplier {
            path: self.path.clone(),
            kube_context: self.kube_context.clone(),
            namespace: self.namespace.clone(),
            runner: self.runner.clone(),
        }))
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("manifest name is empty");
        }
        Ok(())
    }
}

/// `kubectl apply` for one file.
///
/// Apply is idempotent on the cluster side and there is no cheap way to diff,
/// so the manifest is never reported satisfied.
pub struct KubectlApplier {
    path: PathBuf,
    kube_context: String,
    namespace: Option<String>,
    runner: Arc<dyn CommandRunner>,
}

#[async_trait]
impl Applier for KubectlApplier {
    async fn satisfied(&self, _ctx: &Context) -> anyhow::Result<bool> {
        Ok(false)
    }

    async fn apply(&self, ctx: &Context) -> anyhow::Result<()> {
        let mut cmd = CommandSpec::new("kubectl").args(["--context", self.kube_context.as_str()]);
        if let Some(namespace) = &self.namespace {
            cmd = cmd.args(["--namespace", namespace.as_str()]);
        }
        let cmd = cmd
            .args(["apply", "-f"])
            .arg(self.path.display().to_string());

        self.runner
            .run_checked(ctx, &cmd)
            .await
            .with_context(|| format!("applying {} to {}", self.path.display(), self.kube_context))?;
        Ok(())
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        if self.path.as_os_str().is_empty() {
            anyhow::bail!("manifest path is empty");
        }
        if self.kube_context.trim().is_empty() {
            anyhow::bail!("kube context for '{}' is empty", self.path.display());
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "manifest"
    }
}
