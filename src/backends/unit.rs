// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::image::ImageConfig;
use crate::backends::manifest::ManifestConfig;
use crate::engine::Context;
use crate::traits::{Applier, Configuration};

/// Root of one unit's tree. Groups manifests, plus images no manifest
/// references, and has no action of its own.
#[derive(Clone)]
pub struct UnitConfig {
    name: String,
    images: Vec<ImageConfig>,
    manifests: Vec<ManifestConfig>,
}

impl UnitConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            images: Vec::new(),
            manifests: Vec::new(),
        }
    }

    /// Add an image that must be present even though no manifest uses it.
    pub fn with_image(mut self, image: ImageConfig) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_manifest(mut self, manifest: ManifestConfig) -> Self {
        self.manifests.push(manifest);
        self
    }
}

impl Configuration for UnitConfig {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn children(&self, _ctx: &Context) -> anyhow::Result<Vec<Box<dyn Configuration>>> {
        let images = self
            .images
            .iter()
            .map(|image| Box::new(image.clone()) as Box<dyn Configuration>);
        let manifests = self
            .manifests
            .iter()
            .map(|manifest| Box::new(manifest.clone()) as Box<dyn Configuration>);
        Ok(images.chain(manifests).collect())
    }

    fn applier(&self) -> Option<Box<dyn Applier>> {
        None
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("unit name is empty");
        }
        if self.name.contains('.') {
            anyhow::bail!("unit name '{}' must not contain '.'", self.name);
        }
        Ok(())
    }
}
