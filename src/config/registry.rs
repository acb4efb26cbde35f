// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::backends::{
    CommandRunner, GitCheckoutConfig, ImageConfig, ManifestConfig, UnitConfig,
};
use crate::config::{Config, ImageSpec, UnitSpec};
use crate::errors::EngineError;
use crate::traits::Configuration;

type Factory = Box<dyn Fn() -> Box<dyn Configuration> + Send + Sync>;

/// Named root configurations, one per unit.
///
/// Each entry is a factory so a fresh configuration is produced per run.
///
/// # Example
/// ```
/// use rigging::backends::UnitConfig;
/// use rigging::config::UnitRegistry;
///
/// let mut registry = UnitRegistry::new();
/// registry.register("shop", || Box::new(UnitConfig::new("shop")));
///
/// assert_eq!(registry.names(), vec!["shop"]);
/// assert!(registry.get("billing").is_err());
/// ```
#[derive(Default)]
pub struct UnitRegistry {
    units: BTreeMap<String, Factory>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit. A later registration under the same name replaces the
    /// earlier one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Configuration> + Send + Sync + 'static,
    {
        self.units.insert(name.into(), Box::new(factory));
    }

    pub fn get(&self, name: &str) -> Result<Box<dyn Configuration>, EngineError> {
        self.units
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| EngineError::UnitNotFound {
                name: name.to_string(),
            })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.units.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Instantiate one named unit, or every unit when `name` is `None`.
    pub fn select(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<(String, Box<dyn Configuration>)>, EngineError> {
        match name {
            Some(name) => Ok(vec![(name.to_string(), self.get(name)?)]),
            None => Ok(self
                .units
                .iter()
                .map(|(name, factory)| (name.clone(), factory()))
                .collect()),
        }
    }

    /// Build a registry from a loaded config.
    ///
    /// Repositories are joined with the default registry, manifests inherit
    /// the default context and namespace, and relative paths are resolved
    /// against the config file's directory. The config is expected to have
    /// passed [`crate::config::validate_config`]; unknown image references are
    /// skipped here.
    pub fn from_config(cfg: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        let mut registry = Self::new();
        for spec in &cfg.units {
            let unit = unit_config(cfg, spec, &runner);
            registry.register(spec.name.clone(), move || Box::new(unit.clone()));
        }
        registry
    }
}

impl fmt::Debug for UnitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitRegistry")
            .field("units", &self.names())
            .finish()
    }
}

fn unit_config(cfg: &Config, spec: &UnitSpec, runner: &Arc<dyn CommandRunner>) -> UnitConfig {
    let images: HashMap<&str, ImageConfig> = spec
        .images
        .iter()
        .map(|image| (image.name.as_str(), image_config(cfg, image, runner)))
        .collect();
    let referenced: HashSet<&str> = spec
        .manifests
        .iter()
        .flat_map(|manifest| manifest.images.iter().map(String::as_str))
        .collect();

    let mut unit = UnitConfig::new(spec.name.as_str());
    for image in &spec.images {
        if referenced.contains(image.name.as_str()) {
            continue;
        }
        if let Some(config) = images.get(image.name.as_str()) {
            unit = unit.with_image(config.clone());
        }
    }

    for manifest in &spec.manifests {
        let kube_context = manifest
            .kube_context
            .as_ref()
            .or(cfg.defaults.kube_context.as_ref())
            .cloned()
            .unwrap_or_default();
        let mut config = ManifestConfig::new(
            manifest.name.as_str(),
            cfg.resolve(&manifest.path),
            kube_context,
            runner.clone(),
        );
        if let Some(namespace) = manifest.namespace.as_ref().or(cfg.defaults.namespace.as_ref()) {
            config = config.with_namespace(namespace.as_str());
        }
        for name in &manifest.images {
            if let Some(image) = images.get(name.as_str()) {
                config = config.with_image(image.clone());
            }
        }
        unit = unit.with_manifest(config);
    }
    unit
}

fn image_config(cfg: &Config, spec: &ImageSpec, runner: &Arc<dyn CommandRunner>) -> ImageConfig {
    let reference = match &cfg.defaults.registry {
        Some(registry) => format!(
            "{}/{}:{}",
            registry.trim_end_matches('/'),
            spec.repository,
            spec.tag
        ),
        None => format!("{}:{}", spec.repository, spec.tag),
    };

    let (context, source) = match &spec.source {
        Some(git) => {
            let dir = cfg.resolve(&git.dir);
            let checkout = GitCheckoutConfig::new(git.url.as_str(), git.rev.as_str(), dir.clone(), runner.clone());
            (dir.join(&spec.context), Some(checkout))
        }
        None => (cfg.resolve(&spec.context), None),
    };

    let mut image = ImageConfig::new(spec.name.as_str(), reference, context, runner.clone());
    if let Some(dockerfile) = &spec.dockerfile {
        image = image.with_dockerfile(dockerfile);
    }
    for (key, value) in &spec.build_args {
        image = image.with_build_arg(key.as_str(), value.as_str());
    }
    if let Some(source) = source {
        image = image.with_source(source);
    }
    image
}
