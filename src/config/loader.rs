// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::SatisfiedPolicy;
use crate::errors::ConfigError;
use crate::observability::messages::config::{ConfigLoaded, ConfigRejected};
use crate::observability::messages::StructuredLog;

/// Main configuration structure for a provisioning run.
///
/// Describes every unit (typically one application) and the images and
/// manifests it needs. It is typically loaded from a YAML file.
///
/// # Fields
/// * `defaults` - Values applied to every unit unless overridden (optional)
/// * `executor_options` - Concurrency and satisfied policy (optional)
/// * `units` - The named units, each built into its own execution tree
///
/// # Example
/// ```yaml
/// defaults:
///   registry: registry.example.com/team
///   kube_context: staging
/// executor_options:
///   max_concurrency: 4
///   satisfied_policy: skip_subtree
/// units:
///   - name: shop
///     images:
///       - name: api
///         repository: shop-api
///         tag: "1.4.2"
///         context: services/api
///     manifests:
///       - name: api
///         path: deploy/api.yaml
///         images: [api]
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
    /// Directory relative paths are resolved against. Set by the loader to the
    /// config file's directory.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Values shared by every unit.
///
/// # Fields
/// * `registry` - Prefix joined in front of every image repository (optional)
/// * `kube_context` - Cluster context for manifests that do not name one
/// * `namespace` - Namespace for manifests that do not name one
#[derive(Debug, Default, Deserialize)]
pub struct Defaults {
    pub registry: Option<String>,
    pub kube_context: Option<String>,
    pub namespace: Option<String>,
}

/// Executor-specific configuration options.
///
/// # Fields
/// * `max_concurrency` - Units applied at once (defaults to available cores)
/// * `satisfied_policy` - What a satisfied node means for its dependents
#[derive(Debug, Default, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
    #[serde(default)]
    pub satisfied_policy: SatisfiedPolicy,
}

/// One named unit: a set of images and the manifests that use them.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    #[serde(default)]
    pub images: Vec<ImageSpec>,
    #[serde(default)]
    pub manifests: Vec<ManifestSpec>,
}

/// A container image that must exist in a registry.
///
/// # Fields
/// * `name` - Name manifests use to reference this image
/// * `repository` - Repository, joined with `defaults.registry` when set
/// * `tag` - Tag to build and push
/// * `context` - Build context, relative to the git checkout when `source` is
///   set, otherwise to the config file
/// * `dockerfile` - Dockerfile relative to the context (optional)
/// * `build_args` - `--build-arg` values
/// * `source` - Git checkout that must exist before building (optional)
#[derive(Debug, Clone, Deserialize)]
pub struct ImageSpec {
    pub name: String,
    pub repository: String,
    pub tag: String,
    #[serde(default = "default_context")]
    pub context: PathBuf,
    pub dockerfile: Option<PathBuf>,
    #[serde(default)]
    pub build_args: BTreeMap<String, String>,
    pub source: Option<GitSpec>,
}

fn default_context() -> PathBuf {
    PathBuf::from(".")
}

/// A git repository checked out at a revision.
#[derive(Debug, Clone, Deserialize)]
pub struct GitSpec {
    pub url: String,
    pub rev: String,
    pub dir: PathBuf,
}

/// A manifest that must be applied to a cluster.
///
/// `images` lists the names of images (declared in the same unit) that must
/// exist before the manifest is applied.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestSpec {
    pub name: String,
    pub path: PathBuf,
    pub kube_context: Option<String>,
    pub namespace: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Config {
    /// Resolve a possibly relative path against the config file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Load a config from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: Config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(cfg)
}

/// Load and validate a config from a YAML file.
///
/// Every validation problem is logged; the first one is returned.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path.as_ref())?;

    if let Err(mut errors) = crate::config::validate_config(&cfg) {
        for error in &errors {
            ConfigRejected { error }.log();
        }
        return Err(errors.remove(0));
    }

    ConfigLoaded {
        path: &path.as_ref().display().to_string(),
        unit_count: cfg.units.len(),
    }
    .log();
    Ok(cfg)
}
