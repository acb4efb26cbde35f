// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cross-reference validation for provisioning files.
//!
//! Structural checks of individual nodes (well formed image references,
//! non-empty paths) belong to the nodes themselves and run when the execution
//! tree is built. This module covers what only the file as a whole can tell:
//!
//! 1. **Unit uniqueness**: unit names are registry keys
//! 2. **Image uniqueness**: image names are reference keys within a unit
//! 3. **Reference resolution**: every image a manifest lists is declared in
//!    the same unit
//! 4. **Cluster context**: every manifest has a context, its own or the
//!    default
//!
//! All problems are collected so a user can fix a file in one pass.

use std::collections::HashSet;

use crate::config::Config;
use crate::errors::ConfigError;

/// Validate cross references in a loaded configuration.
///
/// # Example
/// ```rust
/// use rigging::config::{validate_config, Config};
///
/// let cfg: Config = serde_yaml::from_str(
///     "units:\n  - name: shop\n  - name: shop\n",
/// ).unwrap();
///
/// let errors = validate_config(&cfg).unwrap_err();
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].to_string(), "duplicate unit name: 'shop'");
/// ```
pub fn validate_config(cfg: &Config) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut units = HashSet::new();

    for unit in &cfg.units {
        if !units.insert(unit.name.as_str()) {
            errors.push(ConfigError::DuplicateUnit {
                unit: unit.name.clone(),
            });
        }

        let mut images = HashSet::new();
        for image in &unit.images {
            if !images.insert(image.name.as_str()) {
                errors.push(ConfigError::DuplicateImage {
                    unit: unit.name.clone(),
                    image: image.name.clone(),
                });
            }
        }

        for manifest in &unit.manifests {
            for image in &manifest.images {
                if !images.contains(image.as_str()) {
                    errors.push(ConfigError::UnknownImage {
                        unit: unit.name.clone(),
                        manifest: manifest.name.clone(),
                        image: image.clone(),
                    });
                }
            }

            if manifest.kube_context.is_none() && cfg.defaults.kube_context.is_none() {
                errors.push(ConfigError::MissingKubeContext {
                    unit: unit.name.clone(),
                    manifest: manifest.name.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
