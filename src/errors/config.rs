// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating a provisioning file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Two units share a name.
    #[error("duplicate unit name: '{unit}'")]
    DuplicateUnit { unit: String },

    /// Two images in one unit share a name.
    #[error("unit '{unit}' declares image '{image}' more than once")]
    DuplicateImage { unit: String, image: String },

    /// A manifest refers to an image its unit does not declare.
    #[error("manifest '{manifest}' in unit '{unit}' references unknown image '{image}'")]
    UnknownImage {
        unit: String,
        manifest: String,
        image: String,
    },

    /// A manifest has no cluster context and no default is configured.
    #[error("manifest '{manifest}' in unit '{unit}' has no kube context and no default is set")]
    MissingKubeContext { unit: String, manifest: String },
}

impl ConfigError {
    /// True for errors about the contents of a parsed file, as opposed to
    /// reading or parsing it.
    pub fn is_semantic(&self) -> bool {
        !matches!(self, ConfigError::Io { .. } | ConfigError::Parse { .. })
    }
}
