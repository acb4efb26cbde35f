// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Concrete configurations and appliers for provisioning.
//!
//! Every node kind pairs a [`crate::traits::Configuration`] (identity and
//! dependents) with an [`crate::traits::Applier`] (the action):
//!
//! | Node     | Dependents                         | Satisfied when                     |
//! |----------|------------------------------------|------------------------------------|
//! | unit     | manifests, unreferenced images     | (grouping only, no action)         |
//! | manifest | images it references               | never; `kubectl apply` always runs |
//! | image    | its git checkout, if any           | `docker manifest inspect` succeeds |
//! | git      | none                               | checkout `HEAD` equals the commit  |
//!
//! All external tools are invoked through [`CommandRunner`]. Tests script it
//! with `MockRunner`, available under `cfg(test)` or the `testing` feature.
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use rigging::backends::{CommandRunner, ImageConfig, ManifestConfig, ProcessRunner, UnitConfig};
//! use rigging::engine::{Context, TreeBuilder};
//!
//! // Building a tree spawns nothing; commands only run on apply.
//! let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner);
//! let unit = UnitConfig::new("shop").with_manifest(
//!     ManifestConfig::new("api", "deploy/api.yaml", "staging", runner.clone())
//!         .with_image(ImageConfig::new("api", "shop-api:1.0", ".", runner)),
//! );
//!
//! let tree = TreeBuilder::build(&unit, &Context::new())?;
//! assert_eq!(tree.node_count(), 3);
//! # Ok::<(), rigging::errors::EngineError>(())
//! ```

pub mod command;
pub mod git;
pub mod image;
pub mod manifest;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod unit;

pub use command::{CommandOutput, CommandRunner, CommandSpec, ProcessRunner};
pub use git::{GitApplier, GitCheckoutConfig};
pub use image::{validate_reference, ImageApplier, ImageConfig};
pub use manifest::{KubectlApplier, ManifestConfig};
pub use unit::UnitConfig;

#[cfg(any(test, feature = "testing"))]
pub use mock::MockRunner;
