// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Command-line arguments for the `rigging` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use rigging::engine::SatisfiedPolicy;

/// Converge images, git checkouts and cluster manifests described in a
/// provisioning file.
#[derive(Parser, Debug)]
#[command(
    name = "rigging",
    version,
    about = "Bring declared images and manifests to their desired state",
    after_help = "Examples:\n  rigging\n  rigging --config deploy/rigging.yaml --unit shop\n  rigging --validate-only\n  rigging --jobs 2 --policy self-only"
)]
pub struct Args {
    /// Provisioning file
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "RIGGING_CONFIG",
        default_value = "rigging.yaml"
    )]
    pub config: PathBuf,

    /// Run only the named unit instead of every unit
    #[arg(short, long, value_name = "NAME")]
    pub unit: Option<String>,

    /// Build and validate the trees, then exit without applying anything
    #[arg(long)]
    pub validate_only: bool,

    /// Units applied at once (overrides executor_options.max_concurrency)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// What a satisfied node means for its dependents (overrides the file)
    #[arg(long, value_enum)]
    pub policy: Option<Policy>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, value_name = "DIRECTIVE", default_value = "info")]
    pub log_level: String,
}

/// Command-line spelling of [`SatisfiedPolicy`].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// A satisfied node skips its whole subtree
    SkipSubtree,
    /// A satisfied node skips only its own apply
    SelfOnly,
}

impl From<Policy> for SatisfiedPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::SkipSubtree => SatisfiedPolicy::SkipSubtree,
            Policy::SelfOnly => SatisfiedPolicy::SelfOnly,
        }
    }
}
