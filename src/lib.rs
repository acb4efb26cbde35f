// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // image, git, manifest and unit nodes
pub mod config;     // provisioning file + unit registry
pub mod engine;     // tree builder, runner and parallel driver
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // Configuration and Applier seams
