// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for the diagnostic and
//! operational logging emitted while building and applying provisioning trees.
//! Message types follow a struct-based pattern with a `Display` implementation
//! so that log text lives in one place instead of being scattered through the
//! engine and collaborators.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - tree lifecycle and the multi-unit driver
//! * `messages::node` - per-node apply decisions and spawned commands
//! * `messages::config` - provisioning file loading
//!
//! # Usage
//!
//! ```rust
//! use rigging::observability::messages::engine::UnitFailed;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! let msg = UnitFailed {
//!     unit: "shop",
//!     error: &error,
//! };
//!
//! tracing::error!("{}", msg);
//! ```
//!
//! Subscribers are installed by the binary with [`init_tracing`].

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Filtering follows `RUST_LOG`, falling back to `default_directive` (for
/// example `"info"`) when the variable is unset or invalid. Output goes to
/// stderr so stdout stays free for command output.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
