// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit itself as a `tracing` event with typed fields.
//!
//! # Organization
//!
//! * `engine` - tree building, apply/validate passes and the multi-unit driver
//! * `node` - per-node decisions (satisfied, applying, applied)
//! * `config` - provisioning file loading and registry construction
//!
//! # Usage Pattern
//!
//! ```rust
//! use rigging::observability::messages::engine::UnitsDiscovered;
//! use rigging::observability::messages::StructuredLog;
//!
//! let msg = UnitsDiscovered {
//!     unit_count: 3,
//!     max_concurrency: 4,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod config;
pub mod engine;
pub mod node;

/// A message that knows how to log itself with structured fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event at its documented level.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
