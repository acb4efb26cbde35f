// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for per-node decisions during an apply pass.
//!
//! This module contains message types for logging events related to:
//! * Satisfied checks and the subtree short-circuit
//! * A node's own apply (start and completion)
//! * External commands spawned by collaborators

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A node's effect already holds.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use rigging::observability::messages::node::NodeSatisfied;
///
/// let msg = NodeSatisfied {
///     path: "shop.api.api-image",
///     kind: "image",
///     skipped_children: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct NodeSatisfied<'a> {
    pub path: &'a str,
    pub kind: &'a str,
    pub skipped_children: usize,
}

impl Display for NodeSatisfied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.skipped_children > 0 {
            write!(
                f,
                "{} '{}' already satisfied, skipping {} dependents",
                self.kind, self.path, self.skipped_children
            )
        } else {
            write!(f, "{} '{}' already satisfied", self.kind, self.path)
        }
    }
}

impl StructuredLog for NodeSatisfied<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            kind = self.kind,
            skipped_children = self.skipped_children,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_satisfied",
            span_name = name,
            path = self.path,
            kind = self.kind,
        )
    }
}

/// A node's own apply is starting.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use rigging::observability::messages::node::NodeApplying;
///
/// let msg = NodeApplying {
///     path: "shop.api",
///     kind: "manifest",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct NodeApplying<'a> {
    pub path: &'a str,
    pub kind: &'a str,
}

impl Display for NodeApplying<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Applying {} '{}'", self.kind, self.path)
    }
}

impl StructuredLog for NodeApplying<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, kind = self.kind, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_apply",
            span_name = name,
            path = self.path,
            kind = self.kind,
        )
    }
}

/// A node's own apply completed.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use rigging::observability::messages::node::NodeApplied;
/// use std::time::Duration;
///
/// let msg = NodeApplied {
///     path: "shop.api",
///     kind: "manifest",
///     duration: Duration::from_millis(850),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct NodeApplied<'a> {
    pub path: &'a str,
    pub kind: &'a str,
    pub duration: std::time::Duration,
}

impl Display for NodeApplied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Applied {} '{}' in {:?}",
            self.kind, self.path, self.duration
        )
    }
}

impl StructuredLog for NodeApplied<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            kind = self.kind,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_applied",
            span_name = name,
            path = self.path,
            kind = self.kind,
            duration = ?self.duration,
        )
    }
}

/// External command spawned on behalf of an applier.
///
/// # Log Level
/// `debug!` - Diagnostic detail
///
/// # Example
/// ```
/// use rigging::observability::messages::node::CommandSpawned;
///
/// let args = vec!["push".to_string(), "registry.local/shop/api:1.4.2".to_string()];
/// let msg = CommandSpawned {
///     program: "docker",
///     args: &args,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct CommandSpawned<'a> {
    pub program: &'a str,
    pub args: &'a [String],
}

impl Display for CommandSpawned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Running {} {}", self.program, self.args.join(" "))
    }
}

impl StructuredLog for CommandSpawned<'_> {
    fn log(&self) {
        tracing::debug!(
            program = self.program,
            args = %self.args.join(" "),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "command",
            span_name = name,
            program = self.program,
            args = %self.args.join(" "),
        )
    }
}
