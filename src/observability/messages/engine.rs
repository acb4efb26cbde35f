// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for execution tree lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Building an execution tree from a root configuration
//! * Apply and validate passes over a built tree
//! * The parallel multi-unit driver (discovery, failure, cancellation)

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Execution tree built from a root configuration.
///
/// # Log Level
/// `debug!` - Diagnostic detail
///
/// # Example
/// ```
/// use rigging::observability::messages::engine::TreeBuilt;
///
/// let msg = TreeBuilt {
///     root: "shop",
///     node_count: 7,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct TreeBuilt<'a> {
    pub root: &'a str,
    pub node_count: usize,
}

impl Display for TreeBuilt<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Built execution tree '{}' with {} nodes",
            self.root, self.node_count
        )
    }
}

impl StructuredLog for TreeBuilt<'_> {
    fn log(&self) {
        tracing::debug!(
            root = self.root,
            node_count = self.node_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "tree_built",
            span_name = name,
            root = self.root,
            node_count = self.node_count,
        )
    }
}

/// Apply pass started on a tree.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use rigging::observability::messages::engine::ApplyStarted;
///
/// let msg = ApplyStarted {
///     root: "shop",
///     policy: "skip_subtree",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ApplyStarted<'a> {
    pub root: &'a str,
    pub policy: &'a str,
}

impl Display for ApplyStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Applying '{}' with {} satisfied policy",
            self.root, self.policy
        )
    }
}

impl StructuredLog for ApplyStarted<'_> {
    fn log(&self) {
        tracing::info!(root = self.root, policy = self.policy, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "apply",
            span_name = name,
            root = self.root,
            policy = self.policy,
        )
    }
}

/// Apply pass completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use rigging::observability::messages::engine::ApplyCompleted;
/// use std::time::Duration;
///
/// let msg = ApplyCompleted {
///     root: "shop",
///     applied: 2,
///     satisfied: 5,
///     duration: Duration::from_secs(42),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ApplyCompleted<'a> {
    pub root: &'a str,
    pub applied: usize,
    pub satisfied: usize,
    pub duration: std::time::Duration,
}

impl Display for ApplyCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Applied '{}': {} applied, {} already satisfied, in {:?}",
            self.root, self.applied, self.satisfied, self.duration
        )
    }
}

impl StructuredLog for ApplyCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            root = self.root,
            applied = self.applied,
            satisfied = self.satisfied,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "apply_completed",
            span_name = name,
            root = self.root,
            applied = self.applied,
            satisfied = self.satisfied,
            duration = ?self.duration,
        )
    }
}

/// Apply or validate pass failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use rigging::observability::messages::engine::PassFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "docker push failed");
/// let msg = PassFailed {
///     pass: "apply",
///     root: "shop",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct PassFailed<'a> {
    pub pass: &'a str,
    pub root: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for PassFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} of '{}' failed: {}", self.pass, self.root, self.error)
    }
}

impl StructuredLog for PassFailed<'_> {
    fn log(&self) {
        tracing::error!(
            pass = self.pass,
            root = self.root,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "pass_failed",
            span_name = name,
            pass = self.pass,
            root = self.root,
            error = %self.error,
        )
    }
}

/// Units discovered by the multi-unit driver.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use rigging::observability::messages::engine::UnitsDiscovered;
///
/// let msg = UnitsDiscovered {
///     unit_count: 12,
///     max_concurrency: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct UnitsDiscovered {
    pub unit_count: usize,
    pub max_concurrency: usize,
}

impl Display for UnitsDiscovered {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Discovered {} units, running up to {} concurrently",
            self.unit_count, self.max_concurrency
        )
    }
}

impl StructuredLog for UnitsDiscovered {
    fn log(&self) {
        tracing::info!(
            unit_count = self.unit_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "units",
            span_name = name,
            unit_count = self.unit_count,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// A unit failed and the shared context is being cancelled.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use rigging::observability::messages::engine::UnitFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "kubectl apply failed");
/// let msg = UnitFailed {
///     unit: "shop",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct UnitFailed<'a> {
    pub unit: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for UnitFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' failed, cancelling remaining units: {}",
            self.unit, self.error
        )
    }
}

impl StructuredLog for UnitFailed<'_> {
    fn log(&self) {
        tracing::error!(unit = self.unit, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unit_failed",
            span_name = name,
            unit = self.unit,
            error = %self.error,
        )
    }
}

/// A unit stopped because a sibling failed first.
///
/// # Log Level
/// `warn!` - Degraded but expected
///
/// # Example
/// ```
/// use rigging::observability::messages::engine::UnitCancelled;
///
/// let msg = UnitCancelled { unit: "billing", started: false };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct UnitCancelled<'a> {
    pub unit: &'a str,
    pub started: bool,
}

impl Display for UnitCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.started {
            write!(f, "Unit '{}' stopped after cancellation", self.unit)
        } else {
            write!(f, "Unit '{}' not started: run was cancelled", self.unit)
        }
    }
}

impl StructuredLog for UnitCancelled<'_> {
    fn log(&self) {
        tracing::warn!(unit = self.unit, started = self.started, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "unit_cancelled",
            span_name = name,
            unit = self.unit,
            started = self.started,
        )
    }
}
