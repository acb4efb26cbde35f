// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while building, validating and applying execution trees.

use crate::engine::NodePath;
use thiserror::Error;

/// Errors that can occur while building or driving an execution tree.
///
/// Node-level variants carry the dotted root-to-leaf [`NodePath`] of the node
/// that failed. The collaborator's own error is kept as the `source`, so the
/// full chain is available through [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// A node or applier rejected its own structure. Always raised before any
    /// external side effect.
    #[error("validation failed at '{path}'")]
    Validation {
        path: NodePath,
        #[source]
        source: anyhow::Error,
    },

    /// A node could not produce its dependents.
    #[error("resolving dependents failed at '{path}'")]
    Children {
        path: NodePath,
        #[source]
        source: anyhow::Error,
    },

    /// Querying whether an applier's effect already holds failed.
    #[error("satisfied check failed at '{path}'")]
    Satisfied {
        path: NodePath,
        #[source]
        source: anyhow::Error,
    },

    /// An applier's external action failed.
    #[error("apply failed at '{path}'")]
    Apply {
        path: NodePath,
        #[source]
        source: anyhow::Error,
    },

    /// Work was abandoned because the shared context was cancelled.
    #[error("cancelled at '{path}'")]
    Cancelled { path: NodePath },

    /// A unit run by the parallel driver failed.
    #[error("unit '{unit}' failed")]
    Unit {
        unit: String,
        #[source]
        source: Box<EngineError>,
    },

    /// A unit task terminated abnormally (panicked or was aborted).
    #[error("unit '{unit}' task did not complete: {message}")]
    Join { unit: String, message: String },

    /// The registry has no unit of this name.
    #[error("no unit named '{name}' is registered")]
    UnitNotFound { name: String },
}

impl EngineError {
    /// True when this error, or the error it wraps, is a cancellation rather
    /// than an original failure.
    pub fn is_cancellation(&self) -> bool {
        match self {
            EngineError::Cancelled { .. } => true,
            EngineError::Unit { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }

    /// Path of the failing node, if this error originated at a node.
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            EngineError::Validation { path, .. }
            | EngineError::Children { path, .. }
            | EngineError::Satisfied { path, .. }
            | EngineError::Apply { path, .. }
            | EngineError::Cancelled { path } => Some(path),
            EngineError::Unit { source, .. } => source.path(),
            EngineError::Join { .. } | EngineError::UnitNotFound { .. } => None,
        }
    }

    /// Short category label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } => "validation",
            EngineError::Children { .. } => "children",
            EngineError::Satisfied { .. } => "satisfied",
            EngineError::Apply { .. } => "apply",
            EngineError::Cancelled { .. } => "cancelled",
            EngineError::Unit { source, .. } => source.kind(),
            EngineError::Join { .. } => "join",
            EngineError::UnitNotFound { .. } => "unit_not_found",
        }
    }
}
