// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for provisioning file loading and registry construction.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Provisioning file loaded and validated.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use rigging::observability::messages::config::ConfigLoaded;
///
/// let msg = ConfigLoaded {
///     path: "rigging.yaml",
///     unit_count: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub unit_count: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded '{}' with {} units",
            self.path, self.unit_count
        )
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, unit_count = self.unit_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "config_loaded",
            span_name = name,
            path = self.path,
            unit_count = self.unit_count,
        )
    }
}

/// Provisioning file rejected during validation.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use rigging::observability::messages::config::ConfigRejected;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "duplicate unit name: 'shop'");
/// let msg = ConfigRejected {
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ConfigRejected<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for ConfigRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration rejected: {}", self.error)
    }
}

impl StructuredLog for ConfigRejected<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("config_rejected", span_name = name, error = %self.error)
    }
}
