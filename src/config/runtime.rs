// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::CommandRunner;
use crate::config::{Config, UnitRegistry};
use crate::engine::ParallelDriver;

/// Runtime builder - assembles the unit registry and driver from configuration.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rigging::backends::ProcessRunner;
/// use rigging::config::{Config, RuntimeBuilder};
///
/// let config: Config = serde_yaml::from_str(
///     "executor_options: { max_concurrency: 3 }\nunits: [{ name: shop }]",
/// ).unwrap();
///
/// let (registry, driver) = RuntimeBuilder::from_config(&config, Arc::new(ProcessRunner));
///
/// assert_eq!(registry.names(), vec!["shop"]);
/// assert_eq!(driver.max_concurrency(), 3);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the registry of units and a driver honoring `executor_options`.
    ///
    /// Without an explicit `max_concurrency` the driver runs one unit per
    /// available core.
    pub fn from_config(
        cfg: &Config,
        runner: Arc<dyn CommandRunner>,
    ) -> (UnitRegistry, ParallelDriver) {
        let registry = UnitRegistry::from_config(cfg, runner);
        let driver = cfg
            .executor_options
            .max_concurrency
            .map(ParallelDriver::new)
            .unwrap_or_default()
            .with_policy(cfg.executor_options.satisfied_policy);
        (registry, driver)
    }
}
