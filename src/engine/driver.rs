// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::engine::{ApplyReport, Context, NodePath, Runner, SatisfiedPolicy, TreeBuilder};
use crate::errors::EngineError;
use crate::observability::messages::engine::{UnitCancelled, UnitFailed, UnitsDiscovered};
use crate::observability::messages::StructuredLog;
use crate::traits::Configuration;

/// An independently built execution tree with the name it was registered under.
#[derive(Debug)]
pub struct Unit {
    pub name: String,
    pub runner: Runner,
}

/// Outcome counters for a multi-unit run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverReport {
    /// Units handed to the driver.
    pub units: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Units stopped, or never started, because of cancellation.
    pub cancelled: usize,
    /// Apply counters summed over the units that succeeded.
    pub totals: ApplyReport,
}

/// Runs a fixed set of units concurrently with cancel-on-first-error semantics.
///
/// ## Execution Strategy
///
/// Every unit is spawned as its own task and all tasks share one child
/// [`Context`]. A semaphore bounds how many units apply at once; a unit still
/// waiting for a permit when the context is cancelled is never started.
///
/// The first unit to fail with an original error (not a cancellation) cancels
/// the shared context and becomes the driver's result, wrapped in
/// [`EngineError::Unit`]. Units that are already applying are only signalled:
/// they stop at their next node boundary, and the driver waits for every task
/// before returning. No ordering exists between units.
///
/// Dropping the future returned by [`ParallelDriver::run`] aborts every unit
/// task and cancels the shared context.
pub struct ParallelDriver {
    max_concurrency: usize,
    policy: SatisfiedPolicy,
}

impl ParallelDriver {
    /// Create a driver running at most `max_concurrency` units at once.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1), // Ensure at least 1
            policy: SatisfiedPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SatisfiedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn policy(&self) -> SatisfiedPolicy {
        self.policy
    }

    /// Build one tree per named configuration. Any failure aborts with the
    /// failing unit's name; no unit runs until every tree is built.
    pub fn build_units(
        configurations: Vec<(String, Box<dyn Configuration>)>,
        ctx: &Context,
    ) -> Result<Vec<Unit>, EngineError> {
        configurations
            .into_iter()
            .map(|(name, configuration)| {
                TreeBuilder::build(configuration.as_ref(), ctx)
                    .map(|runner| Unit {
                        name: name.clone(),
                        runner,
                    })
                    .map_err(|source| attribute(&name, source))
            })
            .collect()
    }

    /// Validate every unit's tree. Sequential; stops at the first failure.
    pub fn validate(units: &[Unit], ctx: &Context) -> Result<(), EngineError> {
        for unit in units {
            unit.runner
                .validate(ctx)
                .map_err(|source| attribute(&unit.name, source))?;
        }
        Ok(())
    }

    /// Apply every unit concurrently.
    pub async fn run(&self, units: Vec<Unit>, ctx: &Context) -> Result<DriverReport, EngineError> {
        UnitsDiscovered {
            unit_count: units.len(),
            max_concurrency: self.max_concurrency,
        }
        .log();

        let shared = ctx.child();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut report = DriverReport {
            units: units.len(),
            ..DriverReport::default()
        };

        // Dropping `run` aborts the tasks and signals anything they spawned.
        let _guard = CancelOnDrop(shared.clone());
        let mut names = HashMap::with_capacity(report.units);
        let mut tasks = JoinSet::new();
        for unit in units {
            let name = unit.name.clone();
            let handle = tasks.spawn(run_unit(unit, shared.clone(), semaphore.clone(), self.policy));
            names.insert(handle.id(), name);
        }

        let mut first_failure: Option<EngineError> = None;
        let mut first_cancellation: Option<EngineError> = None;

        while let Some(joined) = tasks.join_next_with_id().await {
            let (name, result) = match joined {
                Ok((id, result)) => (names.remove(&id).unwrap_or_default(), result),
                Err(join_error) => {
                    let name = names.remove(&join_error.id()).unwrap_or_default();
                    (
                        name.clone(),
                        Err(EngineError::Join {
                            unit: name,
                            message: join_error.to_string(),
                        }),
                    )
                }
            };

            match result {
                Ok(unit_report) => {
                    report.succeeded += 1;
                    report.totals.merge(&unit_report);
                }
                Err(error) if error.is_cancellation() => {
                    report.cancelled += 1;
                    UnitCancelled {
                        unit: &name,
                        started: is_started(&error),
                    }
                    .log();
                    if first_cancellation.is_none() {
                        first_cancellation = Some(attribute(&name, error));
                    }
                }
                Err(error) => {
                    report.failed += 1;
                    shared.cancel();
                    if first_failure.is_none() {
                        let error = attribute(&name, error);
                        UnitFailed {
                            unit: &name,
                            error: &error,
                        }
                        .log();
                        first_failure = Some(error);
                    } else {
                        tracing::debug!(unit = %name, error = %error, "Additional unit failure after cancellation");
                    }
                }
            }
        }

        match (first_failure, first_cancellation) {
            (Some(error), _) | (None, Some(error)) => Err(error),
            (None, None) => Ok(report),
        }
    }
}

impl Default for ParallelDriver {
    /// One unit per available core, falling back to 4.
    fn default() -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::new(concurrency)
    }
}

struct CancelOnDrop(Context);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

async fn run_unit(
    unit: Unit,
    ctx: Context,
    semaphore: Arc<Semaphore>,
    policy: SatisfiedPolicy,
) -> Result<ApplyReport, EngineError> {
    let _permit = tokio::select! {
        biased;
        _ = ctx.cancelled() => {
            return Err(EngineError::Cancelled { path: NodePath::new() });
        }
        permit = semaphore.acquire() => permit.map_err(|e| EngineError::Join {
            unit: unit.name.clone(),
            message: format!("failed to acquire unit permit: {e}"),
        })?,
    };

    let result = unit.runner.apply(&ctx, policy).await;
    if let Err(ref error) = result {
        // Cancel while still holding the permit so no waiting unit slips in.
        if !error.is_cancellation() {
            ctx.cancel();
        }
    }
    result
}

/// Attach a unit name to an error unless it already carries one.
fn attribute(unit: &str, error: EngineError) -> EngineError {
    match error {
        EngineError::Unit { .. } | EngineError::Join { .. } => error,
        source => EngineError::Unit {
            unit: unit.to_string(),
            source: Box::new(source),
        },
    }
}

/// A unit cancelled before it acquired a permit reports an empty path.
fn is_started(error: &EngineError) -> bool {
    error.path().map(|path| !path.is_empty()).unwrap_or(true)
}
