// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use serde::Deserialize;
use tracing::Instrument;

use crate::engine::{Context, NodePath};
use crate::errors::EngineError;
use crate::observability::messages::engine::{ApplyCompleted, ApplyStarted, PassFailed};
use crate::observability::messages::node::{NodeApplied, NodeApplying, NodeSatisfied};
use crate::observability::messages::StructuredLog;
use crate::traits::Applier;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a satisfied node means for the nodes beneath it.
///
/// # Variants
/// * `SkipSubtree` - a satisfied node returns at once and none of its children
///   are visited. This assumes a dependency can never become unsatisfied while
///   its dependent stays satisfied. If that assumption breaks (an image is
///   deleted from the registry while the manifest using it is still applied)
///   the broken dependency is not repaired.
/// * `SelfOnly` - a satisfied node skips only its own apply; its children are
///   still visited and repaired when needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatisfiedPolicy {
    #[default]
    SkipSubtree,
    SelfOnly,
}

impl SatisfiedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SatisfiedPolicy::SkipSubtree => "skip_subtree",
            SatisfiedPolicy::SelfOnly => "self_only",
        }
    }
}

/// Counters gathered during one apply pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Nodes the pass entered.
    pub visited: usize,
    /// Nodes whose own apply ran and succeeded.
    pub applied: usize,
    /// Nodes whose satisfied check answered true.
    pub satisfied: usize,
}

impl ApplyReport {
    pub fn merge(&mut self, other: &ApplyReport) {
        self.visited += other.visited;
        self.applied += other.applied;
        self.satisfied += other.satisfied;
    }
}

/// A node of the immutable execution tree.
///
/// Runners are produced by [`crate::engine::TreeBuilder`] from a root
/// [`crate::traits::Configuration`] and then driven once, through
/// [`Runner::validate`] and/or [`Runner::apply`].
///
/// ## Apply order
///
/// Within one tree the walk is depth first with each node's own apply after
/// its children:
///
/// 1. If the node has an applier and it is already satisfied, the node is done
///    (under [`SatisfiedPolicy::SkipSubtree`], its children are not touched).
/// 2. Children run one at a time in declared order. The first failing child
///    aborts the branch; later siblings are never started.
/// 3. Only after every child succeeded does the node's own apply run.
///
/// The context is checked before each node and before each own apply, so a
/// cancelled run stops at the next node boundary.
pub struct Runner {
    name: String,
    applier: Option<Box<dyn Applier>>,
    children: Vec<Runner>,
}

impl Runner {
    pub fn new(
        name: impl Into<String>,
        applier: Option<Box<dyn Applier>>,
        children: Vec<Runner>,
    ) -> Self {
        Self {
            name: name.into(),
            applier,
            children,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Runner] {
        &self.children
    }

    pub fn has_applier(&self) -> bool {
        self.applier.is_some()
    }

    /// Total number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Runner::node_count).sum::<usize>()
    }

    /// Validate every applier in the tree, pre-order.
    ///
    /// Visits the whole tree regardless of satisfied state and never calls
    /// `satisfied` or `apply`. The first failure is returned with its path.
    pub fn validate(&self, ctx: &Context) -> Result<(), EngineError> {
        let result = self.validate_at(ctx, &NodePath::new());
        if let Err(ref error) = result {
            PassFailed {
                pass: "validate",
                root: &self.name,
                error,
            }
            .log();
        }
        result
    }

    fn validate_at(&self, ctx: &Context, parent: &NodePath) -> Result<(), EngineError> {
        let path = parent.child(self.name.as_str());

        if let Some(applier) = &self.applier {
            applier
                .validate(ctx)
                .map_err(|source| EngineError::Validation {
                    path: path.clone(),
                    source,
                })?;
        }

        for child in &self.children {
            child.validate_at(ctx, &path)?;
        }

        Ok(())
    }

    /// Apply the tree, children before parents.
    pub async fn apply(
        &self,
        ctx: &Context,
        policy: SatisfiedPolicy,
    ) -> Result<ApplyReport, EngineError> {
        let started = ApplyStarted {
            root: &self.name,
            policy: policy.as_str(),
        };
        started.log();
        let span = started.span("apply");

        let start = Instant::now();
        let mut report = ApplyReport::default();
        let result = self
            .apply_at(ctx, policy, NodePath::new(), &mut report)
            .instrument(span)
            .await;

        match result {
            Ok(()) => {
                ApplyCompleted {
                    root: &self.name,
                    applied: report.applied,
                    satisfied: report.satisfied,
                    duration: start.elapsed(),
                }
                .log();
                Ok(report)
            }
            Err(error) => {
                if !error.is_cancellation() {
                    PassFailed {
                        pass: "apply",
                        root: &self.name,
                        error: &error,
                    }
                    .log();
                }
                Err(error)
            }
        }
    }

    fn apply_at<'a>(
        &'a self,
        ctx: &'a Context,
        policy: SatisfiedPolicy,
        parent: NodePath,
        report: &'a mut ApplyReport,
    ) -> BoxFuture<'a, Result<(), EngineError>> {
        Box::pin(async move {
            let path = parent.child(self.name.as_str());
            if ctx.is_cancelled() {
                return Err(EngineError::Cancelled { path });
            }
            report.visited += 1;

            let mut self_satisfied = false;
            if let Some(applier) = &self.applier {
                let satisfied =
                    applier
                        .satisfied(ctx)
                        .await
                        .map_err(|source| {
                            interrupted(ctx, &path).unwrap_or(EngineError::Satisfied {
                                path: path.clone(),
                                source,
                            })
                        })?;

                if satisfied {
                    report.satisfied += 1;
                    let skip_subtree = policy == SatisfiedPolicy::SkipSubtree;
                    NodeSatisfied {
                        path: &path.to_string(),
                        kind: applier.kind(),
                        skipped_children: if skip_subtree { self.children.len() } else { 0 },
                    }
                    .log();
                    if skip_subtree {
                        return Ok(());
                    }
                    self_satisfied = true;
                }
            }

            for child in &self.children {
                child.apply_at(ctx, policy, path.clone(), report).await?;
            }

            match &self.applier {
                Some(applier) if !self_satisfied => {
                    if ctx.is_cancelled() {
                        return Err(EngineError::Cancelled { path });
                    }
                    let display = path.to_string();
                    NodeApplying {
                        path: &display,
                        kind: applier.kind(),
                    }
                    .log();

                    let start = Instant::now();
                    applier
                        .apply(ctx)
                        .await
                        .map_err(|source| {
                            interrupted(ctx, &path).unwrap_or(EngineError::Apply {
                                path: path.clone(),
                                source,
                            })
                        })?;
                    report.applied += 1;

                    NodeApplied {
                        path: &display,
                        kind: applier.kind(),
                        duration: start.elapsed(),
                    }
                    .log();
                }
                _ => {}
            }

            Ok(())
        })
    }
}

/// A collaborator failing after the context was cancelled was interrupted,
/// not broken.
fn interrupted(ctx: &Context, path: &NodePath) -> Option<EngineError> {
    ctx.is_cancelled()
        .then(|| EngineError::Cancelled { path: path.clone() })
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("name", &self.name)
            .field("applier", &self.applier.as_ref().map(|a| a.kind()))
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{Call, FakeApplier, Recorder};

    fn leaf(recorder: &Recorder, name: &str, applier: FakeApplier) -> Runner {
        Runner::new(name, Some(applier.boxed(recorder, name)), vec![])
    }

    #[tokio::test]
    async fn test_children_apply_before_parent() {
        let recorder = Recorder::new();
        let tree = Runner::new(
            "root",
            Some(FakeApplier::unsatisfied().boxed(&recorder, "root")),
            vec![
                leaf(&recorder, "a", FakeApplier::unsatisfied()),
                leaf(&recorder, "b", FakeApplier::unsatisfied()),
            ],
        );

        let report = tree
            .apply(&Context::new(), SatisfiedPolicy::SkipSubtree)
            .await
            .expect("apply should succeed");

        assert_eq!(recorder.applied(), vec!["a", "b", "root"]);
        assert_eq!(report.applied, 3);
        assert_eq!(report.visited, 3);
    }

    #[tokio::test]
    async fn test_all_satisfied_applies_nothing() {
        let recorder = Recorder::new();
        let tree = Runner::new(
            "group",
            None,
            vec![
                leaf(&recorder, "a", FakeApplier::satisfied()),
                leaf(&recorder, "b", FakeApplier::satisfied()),
            ],
        );

        let report = tree
            .apply(&Context::new(), SatisfiedPolicy::SkipSubtree)
            .await
            .expect("apply should succeed");

        assert!(recorder.applied().is_empty());
        assert_eq!(report.satisfied, 2);
        assert_eq!(report.applied, 0);
    }

    #[tokio::test]
    async fn test_satisfied_root_never_touches_children() {
        let recorder = Recorder::new();
        let tree = Runner::new(
            "root",
            Some(FakeApplier::satisfied().boxed(&recorder, "root")),
            vec![
                leaf(&recorder, "a", FakeApplier::unsatisfied()),
                leaf(&recorder, "b", FakeApplier::failing_apply()),
            ],
        );

        tree.apply(&Context::new(), SatisfiedPolicy::SkipSubtree)
            .await
            .expect("apply should succeed");

        assert_eq!(recorder.calls(), vec![Call::Satisfied("root".into())]);
    }

    #[tokio::test]
    async fn test_self_only_policy_still_visits_children() {
        let recorder = Recorder::new();
        let tree = Runner::new(
            "root",
            Some(FakeApplier::satisfied().boxed(&recorder, "root")),
            vec![
                leaf(&recorder, "a", FakeApplier::unsatisfied()),
                leaf(&recorder, "b", FakeApplier::satisfied()),
            ],
        );

        let report = tree
            .apply(&Context::new(), SatisfiedPolicy::SelfOnly)
            .await
            .expect("apply should succeed");

        assert_eq!(recorder.applied(), vec!["a"]);
        assert_eq!(report.satisfied, 2);
        assert_eq!(report.visited, 3);
    }

    #[tokio::test]
    async fn test_failing_child_stops_siblings_and_parent() {
        let recorder = Recorder::new();
        let tree = Runner::new(
            "parent",
            Some(FakeApplier::unsatisfied().boxed(&recorder, "parent")),
            vec![
                leaf(&recorder, "c1", FakeApplier::unsatisfied()),
                leaf(&recorder, "c2", FakeApplier::failing_apply()),
                leaf(&recorder, "c3", FakeApplier::unsatisfied()),
            ],
        );

        let err = tree
            .apply(&Context::new(), SatisfiedPolicy::SkipSubtree)
            .await
            .expect_err("c2 should fail the branch");

        match &err {
            EngineError::Apply { path, .. } => assert_eq!(path.to_string(), "parent.c2"),
            other => panic!("expected apply error, got {other:?}"),
        }
        assert_eq!(
            recorder.calls(),
            vec![
                Call::Satisfied("parent".into()),
                Call::Satisfied("c1".into()),
                Call::Apply("c1".into()),
                Call::Satisfied("c2".into()),
                Call::Apply("c2".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_satisfied_error_is_fatal() {
        let recorder = Recorder::new();
        let tree = Runner::new(
            "root",
            Some(FakeApplier::unsatisfied().boxed(&recorder, "root")),
            vec![leaf(&recorder, "probe", FakeApplier::failing_satisfied())],
        );

        let err = tree
            .apply(&Context::new(), SatisfiedPolicy::SkipSubtree)
            .await
            .expect_err("satisfied failure should abort");

        assert_eq!(err.kind(), "satisfied");
        assert_eq!(err.path().map(|p| p.to_string()), Some("root.probe".into()));
        assert!(recorder.applied().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_context_makes_no_calls() {
        let recorder = Recorder::new();
        let tree = leaf(&recorder, "root", FakeApplier::unsatisfied());
        let ctx = Context::new();
        ctx.cancel();

        let err = tree
            .apply(&ctx, SatisfiedPolicy::SkipSubtree)
            .await
            .expect_err("cancelled context should abort");

        assert!(err.is_cancellation());
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_apply_failing_after_cancellation_reports_cancelled() {
        // Behaves like a process killed by the context.
        struct Interrupted;

        #[async_trait::async_trait]
        impl Applier for Interrupted {
            async fn satisfied(&self, _ctx: &Context) -> anyhow::Result<bool> {
                Ok(false)
            }
            async fn apply(&self, ctx: &Context) -> anyhow::Result<()> {
                ctx.cancel();
                anyhow::bail!("interrupted by cancellation")
            }
            fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
                Ok(())
            }
            fn kind(&self) -> &'static str {
                "interrupted"
            }
        }

        let tree = Runner::new(
            "root",
            None,
            vec![Runner::new("slow", Some(Box::new(Interrupted)), vec![])],
        );

        let err = tree
            .apply(&Context::new(), SatisfiedPolicy::SkipSubtree)
            .await
            .expect_err("interrupted apply should abort");

        assert!(err.is_cancellation());
        assert_eq!(err.path().map(|p| p.to_string()), Some("root.slow".into()));
    }

    #[tokio::test]
    async fn test_second_apply_is_a_no_op_once_satisfied() {
        let recorder = Recorder::new();
        let tree = Runner::new(
            "root",
            Some(FakeApplier::satisfied_after_apply().boxed(&recorder, "root")),
            vec![leaf(&recorder, "dep", FakeApplier::satisfied_after_apply())],
        );
        let ctx = Context::new();

        tree.apply(&ctx, SatisfiedPolicy::SkipSubtree)
            .await
            .expect("first apply should succeed");
        assert_eq!(recorder.applied(), vec!["dep", "root"]);

        recorder.clear();
        let report = tree
            .apply(&ctx, SatisfiedPolicy::SkipSubtree)
            .await
            .expect("second apply should succeed");

        assert!(recorder.applied().is_empty());
        assert_eq!(recorder.calls(), vec![Call::Satisfied("root".into())]);
        assert_eq!(report.applied, 0);
    }

    #[tokio::test]
    async fn test_duplicate_dependency_is_visited_per_occurrence() {
        let recorder = Recorder::new();
        let tree = Runner::new(
            "root",
            None,
            vec![
                Runner::new("svc-a", None, vec![leaf(&recorder, "base", FakeApplier::unsatisfied())]),
                Runner::new("svc-b", None, vec![leaf(&recorder, "base", FakeApplier::unsatisfied())]),
            ],
        );

        tree.apply(&Context::new(), SatisfiedPolicy::SkipSubtree)
            .await
            .expect("apply should succeed");

        assert_eq!(recorder.applied(), vec!["base", "base"]);
    }

    #[test]
    fn test_validate_ignores_satisfied_state() {
        let recorder = Recorder::new();
        let tree = Runner::new(
            "root",
            Some(FakeApplier::satisfied().boxed(&recorder, "root")),
            vec![Runner::new(
                "mid",
                None,
                vec![leaf(&recorder, "bad", FakeApplier::invalid())],
            )],
        );

        let err = tree
            .validate(&Context::new())
            .expect_err("invalid leaf should fail validation");

        assert_eq!(err.path().map(|p| p.to_string()), Some("root.mid.bad".into()));
        assert_eq!(
            recorder.calls(),
            vec![Call::Validate("root".into()), Call::Validate("bad".into())]
        );
    }

    #[test]
    fn test_validate_succeeds_when_every_applier_is_valid() {
        let recorder = Recorder::new();
        let tree = Runner::new(
            "root",
            None,
            vec![
                leaf(&recorder, "a", FakeApplier::failing_apply()),
                leaf(&recorder, "b", FakeApplier::failing_satisfied()),
            ],
        );

        assert!(tree.validate(&Context::new()).is_ok());
        assert_eq!(tree.node_count(), 3);
    }
}
