// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::{Context, NodePath, Runner};
use crate::errors::EngineError;
use crate::observability::messages::engine::TreeBuilt;
use crate::observability::messages::StructuredLog;
use crate::traits::Configuration;

/// Builds an immutable [`Runner`] tree from a root [`Configuration`].
///
/// For every node, in pre-order:
/// 1. Extend the diagnostic path with the node's name
/// 2. Run the node's own `validate`. Any failure aborts the whole build; no
///    partial tree is ever returned
/// 3. Resolve the node's applier (absent for grouping nodes)
/// 4. Resolve its children and build each one with its own copy of the path
///
/// Children keep their declared order. Building performs no external calls.
///
/// # Example
/// ```
/// use rigging::backends::UnitConfig;
/// use rigging::engine::{Context, TreeBuilder};
///
/// let unit = UnitConfig::new("empty");
/// let runner = TreeBuilder::build(&unit, &Context::new()).unwrap();
/// assert_eq!(runner.name(), "empty");
/// assert_eq!(runner.node_count(), 1);
/// ```
pub struct TreeBuilder;

impl TreeBuilder {
    pub fn build(root: &dyn Configuration, ctx: &Context) -> Result<Runner, EngineError> {
        let runner = Self::build_at(root, ctx, &NodePath::new())?;
        TreeBuilt {
            root: runner.name(),
            node_count: runner.node_count(),
        }
        .log();
        Ok(runner)
    }

    fn build_at(
        node: &dyn Configuration,
        ctx: &Context,
        parent: &NodePath,
    ) -> Result<Runner, EngineError> {
        let name = node.name();
        let path = parent.child(name.as_str());

        if ctx.is_cancelled() {
            return Err(EngineError::Cancelled { path });
        }

        node.validate(ctx)
            .map_err(|source| EngineError::Validation {
                path: path.clone(),
                source,
            })?;

        let applier = node.applier();

        let children = node
            .children(ctx)
            .map_err(|source| EngineError::Children {
                path: path.clone(),
                source,
            })?;

        let built = children
            .iter()
            .map(|child| Self::build_at(child.as_ref(), ctx, &path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Runner::new(name, applier, built))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{Call, FakeApplier, FakeConfig, Recorder};

    #[test]
    fn test_build_preserves_shape_and_order() {
        let recorder = Recorder::new();
        let root = FakeConfig::new(&recorder, "shop")
            .with_child(
                FakeConfig::new(&recorder, "api")
                    .with_applier(FakeApplier::unsatisfied())
                    .with_child(
                        FakeConfig::new(&recorder, "api-image")
                            .with_applier(FakeApplier::unsatisfied()),
                    ),
            )
            .with_child(FakeConfig::new(&recorder, "worker"));

        let runner = TreeBuilder::build(&root, &Context::new()).expect("build should succeed");

        assert_eq!(runner.name(), "shop");
        assert!(!runner.has_applier());
        let names: Vec<_> = runner.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["api", "worker"]);
        assert!(runner.children()[0].has_applier());
        assert_eq!(runner.children()[0].children()[0].name(), "api-image");
        assert_eq!(runner.node_count(), 4);
    }

    #[test]
    fn test_build_never_calls_applier_methods() {
        let recorder = Recorder::new();
        let root = FakeConfig::new(&recorder, "root")
            .with_applier(FakeApplier::failing_apply())
            .with_child(FakeConfig::new(&recorder, "leaf").with_applier(FakeApplier::invalid()));

        TreeBuilder::build(&root, &Context::new()).expect("build should succeed");

        assert_eq!(
            recorder.calls(),
            vec![
                Call::ValidateNode("root".into()),
                Call::Children("root".into()),
                Call::ValidateNode("leaf".into()),
                Call::Children("leaf".into()),
            ]
        );
    }

    #[test]
    fn test_invalid_node_aborts_whole_build() {
        let recorder = Recorder::new();
        let root = FakeConfig::new(&recorder, "shop")
            .with_child(
                FakeConfig::new(&recorder, "api")
                    .with_child(FakeConfig::new(&recorder, "broken").invalid()),
            )
            .with_child(FakeConfig::new(&recorder, "worker"));

        let err = TreeBuilder::build(&root, &Context::new()).expect_err("build should fail");

        match &err {
            EngineError::Validation { path, source } => {
                assert_eq!(path.to_string(), "shop.api.broken");
                assert_eq!(source.to_string(), "node 'broken' is malformed");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        // The failing node's children and later siblings are never resolved.
        assert!(recorder.calls_for("worker").is_empty());
        assert!(!recorder.calls().contains(&Call::Children("broken".into())));
    }

    #[test]
    fn test_children_error_names_path() {
        let recorder = Recorder::new();
        let root = FakeConfig::new(&recorder, "shop")
            .with_child(FakeConfig::new(&recorder, "manifest").failing_children());

        let err = TreeBuilder::build(&root, &Context::new()).expect_err("build should fail");

        assert_eq!(err.kind(), "children");
        assert_eq!(err.path().map(|p| p.to_string()), Some("shop.manifest".into()));
    }

    #[test]
    fn test_sibling_paths_are_independent() {
        let recorder = Recorder::new();
        let root = FakeConfig::new(&recorder, "root")
            .with_child(FakeConfig::new(&recorder, "left").with_child(FakeConfig::new(&recorder, "deep")))
            .with_child(FakeConfig::new(&recorder, "right").invalid());

        let err = TreeBuilder::build(&root, &Context::new()).expect_err("build should fail");

        assert_eq!(err.path().map(|p| p.to_string()), Some("root.right".into()));
    }

    #[test]
    fn test_leaf_without_applier_is_noop() {
        let recorder = Recorder::new();
        let root = FakeConfig::new(&recorder, "empty");

        let runner = TreeBuilder::build(&root, &Context::new()).expect("build should succeed");

        assert!(!runner.has_applier());
        assert!(runner.children().is_empty());
    }

    #[test]
    fn test_cancelled_context_aborts_build() {
        let recorder = Recorder::new();
        let root = FakeConfig::new(&recorder, "root");
        let ctx = Context::new();
        ctx.cancel();

        let err = TreeBuilder::build(&root, &ctx).expect_err("build should abort");

        assert!(err.is_cancellation());
        assert!(recorder.calls().is_empty());
    }
}
