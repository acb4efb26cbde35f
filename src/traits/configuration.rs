// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Context;
use crate::traits::Applier;

/// A declarative node in a provisioning tree.
///
/// A configuration names the nodes it depends on ([`Configuration::children`])
/// and optionally one external action of its own ([`Configuration::applier`]).
/// A node with no applier is a pure grouping node; a node with neither applier
/// nor children is a no-op.
///
/// Nodes have no identity beyond their position in the tree. If the same
/// resource is a dependency of two siblings it appears twice and is visited
/// twice.
pub trait Configuration: Send + Sync {
    /// Diagnostic name, used as this node's segment in error paths.
    fn name(&self) -> String;

    /// Dependents of this node, in the order they must be applied.
    ///
    /// May compute (for example render a template) but must not cause side
    /// effects.
    fn children(&self, ctx: &Context) -> anyhow::Result<Vec<Box<dyn Configuration>>>;

    /// The node's own external action, if any.
    fn applier(&self) -> Option<Box<dyn Applier>>;

    /// Structural check of this node only. Children validate themselves.
    fn validate(&self, ctx: &Context) -> anyhow::Result<()>;
}
