// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::Context;

/// One idempotent external side effect, such as "this image exists in the
/// registry" or "this manifest is applied to the cluster".
///
/// The engine never remembers what it did on a previous run. Idempotency lives
/// entirely in [`Applier::satisfied`], which is asked before every apply.
///
/// # Contract
///
/// - `satisfied` queries live external state. Implementations that cannot check
///   cheaply may always answer `false` and rely on `apply` being idempotent.
/// - `apply` performs the effect and must be safe to call when it already holds.
/// - `validate` is a structural check with no side effects. The engine runs it
///   for every applier in the tree before any external call is made.
///
/// Errors are `anyhow::Error` so implementations can attach context with
/// [`anyhow::Context`]; the engine wraps them with the failing node's path.
#[async_trait]
pub trait Applier: Send + Sync {
    /// Report whether the effect already holds.
    async fn satisfied(&self, ctx: &Context) -> anyhow::Result<bool>;

    /// Perform the effect.
    async fn apply(&self, ctx: &Context) -> anyhow::Result<()>;

    /// Check that the applier is well formed.
    fn validate(&self, ctx: &Context) -> anyhow::Result<()>;

    /// Short label used in logs, e.g. `"image"` or `"manifest"`.
    fn kind(&self) -> &'static str;
}
