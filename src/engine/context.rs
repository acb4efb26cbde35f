// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tokio_util::sync::CancellationToken;

/// Execution context threaded through every build, validate and apply call.
///
/// Wraps a [`CancellationToken`]. Cloning a `Context` shares the same token, so
/// cancelling any clone is observed by all of them. [`Context::child`] derives a
/// context that is cancelled whenever its parent is, without the reverse being
/// true; the multi-unit driver uses this to get a shared token it may cancel
/// without touching the caller's.
///
/// Cancellation is a best-effort signal. The engine checks it between node
/// visits, and collaborators that spawn processes race it against the process
/// (see [`crate::backends::command`]). Anything else is free to ignore it.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancellation: CancellationToken,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    /// Derive a context whose token is cancelled with this one.
    pub fn child(&self) -> Self {
        Self {
            cancellation: self.cancellation.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancellation
    }
}
