// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The dependency-tree build/apply engine.
//!
//! A root [`crate::traits::Configuration`] is turned into an immutable
//! [`Runner`] tree by [`TreeBuilder`], which is then driven through
//! [`Runner::validate`] and [`Runner::apply`]. [`ParallelDriver`] runs many
//! independently built trees at once.

pub mod builder;
pub mod context;
pub mod driver;
pub mod path;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::TreeBuilder;
pub use context::Context;
pub use driver::{DriverReport, ParallelDriver, Unit};
pub use path::NodePath;
pub use runner::{ApplyReport, Runner, SatisfiedPolicy};
