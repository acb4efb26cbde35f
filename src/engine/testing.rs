// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Recording test doubles for the engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::engine::Context;
use crate::traits::{Applier, Configuration};

/// One observed call on a fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Satisfied(String),
    Apply(String),
    Validate(String),
    ValidateNode(String),
    Children(String),
}

#[derive(Default)]
struct Log {
    calls: Vec<Call>,
    completed: Vec<String>,
}

/// Shared, ordered log of calls made on fakes.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Log>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: Call) {
        self.lock().calls.push(call);
    }

    fn complete(&self, name: &str) {
        self.lock().completed.push(name.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Log> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Every call, in the order it was entered.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Names whose apply finished successfully, in completion order.
    pub fn applied(&self) -> Vec<String> {
        self.lock().completed.clone()
    }

    /// Calls made on nodes whose name starts with `prefix`.
    pub fn calls_for(&self, prefix: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| match call {
                Call::Satisfied(n)
                | Call::Apply(n)
                | Call::Validate(n)
                | Call::ValidateNode(n)
                | Call::Children(n) => n.starts_with(prefix),
            })
            .collect()
    }

    pub fn clear(&self) {
        let mut log = self.lock();
        log.calls.clear();
        log.completed.clear();
    }
}

/// Behaviour of a [`RecordingApplier`].
#[derive(Debug, Clone, Default)]
pub struct FakeApplier {
    satisfied: bool,
    flip_on_apply: bool,
    fail_satisfied: bool,
    fail_apply: bool,
    panic_apply: bool,
    invalid: bool,
    apply_delay: Option<Duration>,
}

impl FakeApplier {
    pub fn satisfied() -> Self {
        Self {
            satisfied: true,
            ..Self::default()
        }
    }

    pub fn unsatisfied() -> Self {
        Self::default()
    }

    /// Unsatisfied until its first successful apply.
    pub fn satisfied_after_apply() -> Self {
        Self {
            flip_on_apply: true,
            ..Self::default()
        }
    }

    pub fn failing_apply() -> Self {
        Self {
            fail_apply: true,
            ..Self::default()
        }
    }

    /// Panics inside apply, after any delay.
    pub fn panicking() -> Self {
        Self {
            panic_apply: true,
            ..Self::default()
        }
    }

    pub fn failing_satisfied() -> Self {
        Self {
            fail_satisfied: true,
            ..Self::default()
        }
    }

    pub fn invalid() -> Self {
        Self {
            invalid: true,
            ..Self::default()
        }
    }

    pub fn with_apply_delay(mut self, delay: Duration) -> Self {
        self.apply_delay = Some(delay);
        self
    }

    pub fn boxed(self, recorder: &Recorder, name: &str) -> Box<dyn Applier> {
        let state = AtomicBool::new(self.satisfied);
        Box::new(RecordingApplier {
            name: name.to_string(),
            behaviour: self,
            state,
            recorder: recorder.clone(),
        })
    }
}

pub struct RecordingApplier {
    name: String,
    behaviour: FakeApplier,
    state: AtomicBool,
    recorder: Recorder,
}

#[async_trait]
impl Applier for RecordingApplier {
    async fn satisfied(&self, _ctx: &Context) -> anyhow::Result<bool> {
        self.recorder.push(Call::Satisfied(self.name.clone()));
        if self.behaviour.fail_satisfied {
            anyhow::bail!("registry unreachable while checking '{}'", self.name);
        }
        Ok(self.state.load(Ordering::SeqCst))
    }

    async fn apply(&self, _ctx: &Context) -> anyhow::Result<()> {
        self.recorder.push(Call::Apply(self.name.clone()));
        if let Some(delay) = self.behaviour.apply_delay {
            tokio::time::sleep(delay).await;
        }
        if self.behaviour.panic_apply {
            panic!("simulated panic in '{}'", self.name);
        }
        if self.behaviour.fail_apply {
            anyhow::bail!("simulated apply failure for '{}'", self.name);
        }
        if self.behaviour.flip_on_apply {
            self.state.store(true, Ordering::SeqCst);
        }
        self.recorder.complete(&self.name);
        Ok(())
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        self.recorder.push(Call::Validate(self.name.clone()));
        if self.behaviour.invalid {
            anyhow::bail!("'{}' is missing a required field", self.name);
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "fake"
    }
}

/// Configurable configuration node that records builder calls.
#[derive(Clone)]
pub struct FakeConfig {
    name: String,
    applier: Option<FakeApplier>,
    children: Vec<FakeConfig>,
    invalid: bool,
    children_error: bool,
    recorder: Recorder,
}

impl FakeConfig {
    pub fn new(recorder: &Recorder, name: &str) -> Self {
        Self {
            name: name.to_string(),
            applier: None,
            children: Vec::new(),
            invalid: false,
            children_error: false,
            recorder: recorder.clone(),
        }
    }

    pub fn with_applier(mut self, applier: FakeApplier) -> Self {
        self.applier = Some(applier);
        self
    }

    pub fn with_child(mut self, child: FakeConfig) -> Self {
        self.children.push(child);
        self
    }

    pub fn invalid(mut self) -> Self {
        self.invalid = true;
        self
    }

    pub fn failing_children(mut self) -> Self {
        self.children_error = true;
        self
    }
}

impl Configuration for FakeConfig {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn children(&self, _ctx: &Context) -> anyhow::Result<Vec<Box<dyn Configuration>>> {
        self.recorder.push(Call::Children(self.name.clone()));
        if self.children_error {
            anyhow::bail!("template for '{}' could not be rendered", self.name);
        }
        Ok(self
            .children
            .iter()
            .cloned()
            .map(|child| Box::new(child) as Box<dyn Configuration>)
            .collect())
    }

    fn applier(&self) -> Option<Box<dyn Applier>> {
        self.applier
            .clone()
            .map(|behaviour| behaviour.boxed(&self.recorder, &self.name))
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        self.recorder.push(Call::ValidateNode(self.name.clone()));
        if self.invalid {
            anyhow::bail!("node '{}' is malformed", self.name);
        }
        Ok(())
    }
}
