// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered action lists.
//!
//! A [`Pipeline`] runs its enabled actions in order against a locked
//! registry. The caller holds the lock for the whole batch, so a reader never
//! sees a half-updated registry.
//!
//! Each action is isolated: an error return or a panic is caught, logged, and
//! recorded in the [`RunReport`], and the batch continues with the next
//! action.

use core::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::action::{Action, ActionFailure, ActionKind, Frame};
use crate::attr::Attributes;
use crate::item::Value;
use crate::registry::Registry;

/// Which actions a run includes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageFilter {
    /// Every enabled action.
    All,
    /// Processing and always-run actions.
    Processing,
    /// Animation and always-run actions.
    Animation,
}

impl StageFilter {
    /// Whether an action of `kind` takes part.
    #[must_use]
    pub const fn admits(self, kind: ActionKind) -> bool {
        matches!(
            (self, kind),
            (Self::All, _)
                | (_, ActionKind::Always)
                | (Self::Processing, ActionKind::Processing)
                | (Self::Animation, ActionKind::Animation)
        )
    }
}

/// Outcome of one [`Pipeline::run`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Actions that were invoked, failed ones included.
    pub executed: usize,
    /// Actions left out because they were disabled or filtered.
    pub skipped: usize,
    /// Actions that returned an error or panicked.
    pub failures: Vec<ActionFailure>,
    /// Wall time of the batch.
    pub elapsed: Duration,
}

impl RunReport {
    /// Whether every invoked action succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Stage {
    action: Box<dyn Action>,
    enabled: bool,
}

/// An ordered, individually switchable list of actions.
pub struct Pipeline {
    name: String,
    stages: Vec<Stage>,
    attrs: Attributes,
    duration: Option<Duration>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages: Vec<_> = self
            .stages
            .iter()
            .map(|s| (s.action.name(), s.enabled))
            .collect();
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &stages)
            .field("attrs", &self.attrs)
            .field("duration", &self.duration)
            .finish()
    }
}

impl Pipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            attrs: Attributes::new(),
            duration: None,
        }
    }

    /// The pipeline's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends an enabled action and returns its index.
    pub fn add(&mut self, action: impl Action + 'static) -> usize {
        self.stages.push(Stage {
            action: Box::new(action),
            enabled: true,
        });
        self.stages.len() - 1
    }

    /// Appends an enabled action.
    #[must_use]
    pub fn with(mut self, action: impl Action + 'static) -> Self {
        self.add(action);
        self
    }

    /// Sets the animation duration.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.set(key, value);
        self
    }

    /// Number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Names of the actions in order.
    pub fn action_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.stages.iter().map(|s| s.action.name())
    }

    /// Enables or disables the action at `index`. Returns `false` if there is
    /// no such action.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.stages.get_mut(index) {
            Some(stage) => {
                stage.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Enables or disables every action called `name`. Returns how many
    /// matched.
    pub fn set_enabled_by_name(&mut self, name: &str, enabled: bool) -> usize {
        let mut n = 0;
        for stage in self.stages.iter_mut().filter(|s| s.action.name() == name) {
            stage.enabled = enabled;
            n += 1;
        }
        n
    }

    /// Whether the action at `index` is enabled.
    #[must_use]
    pub fn is_enabled(&self, index: usize) -> bool {
        self.stages.get(index).is_some_and(|s| s.enabled)
    }

    /// The pipeline's attributes.
    #[must_use]
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// The pipeline's attributes, mutably.
    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    /// The animation duration, if configured.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Sets or clears the animation duration.
    pub fn set_duration(&mut self, duration: Option<Duration>) {
        self.duration = duration;
    }

    /// Runs every enabled action admitted by `filter`, in order.
    pub fn run(&mut self, registry: &mut Registry, fraction: f64, filter: StageFilter) -> RunReport {
        let start = Instant::now();
        let Self {
            name,
            stages,
            attrs,
            ..
        } = self;
        let frame = Frame { fraction, attrs };
        let mut report = RunReport::default();

        for (index, stage) in stages.iter_mut().enumerate() {
            if !stage.enabled || !filter.admits(stage.action.kind()) {
                report.skipped += 1;
                continue;
            }
            report.executed += 1;
            let action = &mut stage.action;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| action.run(registry, &frame)));
            let (message, panicked) = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => (err.to_string(), false),
                Err(payload) => (panic_message(payload.as_ref()), true),
            };
            let failure = ActionFailure {
                action: stage.action.name().to_owned(),
                index,
                message,
                panicked,
            };
            tracing::error!(pipeline = %name, "{failure}");
            report.failures.push(failure);
        }

        report.elapsed = start.elapsed();
        tracing::trace!(
            pipeline = %name,
            fraction,
            executed = report.executed,
            failed = report.failures.len(),
            "pipeline ran"
        );
        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
