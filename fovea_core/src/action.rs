// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The unit of pipeline work.
//!
//! An [`Action`] runs against the locked registry with a [`Frame`]: the
//! animation fraction plus the pipeline's attributes. Actions come in three
//! kinds, which decide when an animated pipeline runs them:
//!
//! - [`ActionKind::Processing`] — filters, assignments, layouts. Run once
//!   when an animation starts, to establish the new end state.
//! - [`ActionKind::Animation`] — interpolators. Run on every tick.
//! - [`ActionKind::Always`] — run in both passes (for example [`Repaint`]).
//!
//! A failing action returns an [`ActionError`] (or panics); the pipeline
//! records an [`ActionFailure`] and carries on with the next action.

use core::fmt;
use std::sync::Arc;

use crate::attr::Attributes;
use crate::error::Error;
use crate::registry::Registry;
use crate::render::RepaintSink;

/// When an action takes part in an animated pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Establishes end state; runs once per animation start.
    Processing,
    /// Blends toward the end state; runs every tick.
    Animation,
    /// Runs in both passes.
    Always,
}

/// What an action sees besides the registry.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Animation progress in `[0, 1]`. Immediate runs use 1.
    pub fraction: f64,
    /// The pipeline's attributes.
    pub attrs: &'a Attributes,
}

/// Why an action failed.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// A registry operation failed.
    #[error(transparent)]
    Registry(#[from] Error),
    /// The action gave up for its own reasons.
    #[error("{0}")]
    Failed(String),
    /// A pipeline attribute the action needs is not set.
    #[error("missing pipeline attribute `{0}`")]
    MissingAttribute(&'static str),
}

impl From<crate::error::ConfigError> for ActionError {
    fn from(err: crate::error::ConfigError) -> Self {
        Self::Registry(err.into())
    }
}

impl From<crate::error::StateError> for ActionError {
    fn from(err: crate::error::StateError) -> Self {
        Self::Registry(err.into())
    }
}

/// A stage of a [`Pipeline`](crate::pipeline::Pipeline).
pub trait Action: Send {
    /// Name used in logs and for enabling by name.
    fn name(&self) -> &str;

    /// When the action runs in an animated pipeline.
    fn kind(&self) -> ActionKind {
        ActionKind::Processing
    }

    /// Runs the action.
    fn run(&mut self, registry: &mut Registry, frame: &Frame<'_>) -> Result<(), ActionError>;
}

/// A failed action, as recorded by a pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionFailure {
    /// Name of the action.
    pub action: String,
    /// Position of the action in its pipeline.
    pub index: usize,
    /// Error or panic message.
    pub message: String,
    /// Whether the action panicked rather than returning an error.
    pub panicked: bool,
}

impl fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let how = if self.panicked { "panicked" } else { "failed" };
        write!(
            f,
            "action `{}` (#{}) {how}: {}",
            self.action, self.index, self.message
        )
    }
}

/// An action built from a closure.
pub struct FnAction<F> {
    name: String,
    kind: ActionKind,
    f: F,
}

impl<F> fmt::Debug for FnAction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<F> FnAction<F>
where
    F: FnMut(&mut Registry, &Frame<'_>) -> Result<(), ActionError> + Send,
{
    /// Wraps `f` as an action.
    pub fn new(name: impl Into<String>, kind: ActionKind, f: F) -> Self {
        Self {
            name: name.into(),
            kind,
            f,
        }
    }
}

impl<F> Action for FnAction<F>
where
    F: FnMut(&mut Registry, &Frame<'_>) -> Result<(), ActionError> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ActionKind {
        self.kind
    }

    fn run(&mut self, registry: &mut Registry, frame: &Frame<'_>) -> Result<(), ActionError> {
        (self.f)(registry, frame)
    }
}

/// Requests a repaint whenever it runs.
#[derive(Clone)]
pub struct Repaint {
    sink: Arc<dyn RepaintSink>,
}

impl fmt::Debug for Repaint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repaint").finish_non_exhaustive()
    }
}

impl Repaint {
    /// Creates the action.
    pub fn new(sink: Arc<dyn RepaintSink>) -> Self {
        Self { sink }
    }
}

impl Action for Repaint {
    fn name(&self) -> &str {
        "repaint"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Always
    }

    fn run(&mut self, _registry: &mut Registry, _frame: &Frame<'_>) -> Result<(), ActionError> {
        self.sink.repaint();
        Ok(())
    }
}
