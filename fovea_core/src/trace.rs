// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the animation loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! activity scheduler calls as an animation starts, ticks, and ends. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`; each method performs a
//! single `Option` branch before dispatching.
//!
//! Events borrow the pipeline name and carry [`Instant`] timestamps taken on
//! the scheduler thread. Sinks that keep events must copy what they need.
//!
//! This is separate from [`tracing`] logging: logs describe what happened,
//! trace events are a machine-readable timeline.

use std::time::{Duration, Instant};

use crate::action::ActionFailure;
use crate::pipeline::{RunReport, StageFilter};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why an animation stopped ticking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// Progress reached 1.
    Finished,
    /// Cancelled through its activity.
    Cancelled,
    /// Superseded by a new start request.
    Restarted,
    /// The scheduler thread was shut down mid-animation.
    ShutDown,
}

impl EndReason {
    /// A lowercase label for logs and trace files.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
            Self::Restarted => "restarted",
            Self::ShutDown => "shut down",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after the processing pass of an animation (re)start.
#[derive(Clone, Copy, Debug)]
pub struct AnimationStartEvent<'a> {
    /// Pipeline name.
    pub pipeline: &'a str,
    /// When progress 0 was taken.
    pub at: Instant,
    /// Total animation time.
    pub duration: Duration,
    /// Target ticks per second.
    pub frame_rate: f64,
    /// Whether this start superseded a running animation.
    pub restart: bool,
}

/// Emitted after every animation tick.
#[derive(Clone, Copy, Debug)]
pub struct TickEvent<'a> {
    /// Pipeline name.
    pub pipeline: &'a str,
    /// Tick counter, from 0 for each animation.
    pub frame_index: u64,
    /// When the tick began.
    pub at: Instant,
    /// Time since the animation started.
    pub elapsed: Duration,
    /// `elapsed / duration`, clamped to 1.
    pub linear: f64,
    /// Linear progress after pacing.
    pub fraction: f64,
    /// Time spent running the animation actions.
    pub work: Duration,
}

/// Emitted after every pipeline batch the scheduler runs.
#[derive(Clone, Copy, Debug)]
pub struct PipelineRunEvent<'a> {
    /// Pipeline name.
    pub pipeline: &'a str,
    /// When the batch finished.
    pub at: Instant,
    /// Which actions took part.
    pub stage: StageFilter,
    /// Fraction handed to the actions.
    pub fraction: f64,
    /// Actions invoked.
    pub executed: usize,
    /// Actions skipped.
    pub skipped: usize,
    /// Actions that failed.
    pub failed: usize,
    /// Wall time of the batch.
    pub elapsed: Duration,
}

impl<'a> PipelineRunEvent<'a> {
    /// Summarizes a [`RunReport`].
    #[must_use]
    pub fn new(
        pipeline: &'a str,
        stage: StageFilter,
        fraction: f64,
        report: &RunReport,
    ) -> Self {
        Self {
            pipeline,
            at: Instant::now(),
            stage,
            fraction,
            executed: report.executed,
            skipped: report.skipped,
            failed: report.failures.len(),
            elapsed: report.elapsed,
        }
    }
}

/// Emitted for every failed action of a batch.
#[derive(Clone, Copy, Debug)]
pub struct ActionFailureEvent<'a> {
    /// Pipeline name.
    pub pipeline: &'a str,
    /// When the batch finished.
    pub at: Instant,
    /// The failure.
    pub failure: &'a ActionFailure,
}

/// Emitted when an animation stops ticking.
#[derive(Clone, Copy, Debug)]
pub struct AnimationEndEvent<'a> {
    /// Pipeline name.
    pub pipeline: &'a str,
    /// When the animation ended.
    pub at: Instant,
    /// Why it ended.
    pub reason: EndReason,
    /// Ticks run.
    pub frames: u64,
    /// Time since the animation started.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the animation loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when an animation (re)starts.
    fn on_animation_start(&mut self, e: &AnimationStartEvent<'_>) {
        _ = e;
    }

    /// Called after each animation tick.
    fn on_tick(&mut self, e: &TickEvent<'_>) {
        _ = e;
    }

    /// Called after each pipeline batch.
    fn on_pipeline_run(&mut self, e: &PipelineRunEvent<'_>) {
        _ = e;
    }

    /// Called for each failed action.
    fn on_action_failure(&mut self, e: &ActionFailureEvent<'_>) {
        _ = e;
    }

    /// Called when an animation stops ticking.
    fn on_animation_end(&mut self, e: &AnimationEndEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    sink: Option<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.sink.is_some())
            .finish()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self { sink: None }
    }

    /// Whether events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Emits an [`AnimationStartEvent`].
    #[inline]
    pub fn animation_start(&mut self, e: &AnimationStartEvent<'_>) {
        if let Some(s) = &mut self.sink {
            s.on_animation_start(e);
        }
    }

    /// Emits a [`TickEvent`].
    #[inline]
    pub fn tick(&mut self, e: &TickEvent<'_>) {
        if let Some(s) = &mut self.sink {
            s.on_tick(e);
        }
    }

    /// Emits a [`PipelineRunEvent`] and one [`ActionFailureEvent`] per
    /// failure in `report`.
    pub fn pipeline_run(
        &mut self,
        pipeline: &str,
        stage: StageFilter,
        fraction: f64,
        report: &RunReport,
    ) {
        let Some(s) = &mut self.sink else {
            return;
        };
        let e = PipelineRunEvent::new(pipeline, stage, fraction, report);
        s.on_pipeline_run(&e);
        for failure in &report.failures {
            s.on_action_failure(&ActionFailureEvent {
                pipeline,
                at: e.at,
                failure,
            });
        }
    }

    /// Emits an [`AnimationEndEvent`].
    #[inline]
    pub fn animation_end(&mut self, e: &AnimationEndEvent<'_>) {
        if let Some(s) = &mut self.sink {
            s.on_animation_end(e);
        }
    }
}
