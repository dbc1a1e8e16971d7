// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are microseconds since the sink was created.

use std::io::Write;
use std::time::{Duration, Instant};

use fovea_core::trace::{
    ActionFailureEvent, AnimationEndEvent, AnimationStartEvent, PipelineRunEvent, TickEvent,
    TraceSink,
};

use crate::stage_name;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write + Send>> {
    writer: W,
    epoch: Instant,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            epoch: Instant::now(),
        }
    }

    /// Measures timestamps from `epoch` instead of the creation time.
    #[must_use]
    pub fn with_epoch(mut self, epoch: Instant) -> Self {
        self.epoch = epoch;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn us(&self, at: Instant) -> f64 {
        micros(at.saturating_duration_since(self.epoch))
    }
}

fn micros(d: Duration) -> f64 {
    d.as_secs_f64() * 1e6
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_animation_start(&mut self, e: &AnimationStartEvent<'_>) {
        let kind = if e.restart { "restart" } else { "start" };
        let _ = writeln!(
            self.writer,
            "[{kind}] {} at {:.1}µs duration={:.1}ms fps={}",
            e.pipeline,
            self.us(e.at),
            micros(e.duration) / 1000.0,
            e.frame_rate,
        );
    }

    fn on_tick(&mut self, e: &TickEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[tick] {} frame={} at {:.1}µs linear={:.3} fraction={:.3} work={:.1}µs",
            e.pipeline,
            e.frame_index,
            self.us(e.at),
            e.linear,
            e.fraction,
            micros(e.work),
        );
    }

    fn on_pipeline_run(&mut self, e: &PipelineRunEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[run] {} {} fraction={:.3} executed={} skipped={} failed={} took={:.1}µs",
            e.pipeline,
            stage_name(e.stage),
            e.fraction,
            e.executed,
            e.skipped,
            e.failed,
            micros(e.elapsed),
        );
    }

    fn on_action_failure(&mut self, e: &ActionFailureEvent<'_>) {
        let _ = writeln!(self.writer, "[FAIL] {} {}", e.pipeline, e.failure);
    }

    fn on_animation_end(&mut self, e: &AnimationEndEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[end] {} {} after {} frames, {:.1}ms",
            e.pipeline,
            e.reason.label(),
            e.frames,
            micros(e.elapsed) / 1000.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fovea_core::action::ActionFailure;
    use fovea_core::trace::EndReason;

    #[test]
    fn pretty_print_tick() {
        let epoch = Instant::now();
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_epoch(epoch);
        sink.on_tick(&TickEvent {
            pipeline: "zoom",
            frame_index: 3,
            at: epoch + Duration::from_micros(250),
            elapsed: Duration::from_millis(100),
            linear: 0.25,
            fraction: 0.5,
            work: Duration::from_micros(40),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.starts_with("[tick] zoom"), "got: {output}");
        assert!(output.contains("frame=3"), "got: {output}");
        assert!(output.contains("at 250.0µs"), "got: {output}");
        assert!(output.contains("fraction=0.500"), "got: {output}");
    }

    #[test]
    fn failures_and_ends_are_one_line_each() {
        let epoch = Instant::now();
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_epoch(epoch);
        let failure = ActionFailure {
            action: "layout".into(),
            index: 2,
            message: "boom".into(),
            panicked: true,
        };
        sink.on_action_failure(&ActionFailureEvent {
            pipeline: "zoom",
            at: epoch,
            failure: &failure,
        });
        sink.on_animation_end(&AnimationEndEvent {
            pipeline: "zoom",
            at: epoch,
            reason: EndReason::Cancelled,
            frames: 12,
            elapsed: Duration::from_millis(400),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2, "got: {output}");
        assert!(lines[0].contains("`layout` (#2) panicked: boom"), "got: {output}");
        assert!(lines[1].contains("cancelled after 12 frames"), "got: {output}");
    }
}
