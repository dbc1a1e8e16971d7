// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a shared
//! byte buffer as little-endian records. Timestamps are stored as nanoseconds
//! since the recorder's epoch, and strings as length-prefixed UTF-8.
//! [`decode`] reads them back as an iterator of [`RecordedEvent`].
//!
//! The sink usually moves onto a scheduler thread, so the buffer is reached
//! through a [`Recording`] handle taken beforehand.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use fovea_core::action::ActionFailure;
use fovea_core::pipeline::StageFilter;
use fovea_core::trace::{
    ActionFailureEvent, AnimationEndEvent, AnimationStartEvent, EndReason, PipelineRunEvent,
    TickEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_ANIMATION_START: u8 = 1;
const TAG_TICK: u8 = 2;
const TAG_PIPELINE_RUN: u8 = 3;
const TAG_ACTION_FAILURE: u8 = 4;
const TAG_ANIMATION_END: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// Shared handle to the bytes a [`RecorderSink`] has written.
#[derive(Clone, Debug, Default)]
pub struct Recording(Arc<Mutex<Vec<u8>>>);

impl Recording {
    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the bytes recorded so far.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.lock().clone()
    }

    /// Decodes the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        decode(&self.lock()).collect()
    }

    /// Number of bytes recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    epoch: Instant,
    recording: Recording,
    scratch: Vec<u8>,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder whose epoch is now.
    #[must_use]
    pub fn new() -> Self {
        Self::with_epoch(Instant::now())
    }

    /// Creates an empty recorder measuring timestamps from `epoch`.
    ///
    /// Events that happened before the epoch are recorded at 0.
    #[must_use]
    pub fn with_epoch(epoch: Instant) -> Self {
        Self {
            epoch,
            recording: Recording::default(),
            scratch: Vec::new(),
        }
    }

    /// The instant timestamps are measured from.
    #[must_use]
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// A handle to the recorded bytes that outlives the sink.
    #[must_use]
    pub fn recording(&self) -> Recording {
        self.recording.clone()
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.scratch.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.scratch.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_count(&mut self, v: usize) {
        self.write_u64(u64::try_from(v).unwrap_or(u64::MAX));
    }

    fn write_duration(&mut self, d: Duration) {
        self.write_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));
    }

    fn write_instant(&mut self, at: Instant) {
        self.write_duration(at.saturating_duration_since(self.epoch));
    }

    fn write_str(&mut self, s: &str) {
        self.write_count(s.len());
        self.scratch.extend_from_slice(s.as_bytes());
    }

    fn write_stage(&mut self, stage: StageFilter) {
        self.write_u8(match stage {
            StageFilter::All => 0,
            StageFilter::Processing => 1,
            StageFilter::Animation => 2,
        });
    }

    fn write_reason(&mut self, reason: EndReason) {
        self.write_u8(match reason {
            EndReason::Finished => 0,
            EndReason::Cancelled => 1,
            EndReason::Restarted => 2,
            EndReason::ShutDown => 3,
        });
    }

    /// Moves the encoded record into the shared buffer.
    fn flush(&mut self) {
        self.recording.lock().append(&mut self.scratch);
    }
}

impl TraceSink for RecorderSink {
    fn on_animation_start(&mut self, e: &AnimationStartEvent<'_>) {
        self.write_u8(TAG_ANIMATION_START);
        self.write_str(e.pipeline);
        self.write_instant(e.at);
        self.write_duration(e.duration);
        self.write_f64(e.frame_rate);
        self.write_bool(e.restart);
        self.flush();
    }

    fn on_tick(&mut self, e: &TickEvent<'_>) {
        self.write_u8(TAG_TICK);
        self.write_str(e.pipeline);
        self.write_u64(e.frame_index);
        self.write_instant(e.at);
        self.write_duration(e.elapsed);
        self.write_f64(e.linear);
        self.write_f64(e.fraction);
        self.write_duration(e.work);
        self.flush();
    }

    fn on_pipeline_run(&mut self, e: &PipelineRunEvent<'_>) {
        self.write_u8(TAG_PIPELINE_RUN);
        self.write_str(e.pipeline);
        self.write_instant(e.at);
        self.write_stage(e.stage);
        self.write_f64(e.fraction);
        self.write_count(e.executed);
        self.write_count(e.skipped);
        self.write_count(e.failed);
        self.write_duration(e.elapsed);
        self.flush();
    }

    fn on_action_failure(&mut self, e: &ActionFailureEvent<'_>) {
        self.write_u8(TAG_ACTION_FAILURE);
        self.write_str(e.pipeline);
        self.write_instant(e.at);
        self.write_str(&e.failure.action);
        self.write_count(e.failure.index);
        self.write_str(&e.failure.message);
        self.write_bool(e.failure.panicked);
        self.flush();
    }

    fn on_animation_end(&mut self, e: &AnimationEndEvent<'_>) {
        self.write_u8(TAG_ANIMATION_END);
        self.write_str(e.pipeline);
        self.write_instant(e.at);
        self.write_reason(e.reason);
        self.write_u64(e.frames);
        self.write_duration(e.elapsed);
        self.flush();
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
///
/// `at` fields are offsets from the recorder's epoch.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// An [`AnimationStartEvent`].
    AnimationStart {
        /// Pipeline name.
        pipeline: String,
        /// When progress 0 was taken.
        at: Duration,
        /// Total animation time.
        duration: Duration,
        /// Target ticks per second.
        frame_rate: f64,
        /// Whether a running animation was superseded.
        restart: bool,
    },
    /// A [`TickEvent`].
    Tick {
        /// Pipeline name.
        pipeline: String,
        /// Tick counter.
        frame_index: u64,
        /// When the tick began.
        at: Duration,
        /// Time since the animation started.
        elapsed: Duration,
        /// Unpaced progress.
        linear: f64,
        /// Paced progress.
        fraction: f64,
        /// Time spent in the animation actions.
        work: Duration,
    },
    /// A [`PipelineRunEvent`].
    PipelineRun {
        /// Pipeline name.
        pipeline: String,
        /// When the batch finished.
        at: Duration,
        /// Which actions took part.
        stage: StageFilter,
        /// Fraction handed to the actions.
        fraction: f64,
        /// Actions invoked.
        executed: usize,
        /// Actions skipped.
        skipped: usize,
        /// Actions that failed.
        failed: usize,
        /// Wall time of the batch.
        elapsed: Duration,
    },
    /// An [`ActionFailureEvent`].
    ActionFailure {
        /// Pipeline name.
        pipeline: String,
        /// When the batch finished.
        at: Duration,
        /// The failure.
        failure: ActionFailure,
    },
    /// An [`AnimationEndEvent`].
    AnimationEnd {
        /// Pipeline name.
        pipeline: String,
        /// When the animation ended.
        at: Duration,
        /// Why it ended.
        reason: EndReason,
        /// Ticks run.
        frames: u64,
        /// Time since the animation started.
        elapsed: Duration,
    },
}

impl RecordedEvent {
    /// The pipeline the event belongs to.
    #[must_use]
    pub fn pipeline(&self) -> &str {
        match self {
            Self::AnimationStart { pipeline, .. }
            | Self::Tick { pipeline, .. }
            | Self::PipelineRun { pipeline, .. }
            | Self::ActionFailure { pipeline, .. }
            | Self::AnimationEnd { pipeline, .. } => pipeline,
        }
    }

    /// Offset of the event from the recorder's epoch.
    #[must_use]
    pub fn at(&self) -> Duration {
        match self {
            Self::AnimationStart { at, .. }
            | Self::Tick { at, .. }
            | Self::PipelineRun { at, .. }
            | Self::ActionFailure { at, .. }
            | Self::AnimationEnd { at, .. } => *at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated or unknown record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take(&mut self, n: usize) -> Option<&[u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_count(&mut self) -> Option<usize> {
        usize::try_from(self.read_u64()?).ok()
    }

    fn read_duration(&mut self) -> Option<Duration> {
        self.read_u64().map(Duration::from_nanos)
    }

    fn read_string(&mut self) -> Option<String> {
        let len = self.read_count()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).ok()
    }

    fn read_stage(&mut self) -> Option<StageFilter> {
        Some(match self.read_u8()? {
            0 => StageFilter::All,
            1 => StageFilter::Processing,
            _ => StageFilter::Animation,
        })
    }

    fn read_reason(&mut self) -> Option<EndReason> {
        Some(match self.read_u8()? {
            0 => EndReason::Finished,
            1 => EndReason::Cancelled,
            2 => EndReason::Restarted,
            _ => EndReason::ShutDown,
        })
    }

    fn decode_animation_start(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AnimationStart {
            pipeline: self.read_string()?,
            at: self.read_duration()?,
            duration: self.read_duration()?,
            frame_rate: self.read_f64()?,
            restart: self.read_bool()?,
        })
    }

    fn decode_tick(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Tick {
            pipeline: self.read_string()?,
            frame_index: self.read_u64()?,
            at: self.read_duration()?,
            elapsed: self.read_duration()?,
            linear: self.read_f64()?,
            fraction: self.read_f64()?,
            work: self.read_duration()?,
        })
    }

    fn decode_pipeline_run(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PipelineRun {
            pipeline: self.read_string()?,
            at: self.read_duration()?,
            stage: self.read_stage()?,
            fraction: self.read_f64()?,
            executed: self.read_count()?,
            skipped: self.read_count()?,
            failed: self.read_count()?,
            elapsed: self.read_duration()?,
        })
    }

    fn decode_action_failure(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ActionFailure {
            pipeline: self.read_string()?,
            at: self.read_duration()?,
            failure: ActionFailure {
                action: self.read_string()?,
                index: self.read_count()?,
                message: self.read_string()?,
                panicked: self.read_bool()?,
            },
        })
    }

    fn decode_animation_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AnimationEnd {
            pipeline: self.read_string()?,
            at: self.read_duration()?,
            reason: self.read_reason()?,
            frames: self.read_u64()?,
            elapsed: self.read_duration()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_ANIMATION_START => self.decode_animation_start(),
            TAG_TICK => self.decode_tick(),
            TAG_PIPELINE_RUN => self.decode_pipeline_run(),
            TAG_ACTION_FAILURE => self.decode_action_failure(),
            TAG_ANIMATION_END => self.decode_animation_end(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use fovea_core::pipeline::RunReport;
    use fovea_core::trace::Tracer;

    #[test]
    fn animation_timeline_decodes_in_order() {
        let epoch = Instant::now();
        let mut rec = RecorderSink::with_epoch(epoch);
        let recording = rec.recording();
        rec.on_animation_start(&AnimationStartEvent {
            pipeline: "zoom",
            at: epoch + Duration::from_millis(1),
            duration: Duration::from_millis(500),
            frame_rate: 30.0,
            restart: false,
        });
        rec.on_tick(&TickEvent {
            pipeline: "zoom",
            frame_index: 0,
            at: epoch + Duration::from_millis(2),
            elapsed: Duration::from_millis(1),
            linear: 0.002,
            fraction: 0.001,
            work: Duration::from_micros(80),
        });
        rec.on_animation_end(&AnimationEndEvent {
            pipeline: "zoom",
            at: epoch + Duration::from_millis(3),
            reason: EndReason::Cancelled,
            frames: 1,
            elapsed: Duration::from_millis(2),
        });

        let events = recording.events();
        assert_eq!(events.len(), 3);
        assert!(
            events.iter().all(|e| e.pipeline() == "zoom"),
            "pipeline names survive"
        );
        assert_eq!(
            events.iter().map(RecordedEvent::at).collect::<Vec<_>>(),
            vec![
                Duration::from_millis(1),
                Duration::from_millis(2),
                Duration::from_millis(3)
            ]
        );
        match &events[1] {
            RecordedEvent::Tick {
                fraction, work, ..
            } => {
                assert_eq!(*fraction, 0.001);
                assert_eq!(*work, Duration::from_micros(80));
            }
            other => panic!("expected Tick, got {other:?}"),
        }
        assert!(
            matches!(
                events[2],
                RecordedEvent::AnimationEnd {
                    reason: EndReason::Cancelled,
                    frames: 1,
                    ..
                }
            ),
            "end reason kept"
        );
    }

    #[test]
    fn failures_are_recorded_through_the_tracer() {
        let mut rec = RecorderSink::new();
        let recording = rec.recording();
        let report = RunReport {
            executed: 3,
            skipped: 1,
            failures: vec![ActionFailure {
                action: "layout".into(),
                index: 1,
                message: "missing pipeline attribute `bounds`".into(),
                panicked: false,
            }],
            elapsed: Duration::from_micros(120),
        };
        Tracer::new(&mut rec).pipeline_run("grow", StageFilter::Processing, 0.0, &report);

        let events = recording.events();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::PipelineRun {
                stage,
                executed,
                skipped,
                failed,
                ..
            } => {
                assert_eq!(*stage, StageFilter::Processing);
                assert_eq!((*executed, *skipped, *failed), (3, 1, 1));
            }
            other => panic!("expected PipelineRun, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::ActionFailure { failure, .. } => {
                assert_eq!(failure, &report.failures[0]);
            }
            other => panic!("expected ActionFailure, got {other:?}"),
        }
    }

    #[test]
    fn events_before_the_epoch_clamp_to_zero() {
        let before = Instant::now();
        let mut rec = RecorderSink::with_epoch(before + Duration::from_secs(1));
        rec.on_animation_end(&AnimationEndEvent {
            pipeline: "p",
            at: before,
            reason: EndReason::Finished,
            frames: 0,
            elapsed: Duration::ZERO,
        });
        let events = rec.recording().events();
        assert_eq!(events[0].at(), Duration::ZERO);
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        let recording = rec.recording();
        for frames in 0..2 {
            rec.on_animation_end(&AnimationEndEvent {
                pipeline: "p",
                at: Instant::now(),
                reason: EndReason::Finished,
                frames,
                elapsed: Duration::ZERO,
            });
        }
        let mut bytes = recording.bytes();
        bytes.pop();
        assert_eq!(decode(&bytes).count(), 1);
        assert!(decode(&[]).next().is_none(), "empty buffer decodes to nothing");
        assert!(decode(&[0xff, 0, 0]).next().is_none(), "unknown tag");
    }
}
