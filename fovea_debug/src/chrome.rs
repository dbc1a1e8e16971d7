// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each pipeline gets its own track. Animations become begin/end spans,
//! ticks and pipeline batches become complete events, and action failures
//! become instant events.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Duration;

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};
use crate::stage_name;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Timestamps are microseconds since the recorder's epoch.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut tracks: HashMap<String, usize> = HashMap::new();
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        let tid = match tracks.get(recorded.pipeline()) {
            Some(&tid) => tid,
            None => {
                let tid = tracks.len() + 1;
                tracks.insert(recorded.pipeline().to_owned(), tid);
                events.push(json!({
                    "ph": "M",
                    "name": "thread_name",
                    "pid": 0,
                    "tid": tid,
                    "args": { "name": recorded.pipeline() }
                }));
                tid
            }
        };

        match recorded {
            RecordedEvent::AnimationStart {
                at,
                duration,
                frame_rate,
                restart,
                ..
            } => {
                events.push(json!({
                    "ph": "B",
                    "name": "animation",
                    "cat": "Animation",
                    "ts": us(at),
                    "pid": 0,
                    "tid": tid,
                    "args": {
                        "duration_ms": us(duration) / 1000.0,
                        "frame_rate": frame_rate,
                        "restart": restart,
                    }
                }));
            }
            RecordedEvent::Tick {
                frame_index,
                at,
                linear,
                fraction,
                work,
                ..
            } => {
                events.push(json!({
                    "ph": "X",
                    "name": "tick",
                    "cat": "Animation",
                    "ts": us(at),
                    "dur": us(work),
                    "pid": 0,
                    "tid": tid,
                    "args": {
                        "frame_index": frame_index,
                        "linear": linear,
                        "fraction": fraction,
                    }
                }));
            }
            RecordedEvent::PipelineRun {
                at,
                stage,
                fraction,
                executed,
                skipped,
                failed,
                elapsed,
                ..
            } => {
                // `at` marks the end of the batch.
                events.push(json!({
                    "ph": "X",
                    "name": format!("{} pass", stage_name(stage)),
                    "cat": "Pipeline",
                    "ts": us(at.saturating_sub(elapsed)),
                    "dur": us(elapsed),
                    "pid": 0,
                    "tid": tid,
                    "args": {
                        "fraction": fraction,
                        "executed": executed,
                        "skipped": skipped,
                        "failed": failed,
                    }
                }));
            }
            RecordedEvent::ActionFailure { at, failure, .. } => {
                events.push(json!({
                    "ph": "i",
                    "name": "action failed",
                    "cat": "Pipeline",
                    "ts": us(at),
                    "pid": 0,
                    "tid": tid,
                    "s": "t",
                    "args": {
                        "action": failure.action,
                        "index": failure.index,
                        "message": failure.message,
                        "panicked": failure.panicked,
                    }
                }));
            }
            RecordedEvent::AnimationEnd {
                at,
                reason,
                frames,
                elapsed,
                ..
            } => {
                events.push(json!({
                    "ph": "E",
                    "name": "animation",
                    "cat": "Animation",
                    "ts": us(at),
                    "pid": 0,
                    "tid": tid,
                    "args": {
                        "reason": reason.label(),
                        "frames": frames,
                        "elapsed_ms": us(elapsed) / 1000.0,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn us(d: Duration) -> f64 {
    d.as_secs_f64() * 1e6
}
