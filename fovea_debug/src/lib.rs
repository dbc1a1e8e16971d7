// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for fovea
//! animation traces.
//!
//! This crate provides [`TraceSink`](fovea_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//!
//! All three are `Send`, so they can be handed to
//! [`Scheduler::spawn_traced`](fovea_core::activity::Scheduler::spawn_traced).

pub mod chrome;
pub mod pretty;
pub mod recorder;

use fovea_core::pipeline::StageFilter;

/// Short lowercase name of a pipeline stage.
pub(crate) fn stage_name(stage: StageFilter) -> &'static str {
    match stage {
        StageFilter::All => "all",
        StageFilter::Processing => "processing",
        StageFilter::Animation => "animation",
    }
}
