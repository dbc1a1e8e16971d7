// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item registry, pipeline scheduler, and degree-of-interest filtering for
//! animated graph views.
//!
//! `fovea_core` decides which parts of a large graph are worth showing,
//! gives them visual attributes, and animates between configurations. Visual
//! items live in a pooled arena with generational handles; pipelines of
//! actions populate, style, place, and interpolate them under one lock.
//!
//! # Architecture
//!
//! ```text
//!   Graph + FocusSets  (mutated by the application)
//!       │
//!       ▼
//!   Pipeline ── filter ──► assign ──► layout ──► interpolate ──► repaint
//!       │        │            │          │            │
//!       │        └────────────┴──────────┴─── processing pass (once)
//!       │                                             │
//!       │                                 animation pass (every tick)
//!       ▼
//!   Scheduler / Activity thread ──► Registry (locked per batch)
//!                                        │
//!                                        ▼
//!                                  Registry::snapshot() ──► renderer
//! ```
//!
//! **[`graph`]** — Backing graph with generational node/edge handles and a
//! tree view (parents, ordered children).
//!
//! **[`item`]** — Visual items: `current`/`start`/`end` tweens for every
//! animatable attribute, lifecycle flags, and per-kind payloads.
//!
//! **[`pool`]** — Slot arena that parks released items per class for reuse.
//!
//! **[`registry`]** — Entity → item mapping per class, the staleness cycle,
//! ordered iteration, and the shared [`RegistryHandle`](registry::RegistryHandle).
//!
//! **[`focus`]** — Named focus sets with change listeners.
//!
//! **[`action`]** / **[`pipeline`]** — The unit of work and ordered,
//! fault-isolated batches of it.
//!
//! **[`filter`]** — Which items exist: whole-graph and fisheye DOI filters,
//! and the garbage collector.
//!
//! **[`assign`]**, **[`layout`]**, **[`interpolate`]** — Target attributes,
//! target positions, and per-frame blending.
//!
//! **[`activity`]** — Runs pipelines now or as timed animations on their own
//! threads, paced by [`pacing`].
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! animation-loop instrumentation.
//!
//! **[`render`]** — The renderer and repaint contracts the crate consumes.

pub mod action;
pub mod activity;
pub mod assign;
pub mod attr;
pub mod color;
pub mod error;
pub mod filter;
pub mod focus;
pub mod graph;
pub mod interpolate;
pub mod item;
pub mod layout;
pub mod pacing;
pub mod pipeline;
pub mod pool;
pub mod registry;
pub mod render;
pub mod trace;

pub use error::{Error, Result};
