// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Walks the focus down a synthetic tree and animates each step.
//!
//! Every step runs a fisheye tree filter, colors items by degree of interest,
//! lays the visible nodes out on a circle, and animates there. Events go to a
//! [`PrettyPrintSink`](fovea_debug::pretty::PrettyPrintSink) on stdout and a
//! [`RecorderSink`](fovea_debug::recorder::RecorderSink), which is exported
//! as `fisheye_trace.json` at the end.
//!
//! Set `RUST_LOG=fovea_core=debug` to see the library's own logs.

use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use fovea_core::activity::{AnimationConfig, Scheduler};
use fovea_core::assign::{ColorAssignment, SizeAssignment};
use fovea_core::attr;
use fovea_core::color::Color;
use fovea_core::filter::{FisheyeConfig, FisheyeTreeFilter};
use fovea_core::focus::FocusEvent;
use fovea_core::graph::{Entity, Graph, NodeId};
use fovea_core::interpolate::{ColorInterpolator, LocationInterpolator, SizeInterpolator};
use fovea_core::item::{ItemClass, VisualItem};
use fovea_core::layout::CircleLayout;
use fovea_core::pipeline::Pipeline;
use fovea_core::registry::{Registry, RegistryHandle};
use fovea_core::trace::{
    ActionFailureEvent, AnimationEndEvent, AnimationStartEvent, PipelineRunEvent, TickEvent,
    TraceSink,
};
use fovea_debug::pretty::PrettyPrintSink;
use fovea_debug::recorder::RecorderSink;
use kurbo::Rect;
use tracing_subscriber::EnvFilter;

const BRANCHING: usize = 3;
const DEPTH: usize = 4;
const STEP: Duration = Duration::from_millis(400);

/// Fans events out to two sinks.
struct Tee<A, B>(A, B);

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    fn on_animation_start(&mut self, e: &AnimationStartEvent<'_>) {
        self.0.on_animation_start(e);
        self.1.on_animation_start(e);
    }

    fn on_tick(&mut self, e: &TickEvent<'_>) {
        self.0.on_tick(e);
        self.1.on_tick(e);
    }

    fn on_pipeline_run(&mut self, e: &PipelineRunEvent<'_>) {
        self.0.on_pipeline_run(e);
        self.1.on_pipeline_run(e);
    }

    fn on_action_failure(&mut self, e: &ActionFailureEvent<'_>) {
        self.0.on_action_failure(e);
        self.1.on_action_failure(e);
    }

    fn on_animation_end(&mut self, e: &AnimationEndEvent<'_>) {
        self.0.on_animation_end(e);
        self.1.on_animation_end(e);
    }
}

/// Builds a complete tree and returns the leftmost root-to-leaf path.
fn build_tree(graph: &mut Graph) -> Vec<NodeId> {
    let root = graph.add_node("root");
    let mut path = vec![root];
    let mut level = vec![root];
    for depth in 1..=DEPTH {
        let mut next = Vec::new();
        for &parent in &level {
            for i in 0..BRANCHING {
                let child = graph.add_node(format!("{}.{i}", graph.label(parent)));
                graph.add_child(parent, child);
                next.push(child);
            }
        }
        path.push(next[0]);
        level = next;
        tracing::debug!(depth, nodes = level.len(), "tree level built");
    }
    path
}

fn doi_color(item: &VisualItem) -> Color {
    match item.doi {
        d if d >= 0.0 => Color::rgb(214, 39, 40),
        d if d >= -1.0 => Color::rgb(255, 127, 14),
        _ => Color::gray(160),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fovea_core=info")),
        )
        .init();

    let mut registry = Registry::with_default_classes();
    let path = build_tree(registry.graph_mut());
    registry.default_focus_mut().add_listener(|event| {
        if let FocusEvent::Replaced { added, removed } = event {
            tracing::info!(?added, ?removed, "focus moved");
        }
    });
    let registry = RegistryHandle::new(registry);

    let repaints = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&repaints);
    let scheduler = Scheduler::new(
        registry.clone(),
        Arc::new(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        }),
    );

    let pipeline = Pipeline::new("fisheye")
        .with(FisheyeTreeFilter::new(FisheyeConfig::DEFAULT))
        .with(ColorAssignment::new(|_| Color::BLACK, doi_color).for_class(ItemClass::NODE))
        .with(SizeAssignment::new(|item| if item.doi >= 0.0 { 2.0 } else { 1.0 }))
        .with(CircleLayout::default())
        .with(LocationInterpolator::new())
        .with(ColorInterpolator::new())
        .with(SizeInterpolator::new())
        .with_attr(attr::BOUNDS, Rect::new(0.0, 0.0, 800.0, 600.0))
        .with_duration(STEP);

    let recorder = RecorderSink::new();
    let recording = recorder.recording();
    let sink = Tee(PrettyPrintSink::with_writer(std::io::stdout()), recorder);
    let activity = scheduler.spawn_traced(pipeline, Box::new(sink))?;

    for &focus in &path {
        registry.with(|r| r.default_focus_mut().set([Entity::Node(focus)]));
        activity.animate_with(AnimationConfig::smooth(STEP))?;
        if !activity.wait_idle(STEP * 10) {
            tracing::warn!("animation did not settle");
        }
        let stats = registry.lock().stats();
        tracing::info!(
            visible = stats.class(ItemClass::NODE).map_or(0, |c| c.visible),
            resident = stats.live,
            "step done"
        );
    }
    activity.shutdown();

    let out = "fisheye_trace.json";
    let mut writer = BufWriter::new(File::create(out)?);
    fovea_debug::chrome::export(&recording.bytes(), &mut writer)?;
    println!(
        "Wrote {out} ({} steps, {} repaints)",
        path.len(),
        repaints.load(Ordering::Relaxed)
    );
    Ok(())
}
