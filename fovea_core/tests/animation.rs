// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end animated pipelines on a scheduler thread.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fovea_core::action::{ActionError, ActionKind, FnAction, Repaint};
use fovea_core::activity::{AnimationConfig, Phase, Scheduler};
use fovea_core::error::{Error, StateError};
use fovea_core::attr;
use fovea_core::filter::GraphFilter;
use fovea_core::interpolate::LocationInterpolator;
use fovea_core::item::ItemClass;
use fovea_core::layout::CircleLayout;
use fovea_core::pipeline::Pipeline;
use fovea_core::registry::{Registry, RegistryHandle};
use fovea_core::render::NoRepaint;
use fovea_core::trace::{ActionFailureEvent, AnimationEndEvent, EndReason, TickEvent, TraceSink};
use kurbo::{Point, Rect};

const WAIT: Duration = Duration::from_secs(10);

#[derive(Clone, Default)]
struct Log {
    fractions: Arc<Mutex<Vec<f64>>>,
    failures: Arc<Mutex<Vec<(String, bool)>>>,
    ends: Arc<Mutex<Vec<(EndReason, u64)>>>,
}

impl TraceSink for Log {
    fn on_tick(&mut self, e: &TickEvent<'_>) {
        self.fractions.lock().unwrap().push(e.fraction);
    }

    fn on_action_failure(&mut self, e: &ActionFailureEvent<'_>) {
        self.failures
            .lock()
            .unwrap()
            .push((e.failure.action.clone(), e.failure.panicked));
    }

    fn on_animation_end(&mut self, e: &AnimationEndEvent<'_>) {
        self.ends.lock().unwrap().push((e.reason, e.frames));
    }
}

fn ring(n: usize) -> Registry {
    let mut r = Registry::with_default_classes();
    let nodes: Vec<_> = (0..n)
        .map(|i| r.graph_mut().add_node(format!("n{i}")))
        .collect();
    for i in 0..n {
        r.graph_mut().add_edge(nodes[i], nodes[(i + 1) % n], false);
    }
    r
}

fn circle_pipeline() -> Pipeline {
    Pipeline::new("circle")
        .with(GraphFilter::default())
        .with(CircleLayout::default())
        .with(LocationInterpolator::new())
        .with_attr(attr::BOUNDS, Rect::new(0.0, 0.0, 400.0, 400.0))
        .with_duration(Duration::from_millis(1000))
}

#[test]
fn items_arrive_at_their_layout_positions() {
    let registry = RegistryHandle::new(ring(6));
    let repaints = Arc::new(AtomicU32::new(0));
    let r = Arc::clone(&repaints);
    let scheduler = Scheduler::new(
        registry.clone(),
        Arc::new(move || {
            r.fetch_add(1, Ordering::Relaxed);
        }),
    );
    let log = Log::default();
    let activity = scheduler
        .spawn_traced(circle_pipeline(), Box::new(log.clone()))
        .unwrap();

    activity
        .animate_with(AnimationConfig::default().with_frame_rate(20.0))
        .unwrap();
    assert!(activity.is_scheduled(), "scheduled as soon as requested");
    assert!(activity.wait_idle(WAIT), "animation finished");
    assert_eq!(activity.phase(), Phase::Idle);

    let reg = registry.lock();
    let stats = reg.stats();
    assert_eq!(stats.class(ItemClass::NODE).unwrap().visible, 6);
    assert_eq!(stats.class(ItemClass::EDGE).unwrap().visible, 6);

    let center = Point::new(200.0, 200.0);
    for (_, item) in reg.items_of(ItemClass::NODE).unwrap() {
        assert_eq!(item.location.current, item.location.end);
        let r = (item.location.end - center).hypot();
        assert!(r > 150.0 && r <= 200.0, "on the circle: {r}");
    }

    let fractions = log.fractions.lock().unwrap();
    assert_eq!(fractions.last().copied(), Some(1.0));
    // 1 s at 20 fps is about 20 ticks; allow for a slow machine.
    assert!(
        fractions.len() >= 2 && fractions.len() <= 40,
        "tick count {}",
        fractions.len()
    );
    let ends = log.ends.lock().unwrap();
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].0, EndReason::Finished);
    assert_eq!(ends[0].1, fractions.len() as u64);
    assert_eq!(
        repaints.load(Ordering::Relaxed) as usize,
        fractions.len(),
        "one repaint per tick"
    );
}

#[test]
fn failing_actions_do_not_stop_the_animation() {
    let registry = RegistryHandle::new(ring(3));
    let scheduler = Scheduler::new(registry.clone(), Arc::new(NoRepaint));
    let pipeline = circle_pipeline()
        .with(FnAction::new("broken", ActionKind::Animation, |_, _| {
            Err(ActionError::Failed("no".into()))
        }))
        .with(FnAction::new("explosive", ActionKind::Processing, |_, _| {
            panic!("boom")
        }))
        .with_duration(Duration::from_millis(100));
    let log = Log::default();
    let activity = scheduler
        .spawn_traced(pipeline, Box::new(log.clone()))
        .unwrap();

    activity
        .animate_with(AnimationConfig::smooth(Duration::from_millis(100)).with_frame_rate(50.0))
        .unwrap();
    assert!(activity.wait_idle(WAIT), "animation finished");

    let ends = log.ends.lock().unwrap();
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].0, EndReason::Finished);

    let failures = log.failures.lock().unwrap();
    assert_eq!(
        failures.first(),
        Some(&("explosive".to_owned(), true)),
        "the processing pass panicked first"
    );
    let broken = failures.iter().filter(|(name, _)| name == "broken").count();
    assert_eq!(broken as u64, ends[0].1, "fails on every tick");

    let reg = registry.lock();
    for (_, item) in reg.items_of(ItemClass::NODE).unwrap() {
        assert_eq!(item.location.current, item.location.end);
    }
}

#[test]
fn restart_continues_from_the_current_state() {
    let registry = RegistryHandle::new(ring(4));
    let scheduler = Scheduler::new(registry.clone(), Arc::new(NoRepaint));
    let log = Log::default();
    let pipeline = circle_pipeline().with_duration(Duration::from_secs(30));
    let activity = scheduler
        .spawn_traced(pipeline, Box::new(log.clone()))
        .unwrap();

    activity.animate().unwrap();
    let deadline = std::time::Instant::now() + WAIT;
    while log.fractions.lock().unwrap().len() < 2 && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }

    // Rotate the layout and restart with a short run.
    activity
        .pipeline()
        .set_enabled_by_name("circle-layout", false);
    activity
        .pipeline()
        .add(CircleLayout::default().with_start_angle(core::f64::consts::FRAC_PI_2));
    activity
        .animate_with(AnimationConfig::linear(Duration::from_millis(50)).with_frame_rate(100.0))
        .unwrap();
    assert!(activity.wait_idle(WAIT), "restarted animation finished");

    let reasons: Vec<EndReason> = log.ends.lock().unwrap().iter().map(|e| e.0).collect();
    assert_eq!(reasons, vec![EndReason::Restarted, EndReason::Finished]);

    let reg = registry.lock();
    let first = reg
        .items_of(ItemClass::NODE)
        .unwrap()
        .map(|(_, item)| item.location.current)
        .next()
        .unwrap();
    // The first node now sits at angle π/2.
    assert!((first.x - 200.0).abs() < 1e-9, "x = {}", first.x);
    assert!(first.y > 200.0, "y = {}", first.y);
}

#[test]
fn immediate_run_repaints_through_an_action() {
    let registry = RegistryHandle::new(ring(5));
    let repaints = Arc::new(AtomicU32::new(0));
    let r = Arc::clone(&repaints);
    let sink: Arc<dyn fovea_core::render::RepaintSink> = Arc::new(move || {
        r.fetch_add(1, Ordering::Relaxed);
    });
    let scheduler = Scheduler::new(registry.clone(), Arc::new(NoRepaint));
    let activity = scheduler
        .spawn(circle_pipeline().with(Repaint::new(sink)))
        .unwrap();

    let report = activity.run_now().unwrap();
    assert!(report.is_clean(), "{:?}", report.failures);
    assert_eq!(report.executed, 4);
    assert_eq!(repaints.load(Ordering::Relaxed), 1);

    let reg = registry.lock();
    for (_, item) in reg.items_of(ItemClass::NODE).unwrap() {
        assert_eq!(item.location.current, item.location.end, "jumped to the end");
    }
}

#[test]
fn vanishing_frame_rates_are_refused() {
    let registry = RegistryHandle::new(ring(3));
    let scheduler = Scheduler::new(registry, Arc::new(NoRepaint));
    let activity = scheduler.spawn(circle_pipeline()).unwrap();

    for rate in [1e-30, 1e-20, f64::MIN_POSITIVE] {
        let config = AnimationConfig::linear(Duration::from_millis(10)).with_frame_rate(rate);
        assert!(
            matches!(
                activity.animate_with(config),
                Err(Error::State(StateError::InvalidFrameRate(r))) if r == rate
            ),
            "rate {rate} has no representable frame interval"
        );
    }
    assert!(!activity.is_scheduled(), "nothing was queued");

    // A slow but representable rate still animates.
    activity
        .animate_with(AnimationConfig::linear(Duration::from_millis(10)).with_frame_rate(4.0))
        .unwrap();
    assert!(activity.wait_idle(WAIT), "finished on its first late tick");
}
