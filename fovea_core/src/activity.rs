// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Running pipelines: once, or as timed animations on their own thread.
//!
//! The [`Scheduler`] binds a shared registry to a repaint sink. It runs a
//! pipeline synchronously with [`Scheduler::run_now`], or hands it to a
//! dedicated thread with [`Scheduler::spawn`], which returns an [`Activity`]
//! to control it.
//!
//! Each activity thread is a small state machine driven by control messages:
//!
//! ```text
//!            RunNow                         Start
//!   Running ◀────── Idle ─────────────────────────▶ Animating
//!      │             ▲  ▲                              │  ▲
//!      └─────────────┘  └──── finished / Cancel ───────┘  │ Start (restart)
//!                                                         └──┘
//! ```
//!
//! Starting an animation copies every item's `current` values into `start`,
//! runs the processing actions once to establish the new end state, and then
//! ticks: each tick derives `linear = min(elapsed / duration, 1)`, reshapes it
//! with the configured [`Pacing`], runs the animation actions with that
//! fraction, and requests a repaint. The last tick always runs with fraction
//! exactly 1.
//!
//! Control messages are read at the top of each tick. A new start request
//! restarts the animation from the current on-screen state; a cancel stops
//! ticking without rolling anything back.
//!
//! Lock order is registry, then pipeline.

use core::fmt;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::error::{Error, Result, StateError};
use crate::pacing::Pacing;
use crate::pipeline::{Pipeline, RunReport, StageFilter};
use crate::registry::RegistryHandle;
use crate::render::RepaintSink;
use crate::trace::{AnimationEndEvent, AnimationStartEvent, EndReason, TickEvent, TraceSink, Tracer};

/// Shortest pause between two ticks.
const MIN_SLEEP: Duration = Duration::from_millis(1);

/// Timing of an animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationConfig {
    /// Total time. `None` uses the pipeline's own duration.
    pub duration: Option<Duration>,
    /// Target ticks per second.
    pub frame_rate: f64,
    /// Reshaping of linear progress.
    pub pacing: Pacing,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: None,
            frame_rate: Self::DEFAULT_FRAME_RATE,
            pacing: Pacing::Linear,
        }
    }
}

impl AnimationConfig {
    /// Ticks per second unless configured otherwise.
    pub const DEFAULT_FRAME_RATE: f64 = 30.0;

    /// Linear progress over `duration`.
    #[must_use]
    pub const fn linear(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            frame_rate: Self::DEFAULT_FRAME_RATE,
            pacing: Pacing::Linear,
        }
    }

    /// Slow-in/slow-out progress over `duration`.
    #[must_use]
    pub const fn smooth(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            frame_rate: Self::DEFAULT_FRAME_RATE,
            pacing: Pacing::SlowInSlowOut,
        }
    }

    /// Sets the target frame rate.
    #[must_use]
    pub const fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Sets the pacing.
    #[must_use]
    pub const fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }
}

/// A validated animation request.
#[derive(Clone, Copy, Debug)]
struct Run {
    duration: Duration,
    interval: Duration,
    frame_rate: f64,
    pacing: Pacing,
}

impl Run {
    fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }
}

/// What an activity's thread is doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Phase {
    /// Waiting for a request.
    Idle = 0,
    /// Running the pipeline once.
    Running = 1,
    /// Ticking an animation.
    Animating = 2,
}

impl Phase {
    const fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Running,
            2 => Self::Animating,
            _ => Self::Idle,
        }
    }
}

enum Control {
    Start(Run),
    RunNow(Sender<RunReport>),
    Cancel,
    Shutdown,
}

/// State the activity and its thread both see.
#[derive(Debug)]
struct Shared {
    phase: AtomicU8,
    /// Requests sent but not yet taken up by the thread.
    pending: AtomicUsize,
}

impl Shared {
    fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    fn took_request(&self) {
        self.pending.fetch_sub(1, Ordering::AcqRel);
    }
}

fn lock_pipeline(pipeline: &Mutex<Pipeline>) -> MutexGuard<'_, Pipeline> {
    pipeline.lock().unwrap_or_else(PoisonError::into_inner)
}

fn tracer(sink: &mut Option<Box<dyn TraceSink + Send>>) -> Tracer<'_> {
    match sink.as_deref_mut() {
        Some(s) => Tracer::new(s),
        None => Tracer::none(),
    }
}

/// Runs pipelines against a shared registry.
#[derive(Clone)]
pub struct Scheduler {
    registry: RegistryHandle,
    repaint: Arc<dyn RepaintSink>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Creates a scheduler that repaints through `repaint`.
    pub fn new(registry: RegistryHandle, repaint: Arc<dyn RepaintSink>) -> Self {
        Self { registry, repaint }
    }

    /// The shared registry.
    #[must_use]
    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    /// Runs every enabled action of `pipeline` once, with fraction 1, under
    /// the registry lock, then requests one repaint.
    pub fn run_now(&self, pipeline: &mut Pipeline) -> RunReport {
        let report = {
            let mut registry = self.registry.lock();
            pipeline.run(&mut registry, 1.0, StageFilter::All)
        };
        self.repaint.repaint();
        report
    }

    /// Moves `pipeline` onto its own scheduler thread.
    pub fn spawn(&self, pipeline: Pipeline) -> Result<Activity> {
        self.spawn_inner(pipeline, None)
    }

    /// Like [`spawn`](Self::spawn), reporting the animation timeline to
    /// `sink`.
    pub fn spawn_traced(
        &self,
        pipeline: Pipeline,
        sink: Box<dyn TraceSink + Send>,
    ) -> Result<Activity> {
        self.spawn_inner(pipeline, Some(sink))
    }

    fn spawn_inner(
        &self,
        pipeline: Pipeline,
        sink: Option<Box<dyn TraceSink + Send>>,
    ) -> Result<Activity> {
        let name = pipeline.name().to_owned();
        let pipeline = Arc::new(Mutex::new(pipeline));
        let shared = Arc::new(Shared {
            phase: AtomicU8::new(Phase::Idle as u8),
            pending: AtomicUsize::new(0),
        });
        let (tx, rx) = crossbeam_channel::unbounded();
        let worker = Worker {
            name: name.clone(),
            registry: self.registry.clone(),
            pipeline: Arc::clone(&pipeline),
            repaint: Arc::clone(&self.repaint),
            shared: Arc::clone(&shared),
            rx,
            sink,
        };
        let thread = thread::Builder::new()
            .name(format!("fovea:{name}"))
            .spawn(move || worker.run())
            .map_err(Error::Spawn)?;
        tracing::debug!(pipeline = %name, "scheduler thread started");
        Ok(Activity {
            name,
            pipeline,
            shared,
            tx,
            thread: Some(thread),
        })
    }
}

/// Control handle for a pipeline running on its own scheduler thread.
///
/// Dropping the handle shuts the thread down.
pub struct Activity {
    name: String,
    pipeline: Arc<Mutex<Pipeline>>,
    shared: Arc<Shared>,
    tx: Sender<Control>,
    thread: Option<JoinHandle<()>>,
}

impl fmt::Debug for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activity")
            .field("name", &self.name)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl Activity {
    /// The pipeline's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the thread is doing right now.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared.phase()
    }

    /// Whether the pipeline is running, animating, or has a request queued.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.shared.pending.load(Ordering::Acquire) > 0 || self.shared.phase() != Phase::Idle
    }

    /// Blocks until the activity is no longer scheduled or `timeout`
    /// elapses. Returns whether it went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.is_scheduled() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(MIN_SLEEP);
        }
    }

    /// Locks the pipeline for inspection or reconfiguration.
    ///
    /// Do not lock the registry while holding the guard: the scheduler
    /// thread takes the registry first.
    pub fn pipeline(&self) -> MutexGuard<'_, Pipeline> {
        lock_pipeline(&self.pipeline)
    }

    /// Animates over the pipeline's configured duration with default timing.
    pub fn animate(&self) -> Result<()> {
        self.animate_with(AnimationConfig::default())
    }

    /// Starts, or restarts, an animation.
    ///
    /// Fails without scheduling anything if neither `config` nor the pipeline
    /// has a duration, or if the frame rate is not a positive finite number
    /// whose frame interval fits in a [`Duration`].
    pub fn animate_with(&self, config: AnimationConfig) -> Result<()> {
        if !(config.frame_rate.is_finite() && config.frame_rate > 0.0) {
            return Err(StateError::InvalidFrameRate(config.frame_rate).into());
        }
        // Rates so low that the interval overflows `Duration` are refused too.
        let interval = Duration::try_from_secs_f64(1.0 / config.frame_rate)
            .map_err(|_| StateError::InvalidFrameRate(config.frame_rate))?;
        let duration = config
            .duration
            .or_else(|| self.pipeline().duration())
            .ok_or_else(|| StateError::NoDuration(self.name.clone()))?;
        let run = Run {
            duration,
            interval,
            frame_rate: config.frame_rate,
            pacing: config.pacing,
        };
        self.send(Control::Start(run))
    }

    /// Stops a running animation where it is.
    pub fn cancel(&self) -> Result<()> {
        self.send(Control::Cancel)
    }

    /// Runs every enabled action once on the scheduler thread and waits for
    /// the report.
    pub fn run_now(&self) -> Result<RunReport> {
        let (reply, report) = crossbeam_channel::bounded(1);
        self.send(Control::RunNow(reply))?;
        report
            .recv()
            .map_err(|_| StateError::SchedulerStopped(self.name.clone()).into())
    }

    /// Stops the thread, ending any running animation, and waits for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn send(&self, msg: Control) -> Result<()> {
        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(msg).is_err() {
            self.shared.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(StateError::SchedulerStopped(self.name.clone()).into());
        }
        Ok(())
    }

    fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        // A send error means the thread is already gone.
        _ = self.tx.send(Control::Shutdown);
        if thread.join().is_err() {
            tracing::warn!(pipeline = %self.name, "scheduler thread panicked");
        }
    }
}

impl Drop for Activity {
    fn drop(&mut self) {
        self.stop();
    }
}

/// How an animation loop handed control back.
enum Flow {
    Continue,
    Shutdown,
}

struct Worker {
    name: String,
    registry: RegistryHandle,
    pipeline: Arc<Mutex<Pipeline>>,
    repaint: Arc<dyn RepaintSink>,
    shared: Arc<Shared>,
    rx: Receiver<Control>,
    sink: Option<Box<dyn TraceSink + Send>>,
}

impl Worker {
    fn run(mut self) {
        while let Ok(msg) = self.rx.recv() {
            match msg {
                Control::Start(run) => {
                    if let Flow::Shutdown = self.animate(run) {
                        break;
                    }
                }
                Control::RunNow(reply) => {
                    self.shared.set_phase(Phase::Running);
                    self.shared.took_request();
                    let report = self.run_once();
                    _ = reply.send(report);
                    self.shared.set_phase(Phase::Idle);
                }
                Control::Cancel => self.shared.took_request(),
                Control::Shutdown => break,
            }
        }
        self.shared.set_phase(Phase::Idle);
        tracing::debug!(pipeline = %self.name, "scheduler thread stopped");
    }

    fn run_once(&mut self) -> RunReport {
        let report = {
            let mut registry = self.registry.lock();
            lock_pipeline(&self.pipeline).run(&mut registry, 1.0, StageFilter::All)
        };
        self.repaint.repaint();
        tracer(&mut self.sink).pipeline_run(&self.name, StageFilter::All, 1.0, &report);
        report
    }

    /// Settles start values and runs the processing actions. Returns the
    /// instant progress is measured from.
    fn start_pass(&mut self, run: &Run, restart: bool) -> Instant {
        let report = {
            let mut registry = self.registry.lock();
            registry.settle_starts();
            lock_pipeline(&self.pipeline).run(&mut registry, 0.0, StageFilter::Processing)
        };
        let at = Instant::now();
        tracing::debug!(
            pipeline = %self.name,
            duration = ?run.duration,
            frame_rate = run.frame_rate,
            restart,
            "animation started"
        );
        let mut tracer = tracer(&mut self.sink);
        tracer.pipeline_run(&self.name, StageFilter::Processing, 0.0, &report);
        tracer.animation_start(&AnimationStartEvent {
            pipeline: &self.name,
            at,
            duration: run.duration,
            frame_rate: run.frame_rate,
            restart,
        });
        at
    }

    fn end(&mut self, reason: EndReason, frames: u64, started: Instant) {
        let at = Instant::now();
        let elapsed = at.saturating_duration_since(started);
        tracing::debug!(pipeline = %self.name, reason = reason.label(), frames, ?elapsed, "animation ended");
        tracer(&mut self.sink).animation_end(&AnimationEndEvent {
            pipeline: &self.name,
            at,
            reason,
            frames,
            elapsed,
        });
    }

    fn animate(&mut self, mut run: Run) -> Flow {
        let mut restart = false;
        'animation: loop {
            self.shared.set_phase(Phase::Animating);
            self.shared.took_request();
            let started = self.start_pass(&run, restart);
            let mut frames = 0_u64;

            loop {
                match self.rx.try_recv() {
                    Ok(Control::Start(next)) => {
                        self.end(EndReason::Restarted, frames, started);
                        run = next;
                        restart = true;
                        continue 'animation;
                    }
                    Ok(Control::Cancel) => {
                        self.shared.took_request();
                        self.end(EndReason::Cancelled, frames, started);
                        break 'animation;
                    }
                    Ok(Control::RunNow(reply)) => {
                        self.shared.took_request();
                        _ = reply.send(self.run_once());
                    }
                    Ok(Control::Shutdown) | Err(TryRecvError::Disconnected) => {
                        self.end(EndReason::ShutDown, frames, started);
                        return Flow::Shutdown;
                    }
                    Err(TryRecvError::Empty) => {}
                }

                let tick = Instant::now();
                let elapsed = tick.saturating_duration_since(started);
                let linear = run.progress(elapsed);
                let fraction = run.pacing.apply(linear);
                let report = {
                    let mut registry = self.registry.lock();
                    lock_pipeline(&self.pipeline).run(
                        &mut registry,
                        fraction,
                        StageFilter::Animation,
                    )
                };
                self.repaint.repaint();
                let work = tick.elapsed();

                let mut tracer = tracer(&mut self.sink);
                tracer.pipeline_run(&self.name, StageFilter::Animation, fraction, &report);
                tracer.tick(&TickEvent {
                    pipeline: &self.name,
                    frame_index: frames,
                    at: tick,
                    elapsed,
                    linear,
                    fraction,
                    work,
                });
                frames += 1;

                if linear >= 1.0 {
                    self.end(EndReason::Finished, frames, started);
                    break 'animation;
                }
                thread::sleep(run.interval.saturating_sub(work).max(MIN_SLEEP));
            }
        }
        self.shared.set_phase(Phase::Idle);
        Flow::Continue
    }
}
