//! Session runner shared by every game
//!
//! A host mounts a game by wrapping its simulation in a [`Runner`] and
//! keeping the returned [`EngineHandle`]. Input handlers only queue intents
//! on the runner; each frame takes the queued intents, updates the
//! simulation, then draws it. Everything the host registers for the
//! session (animation frame, timers, listeners) is held as a [`TaskGuard`]
//! so stopping or dropping the handle tears it all down.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::clamp_frame_dt;
use crate::render::Surface;

/// Final metrics reported when a session reaches its terminal condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEnd {
    pub score: u64,
    /// Game-specific metric (blocks destroyed, lines cleared, 0 for slots)
    pub secondary: u64,
    pub level: u32,
    /// Board cleared (brick-breaker win)
    pub cleared: bool,
}

impl GameEnd {
    /// Level the next session should start at
    pub fn next_level(&self) -> u32 {
        if self.cleared {
            self.level.saturating_add(1)
        } else {
            self.level
        }
    }
}

/// A game simulation driven one step per animation frame
pub trait Simulation {
    /// Intents queued between frames
    type Input: Default;

    /// Advance one tick. Returns `Some` only on the tick the terminal
    /// condition is first reached.
    fn step(&mut self, input: &Self::Input, dt_ms: f32) -> Option<GameEnd>;

    /// Draw the current state
    fn draw(&self, surface: &mut dyn Surface);

    fn is_over(&self) -> bool;
}

/// Completion callback handed in by the host
pub type OnGameEnd = Box<dyn FnOnce(GameEnd)>;

/// Guards the completion callback so it fires at most once per session
pub struct EndLatch {
    callback: Option<OnGameEnd>,
    fired: bool,
}

impl EndLatch {
    pub fn new(callback: OnGameEnd) -> Self {
        Self {
            callback: Some(callback),
            fired: false,
        }
    }

    /// A latch with nobody listening (headless runs)
    pub fn silent() -> Self {
        Self {
            callback: None,
            fired: false,
        }
    }

    /// Trip the latch. Only the first call yields a delivery.
    pub fn trip(&mut self, end: GameEnd) -> Option<PendingEnd> {
        if self.fired {
            return None;
        }
        self.fired = true;
        Some(PendingEnd {
            end,
            callback: self.callback.take(),
        })
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

/// A completion waiting to be handed to the host.
///
/// Delivered outside the runner borrow so the callback may stop the engine.
pub struct PendingEnd {
    pub end: GameEnd,
    callback: Option<OnGameEnd>,
}

impl PendingEnd {
    pub fn deliver(self) {
        if let Some(callback) = self.callback {
            callback(self.end);
        }
    }
}

/// Shared "stop requested" flag between a handle and its frame loop
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Rc<Cell<bool>>);

impl StopSignal {
    pub fn raise(&self) {
        self.0.set(true);
    }

    pub fn is_raised(&self) -> bool {
        self.0.get()
    }
}

/// Result of one frame
pub struct FrameOutcome {
    /// Whether the host should schedule another frame
    pub keep_running: bool,
    pub ended: Option<PendingEnd>,
}

/// Owns one session: the simulation, its queued intents and its end latch
pub struct Runner<S: Simulation> {
    sim: S,
    pending: S::Input,
    latch: EndLatch,
    stop: StopSignal,
    frames: u64,
}

impl<S: Simulation> Runner<S> {
    pub fn new(sim: S, on_end: OnGameEnd) -> Self {
        Self::with_latch(sim, EndLatch::new(on_end))
    }

    /// Runner without a completion callback
    pub fn headless(sim: S) -> Self {
        Self::with_latch(sim, EndLatch::silent())
    }

    fn with_latch(sim: S, latch: EndLatch) -> Self {
        Self {
            sim,
            pending: S::Input::default(),
            latch,
            stop: StopSignal::default(),
            frames: 0,
        }
    }

    pub fn sim(&self) -> &S {
        &self.sim
    }

    /// Intents consumed at the next frame
    pub fn input_mut(&mut self) -> &mut S::Input {
        &mut self.pending
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_raised()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn has_ended(&self) -> bool {
        self.latch.has_fired()
    }

    /// Run one update + draw
    pub fn frame(&mut self, dt_ms: f32, surface: &mut dyn Surface) -> FrameOutcome {
        if self.stop.is_raised() {
            return FrameOutcome {
                keep_running: false,
                ended: None,
            };
        }

        let mut ended = None;
        if !self.sim.is_over() {
            let input = std::mem::take(&mut self.pending);
            if let Some(end) = self.sim.step(&input, clamp_frame_dt(dt_ms)) {
                log::info!(
                    "Session over: score={} secondary={} level={} cleared={}",
                    end.score,
                    end.secondary,
                    end.level,
                    end.cleared
                );
                ended = self.latch.trip(end);
            }
        }

        // Update is done; draw the settled state
        self.sim.draw(surface);
        self.frames += 1;

        FrameOutcome {
            keep_running: !self.sim.is_over(),
            ended,
        }
    }
}

/// Cancels a scheduled task or registration when cancelled or dropped
pub struct TaskGuard {
    label: &'static str,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TaskGuard {
    pub fn new(label: &'static str, cancel: impl FnOnce() + 'static) -> Self {
        Self {
            label,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn cancel(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            log::debug!("Cancelling task: {}", self.label);
            cancel();
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.run();
    }
}

/// Host-side handle to a running session
pub struct EngineHandle<S: Simulation> {
    runner: Rc<RefCell<Runner<S>>>,
    stop: StopSignal,
    tasks: Vec<TaskGuard>,
}

impl<S: Simulation> EngineHandle<S> {
    pub fn new(runner: Rc<RefCell<Runner<S>>>) -> Self {
        let stop = runner.borrow().stop_signal();
        Self {
            runner,
            stop,
            tasks: Vec::new(),
        }
    }

    pub fn runner(&self) -> &Rc<RefCell<Runner<S>>> {
        &self.runner
    }

    /// Keep a registration alive for the lifetime of the session.
    /// Attaching to a stopped engine cancels the task right away.
    pub fn attach(&mut self, task: TaskGuard) {
        if self.stop.is_raised() {
            task.cancel();
        } else {
            self.tasks.push(task);
        }
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_raised()
    }

    /// Release everything the session holds. Safe to call repeatedly, and
    /// from inside the completion callback.
    pub fn stop(&mut self) {
        if self.stop.is_raised() && self.tasks.is_empty() {
            return;
        }
        self.stop.raise();
        // Last registered first
        while let Some(task) = self.tasks.pop() {
            task.cancel();
        }
        log::info!("Engine stopped");
    }
}

impl<S: Simulation> Drop for EngineHandle<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;

    /// Ends after a fixed number of steps
    struct Countdown {
        remaining: u32,
        steps: u32,
        pushes: u32,
    }

    #[derive(Default)]
    struct Push(u32);

    impl Simulation for Countdown {
        type Input = Push;

        fn step(&mut self, input: &Push, _dt_ms: f32) -> Option<GameEnd> {
            self.steps += 1;
            self.pushes += input.0;
            self.remaining = self.remaining.saturating_sub(1);
            (self.remaining == 0).then_some(GameEnd {
                score: u64::from(self.steps),
                secondary: 0,
                level: 1,
                cleared: false,
            })
        }

        fn draw(&self, surface: &mut dyn Surface) {
            surface.clear("#000");
        }

        fn is_over(&self) -> bool {
            self.remaining == 0
        }
    }

    fn countdown(n: u32) -> Countdown {
        Countdown {
            remaining: n,
            steps: 0,
            pushes: 0,
        }
    }

    #[test]
    fn test_callback_fires_exactly_once() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let mut runner = Runner::new(
            countdown(3),
            Box::new(move |end| {
                assert_eq!(end.score, 3);
                seen.set(seen.get() + 1);
            }),
        );
        let mut surface = RecordingSurface::new(10.0, 10.0);

        for _ in 0..20 {
            if let Some(pending) = runner.frame(16.0, &mut surface).ended {
                pending.deliver();
            }
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(runner.sim().steps, 3, "no steps after the terminal tick");
        assert!(runner.has_ended());
    }

    #[test]
    fn test_intents_consumed_once() {
        let mut runner = Runner::headless(countdown(5));
        let mut surface = RecordingSurface::new(10.0, 10.0);

        runner.input_mut().0 = 2;
        runner.frame(16.0, &mut surface);
        runner.frame(16.0, &mut surface);
        assert_eq!(runner.sim().pushes, 2);
    }

    #[test]
    fn test_stopped_runner_does_nothing() {
        let mut runner = Runner::headless(countdown(5));
        let mut surface = RecordingSurface::new(10.0, 10.0);
        runner.stop_signal().raise();

        let outcome = runner.frame(16.0, &mut surface);
        assert!(!outcome.keep_running);
        assert_eq!(runner.sim().steps, 0);
        assert!(surface.commands.is_empty());
    }

    #[test]
    fn test_stop_is_idempotent_and_cancels_each_task_once() {
        let runner = Rc::new(RefCell::new(Runner::headless(countdown(5))));
        let cancelled = Rc::new(Cell::new(0));

        let mut handle = EngineHandle::new(runner.clone());
        for label in ["frame", "keydown"] {
            let cancelled = cancelled.clone();
            handle.attach(TaskGuard::new(label, move || cancelled.set(cancelled.get() + 1)));
        }
        assert_eq!(handle.task_count(), 2);

        handle.stop();
        handle.stop();
        assert_eq!(cancelled.get(), 2);
        assert!(runner.borrow().is_stopped());

        // Late registrations are torn down immediately
        let late = cancelled.clone();
        handle.attach(TaskGuard::new("late", move || late.set(late.get() + 1)));
        assert_eq!(cancelled.get(), 3);
        assert_eq!(handle.task_count(), 0);
    }

    #[test]
    fn test_drop_releases_tasks() {
        let runner = Rc::new(RefCell::new(Runner::headless(countdown(5))));
        let cancelled = Rc::new(Cell::new(false));
        {
            let mut handle = EngineHandle::new(runner.clone());
            let flag = cancelled.clone();
            handle.attach(TaskGuard::new("timer", move || flag.set(true)));
        }
        assert!(cancelled.get());
        assert!(runner.borrow().is_stopped());
    }

    #[test]
    fn test_next_level() {
        let won = GameEnd {
            score: 900,
            secondary: 40,
            level: 2,
            cleared: true,
        };
        assert_eq!(won.next_level(), 3);
        assert_eq!(GameEnd { cleared: false, ..won }.next_level(), 2);
    }
}
