//! Browser bindings
//!
//! Mounts the engines on a canvas, wires input listeners into their intent
//! queues and exposes the step tracker and reward calculators to JS. Every
//! listener, timer and animation frame is owned by a [`TaskGuard`], so
//! stopping an engine or tracker removes them synchronously.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand_pcg::Pcg32;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{JsFuture, future_to_promise, spawn_local};
use web_sys::{DeviceMotionEvent, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

use super::canvas::CanvasSurface;
use crate::consts::FIRST_FRAME_DT_MS;
use crate::engine::{EngineHandle, GameEnd, Runner, Simulation, TaskGuard};
use crate::highscores::HighScores;
use crate::membership::{GameKind, Tier};
use crate::reward;
use crate::settings::Settings;
use crate::sim::blocks::{self, BlockState, TouchGesture, command_for_key};
use crate::sim::bricks::{self, BrickState};
use crate::sim::rng::RngState;
use crate::sim::slots::{self, SlotState};
use crate::steps::{MotionAccess, MotionSample, StepError, StepTracker, TrackingMode};
use crate::submission::{GameResult, StepClaim};

#[wasm_bindgen(inline_js = "
    export function motion_support() {
        if (typeof DeviceMotionEvent === 'undefined') return 'unsupported';
        if (typeof DeviceMotionEvent.requestPermission === 'function') return 'prompt';
        return 'granted';
    }

    export function request_motion_permission() {
        return DeviceMotionEvent.requestPermission();
    }
")]
extern "C" {
    fn motion_support() -> String;
    fn request_motion_permission() -> js_sys::Promise;
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("ZWAP! arcade core loaded");
}

/// A game that can be mounted on a canvas
trait WebGame: Simulation + 'static {
    const KIND: GameKind;
    const SIZE: (f32, f32);
}

impl WebGame for BrickState {
    const KIND: GameKind = GameKind::Bricks;
    const SIZE: (f32, f32) = (bricks::state::SURFACE_WIDTH, bricks::state::SURFACE_HEIGHT);
}

impl WebGame for BlockState<Pcg32> {
    const KIND: GameKind = GameKind::FallingBlocks;
    const SIZE: (f32, f32) = (blocks::SURFACE_WIDTH, blocks::SURFACE_HEIGHT);
}

impl WebGame for SlotState<Pcg32> {
    const KIND: GameKind = GameKind::Slots;
    const SIZE: (f32, f32) = (slots::SURFACE_WIDTH, slots::SURFACE_HEIGHT);
}

impl From<StepError> for JsValue {
    fn from(e: StepError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

/// Seed from JS, or the clock when none is given
fn seed_from_js(seed: Option<f64>) -> u64 {
    match seed {
        Some(s) if s.is_finite() && s >= 0.0 => s as u64,
        _ => js_sys::Date::now() as u64,
    }
}

/// Closures may still be on the stack when their guard is cancelled (a
/// completion callback that stops the engine), so they are dropped later.
fn drop_later<T: 'static>(value: T) {
    spawn_local(async move { drop(value) });
}

/// Register an event listener for the lifetime of the returned guard
fn listen(
    target: &EventTarget,
    event: &'static str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<TaskGuard, JsValue> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    let target = target.clone();
    Ok(TaskGuard::new(event, move || {
        let _ = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        drop_later(closure);
    }))
}

/// Run `tick` every `period_ms` for the lifetime of the returned guard
fn every(label: &'static str, period_ms: i32, tick: impl FnMut() + 'static) -> Result<TaskGuard, JsValue> {
    let window = window()?;
    let closure = Closure::<dyn FnMut()>::new(tick);
    let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        period_ms,
    )?;
    Ok(TaskGuard::new(label, move || {
        window.clear_interval_with_handle(id);
        drop_later(closure);
    }))
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Drive `runner` from requestAnimationFrame until it finishes or the
/// guard is cancelled
fn frame_loop<S: Simulation + 'static>(
    runner: Rc<RefCell<Runner<S>>>,
    mut surface: CanvasSurface,
) -> Result<TaskGuard, JsValue> {
    let window = window()?;
    let pending_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
    let callback: FrameCallback = Rc::new(RefCell::new(None));

    let next = callback.clone();
    let id = pending_id.clone();
    let win = window.clone();
    let mut last_time: Option<f64> = None;
    *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
        id.set(None);
        let dt = last_time.map_or(FIRST_FRAME_DT_MS, |prev| (time - prev) as f32);
        last_time = Some(time);

        let outcome = runner.borrow_mut().frame(dt, &mut surface);
        if outcome.keep_running {
            if let Some(cb) = next.borrow().as_ref() {
                match win.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(handle) => id.set(Some(handle)),
                    Err(e) => log::warn!("requestAnimationFrame failed: {e:?}"),
                }
            }
        }
        // Runner borrow is released; the callback may stop the engine
        if let Some(ended) = outcome.ended {
            ended.deliver();
        }
    }));

    if let Some(cb) = callback.borrow().as_ref() {
        pending_id.set(Some(window.request_animation_frame(cb.as_ref().unchecked_ref())?));
    }

    Ok(TaskGuard::new("animation-frame", move || {
        if let Some(handle) = pending_id.take() {
            let _ = window.cancel_animation_frame(handle);
        }
        // Breaks the self-reference cycle
        if let Some(closure) = callback.borrow_mut().take() {
            drop_later(closure);
        }
    }))
}

/// Wrap the JS completion callback: record the high score, then call
/// `on_end(score, secondary, level, cleared)`
fn completion<S: WebGame>(on_end: js_sys::Function) -> Box<dyn FnOnce(GameEnd)> {
    Box::new(move |end: GameEnd| {
        let mut scores = HighScores::load();
        if scores.record(S::KIND, &end, js_sys::Date::now()).is_some() {
            scores.save();
        }
        let args = js_sys::Array::of4(
            &JsValue::from_f64(end.score as f64),
            &JsValue::from_f64(end.secondary as f64),
            &JsValue::from(end.level),
            &JsValue::from_bool(end.cleared),
        );
        if let Err(e) = on_end.apply(&JsValue::NULL, &args) {
            log::warn!("Game end callback threw: {e:?}");
        }
    })
}

fn mount<S: WebGame>(
    canvas: &HtmlCanvasElement,
    sim: S,
    on_end: js_sys::Function,
) -> Result<EngineHandle<S>, JsValue> {
    let (width, height) = S::SIZE;
    let surface = CanvasSurface::new(canvas, width, height)?;
    let runner = Rc::new(RefCell::new(Runner::new(sim, completion::<S>(on_end))));
    let mut handle = EngineHandle::new(runner.clone());
    handle.attach(frame_loop(runner, surface)?);
    Ok(handle)
}

/// Client x mapped into logical surface units
fn surface_x(canvas: &HtmlCanvasElement, client_x: i32, logical_width: f32) -> Option<f32> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 {
        return None;
    }
    let scale = f64::from(logical_width) / rect.width();
    Some(((f64::from(client_x) - rect.left()) * scale) as f32)
}

fn surface_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32, size: (f32, f32)) -> Option<(f32, f32)> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let x = (f64::from(client_x) - rect.left()) * f64::from(size.0) / rect.width();
    let y = (f64::from(client_y) - rect.top()) * f64::from(size.1) / rect.height();
    Some((x as f32, y as f32))
}

enum Mounted {
    Bricks(EngineHandle<BrickState>),
    Blocks(EngineHandle<BlockState<Pcg32>>),
    Slots(EngineHandle<SlotState<Pcg32>>),
}

/// A running game session
#[wasm_bindgen]
pub struct WebEngine {
    mounted: Mounted,
}

#[wasm_bindgen]
impl WebEngine {
    /// Remove every listener and cancel the frame loop. Idempotent.
    pub fn stop(&mut self) {
        match &mut self.mounted {
            Mounted::Bricks(handle) => handle.stop(),
            Mounted::Blocks(handle) => handle.stop(),
            Mounted::Slots(handle) => handle.stop(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn stopped(&self) -> bool {
        match &self.mounted {
            Mounted::Bricks(handle) => handle.is_stopped(),
            Mounted::Blocks(handle) => handle.is_stopped(),
            Mounted::Slots(handle) => handle.is_stopped(),
        }
    }

    /// Queue a spin (slots only). Returns whether it was queued.
    pub fn spin(&self) -> bool {
        match &self.mounted {
            Mounted::Slots(handle) if !handle.is_stopped() => {
                handle.runner().borrow_mut().input_mut().request();
                true
            }
            _ => false,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn game(&self) -> String {
        let kind = match &self.mounted {
            Mounted::Bricks(_) => GameKind::Bricks,
            Mounted::Blocks(_) => GameKind::FallingBlocks,
            Mounted::Slots(_) => GameKind::Slots,
        };
        kind.api_id().to_string()
    }
}

#[wasm_bindgen]
pub fn start_bricks(
    canvas: HtmlCanvasElement,
    level: u32,
    on_end: js_sys::Function,
) -> Result<WebEngine, JsValue> {
    log::info!("Starting bricks at level {level}");
    let mut handle = mount(&canvas, BrickState::new(level), on_end)?;
    let width = bricks::state::SURFACE_WIDTH;

    let runner = handle.runner().clone();
    let target = canvas.clone();
    handle.attach(listen(&canvas, "mousemove", move |event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        if let Some(x) = surface_x(&target, event.client_x(), width) {
            runner.borrow_mut().input_mut().point(x);
        }
    })?);

    let runner = handle.runner().clone();
    let target = canvas.clone();
    handle.attach(listen(&canvas, "touchmove", move |event| {
        let Some(touch_event) = event.dyn_ref::<TouchEvent>() else {
            return;
        };
        event.prevent_default();
        let Some(touch) = touch_event.touches().get(0) else {
            return;
        };
        if let Some(x) = surface_x(&target, touch.client_x(), width) {
            runner.borrow_mut().input_mut().point(x);
        }
    })?);

    Ok(WebEngine {
        mounted: Mounted::Bricks(handle),
    })
}

#[wasm_bindgen]
pub fn start_falling_blocks(
    canvas: HtmlCanvasElement,
    level: u32,
    seed: Option<f64>,
    on_end: js_sys::Function,
) -> Result<WebEngine, JsValue> {
    let seed = seed_from_js(seed);
    log::info!("Starting falling blocks at level {level} (seed {seed})");
    let mut handle = mount(&canvas, BlockState::new(level, seed), on_end)?;
    let size = (blocks::SURFACE_WIDTH, blocks::SURFACE_HEIGHT);

    let runner = handle.runner().clone();
    handle.attach(listen(window()?.as_ref(), "keydown", move |event| {
        let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if let Some(command) = command_for_key(&key_event.key()) {
            event.prevent_default();
            runner.borrow_mut().input_mut().push(command);
        }
    })?);

    let gesture = Rc::new(RefCell::new(TouchGesture::default()));

    let target = canvas.clone();
    let touch = gesture.clone();
    handle.attach(listen(&canvas, "touchstart", move |event| {
        let Some(touch_event) = event.dyn_ref::<TouchEvent>() else {
            return;
        };
        event.prevent_default();
        if let Some(t) = touch_event.touches().get(0) {
            if let Some((x, y)) = surface_point(&target, t.client_x(), t.client_y(), size) {
                touch.borrow_mut().begin(x, y);
            }
        }
    })?);

    let runner = handle.runner().clone();
    let target = canvas.clone();
    let touch = gesture.clone();
    handle.attach(listen(&canvas, "touchmove", move |event| {
        let Some(touch_event) = event.dyn_ref::<TouchEvent>() else {
            return;
        };
        event.prevent_default();
        let Some(t) = touch_event.touches().get(0) else {
            return;
        };
        let Some((x, y)) = surface_point(&target, t.client_x(), t.client_y(), size) else {
            return;
        };
        let commands = touch.borrow_mut().motion(x, y);
        let mut runner = runner.borrow_mut();
        for command in commands {
            runner.input_mut().push(command);
        }
    })?);

    let runner = handle.runner().clone();
    handle.attach(listen(&canvas, "touchend", move |event| {
        event.prevent_default();
        if let Some(command) = gesture.borrow_mut().end() {
            runner.borrow_mut().input_mut().push(command);
        }
    })?);

    Ok(WebEngine {
        mounted: Mounted::Blocks(handle),
    })
}

#[wasm_bindgen]
pub fn start_slots(
    canvas: HtmlCanvasElement,
    level: u32,
    seed: Option<f64>,
    on_end: js_sys::Function,
) -> Result<WebEngine, JsValue> {
    let seed = seed_from_js(seed);
    log::info!("Starting slots at level {level} (seed {seed})");
    let mut handle = mount(&canvas, SlotState::new(level, seed), on_end)?;

    let runner = handle.runner().clone();
    handle.attach(listen(&canvas, "click", move |_event| {
        runner.borrow_mut().input_mut().request();
    })?);

    Ok(WebEngine {
        mounted: Mounted::Slots(handle),
    })
}

fn count_from_js(steps: f64) -> u64 {
    if steps.is_finite() && steps > 0.0 {
        steps as u64
    } else {
        0
    }
}

#[wasm_bindgen]
pub fn compute_step_reward(steps: f64, tier_multiplier: f64) -> f64 {
    reward::compute_step_reward(count_from_js(steps), tier_multiplier)
}

#[wasm_bindgen]
pub fn compute_brick_reward(score: f64, blocks_destroyed: f64) -> f64 {
    reward::compute_brick_reward(count_from_js(score), count_from_js(blocks_destroyed))
}

/// Validated JSON body for a finished session
#[wasm_bindgen]
pub fn game_result_json(game: &str, score: f64, secondary: f64, level: u32, tier: &str) -> Result<String, JsValue> {
    let kind = GameKind::from_api_id(game).ok_or_else(|| JsValue::from_str(&format!("Unknown game: {game}")))?;
    let tier = Tier::parse(tier).unwrap_or_default();
    let end = GameEnd {
        score: count_from_js(score),
        secondary: count_from_js(secondary),
        level,
        cleared: false,
    };
    let result = GameResult::from_end(kind, &end);
    result
        .validate(tier)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    result.to_json().map_err(|e| JsValue::from_str(&e.to_string()))
}

async fn request_motion_access() -> MotionAccess {
    match motion_support().as_str() {
        "unsupported" => MotionAccess::Unsupported,
        "prompt" => match JsFuture::from(request_motion_permission()).await {
            Ok(state) if state.as_string().as_deref() == Some("granted") => MotionAccess::Granted,
            Ok(_) => MotionAccess::Denied,
            Err(e) => {
                log::warn!("Motion permission request failed: {e:?}");
                MotionAccess::Denied
            }
        },
        _ => MotionAccess::Granted,
    }
}

fn motion_sample(event: &DeviceMotionEvent) -> Option<MotionSample> {
    let accel = event
        .acceleration_including_gravity()
        .or_else(|| event.acceleration())?;
    Some(MotionSample {
        x: accel.x(),
        y: accel.y(),
        z: accel.z(),
        timestamp_ms: js_sys::Date::now(),
    })
}

/// Step tracker for the MOVE tab
#[wasm_bindgen]
pub struct WebStepTracker {
    tracker: Rc<RefCell<StepTracker>>,
    rng: Rc<RefCell<Pcg32>>,
    tasks: Rc<RefCell<Vec<TaskGuard>>>,
    /// Bumped by `stop` so a start still awaiting permission gives up
    generation: Rc<Cell<u32>>,
}

impl Default for WebStepTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WebStepTracker {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let settings = Settings::load();
        Self {
            tracker: Rc::new(RefCell::new(StepTracker::new(settings.steps))),
            rng: Rc::new(RefCell::new(RngState::new(js_sys::Date::now() as u64).to_rng())),
            tasks: Rc::new(RefCell::new(Vec::new())),
            generation: Rc::new(Cell::new(0)),
        }
    }

    /// Ask for motion access and start counting. Resolves to "motion" or
    /// "simulated"; rejects when permission is denied.
    pub fn start(&self) -> js_sys::Promise {
        let tracker = self.tracker.clone();
        let rng = self.rng.clone();
        let tasks = self.tasks.clone();
        let generation = self.generation.clone();
        let started_at = generation.get();

        future_to_promise(async move {
            let access = request_motion_access().await;
            if generation.get() != started_at {
                return Err(JsValue::from_str("Tracking was stopped"));
            }

            let period = tracker.borrow().settings().simulated_interval_ms;
            let source = tracker.clone();
            let (mode, guard) = tracker.borrow_mut().start_with(access, move |mode| match mode {
                TrackingMode::Motion => window().and_then(|window| {
                    listen(window.as_ref(), "devicemotion", move |event| {
                        let sample = event.dyn_ref::<DeviceMotionEvent>().and_then(motion_sample);
                        if let Some(sample) = sample {
                            source.borrow_mut().on_motion(sample);
                        }
                    })
                }),
                TrackingMode::Simulated => every("simulated-steps", period as i32, move || {
                    source.borrow_mut().advance(period, &mut *rng.borrow_mut());
                }),
            })?;
            tasks.borrow_mut().extend(guard);
            Ok(JsValue::from_str(mode.as_str()))
        })
    }

    /// Stop counting; the count is kept. Returns it.
    pub fn stop(&self) -> f64 {
        self.generation.set(self.generation.get().wrapping_add(1));
        let mut tasks = self.tasks.borrow_mut();
        while let Some(task) = tasks.pop() {
            task.cancel();
        }
        self.tracker.borrow_mut().stop() as f64
    }

    pub fn reset(&self) -> Result<(), JsValue> {
        self.tracker
            .borrow_mut()
            .reset()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Take the count as a validated JSON claim body. The count is zeroed
    /// only when the claim is accepted.
    pub fn claim(&self) -> Result<String, JsValue> {
        let mut tracker = self.tracker.borrow_mut();
        if !tracker.is_tracking() {
            StepClaim {
                steps: tracker.steps(),
            }
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        }
        let claim = tracker
            .take_claim()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        claim.to_json().map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn steps(&self) -> f64 {
        self.tracker.borrow().steps() as f64
    }

    #[wasm_bindgen(getter)]
    pub fn tracking(&self) -> bool {
        self.tracker.borrow().is_tracking()
    }

    pub fn reward(&self, tier_multiplier: f64) -> f64 {
        self.tracker.borrow().reward_preview(tier_multiplier)
    }
}
