//! ZWAP! arcade core - the move/play side of the rewards app
//!
//! Core modules:
//! - `sim`: Deterministic game simulations (brick-breaker, falling blocks, slots)
//! - `engine`: Frame runner, completion latch and cancellable task handles
//! - `render`: 2D drawing surface abstraction
//! - `steps`: Step accumulator for the MOVE tab
//! - `reward`: Pure reward calculators
//! - `platform`: Browser bindings (canvas, input listeners, motion sensor)

pub mod engine;
pub mod highscores;
pub mod membership;
pub mod platform;
pub mod render;
pub mod reward;
pub mod settings;
pub mod sim;
pub mod steps;
pub mod submission;

pub use engine::{EngineHandle, GameEnd, Runner, Simulation, TaskGuard};
pub use highscores::HighScores;
pub use membership::{GameKind, Tier};
pub use reward::{RewardQuote, compute_brick_reward, compute_step_reward};
pub use settings::{Settings, StepSettings};
pub use steps::{MotionAccess, MotionSample, StepTracker, TrackingMode};

/// Engine-wide configuration constants
pub mod consts {
    /// Largest frame delta fed to a simulation (ms). Longer gaps (hidden tab,
    /// debugger pause) are clamped so timers don't fire in bursts.
    pub const MAX_FRAME_DT_MS: f32 = 250.0;
    /// Delta assumed for the very first frame (ms)
    pub const FIRST_FRAME_DT_MS: f32 = 1000.0 / 60.0;

    /// Level every session starts at unless the host says otherwise
    pub const DEFAULT_LEVEL: u32 = 1;
    /// Seed used by the headless demo when none is given
    pub const DEFAULT_SEED: u64 = 0x5A57_4150;
}

/// Clamp a raw frame delta (ms) into the range the simulations expect
#[inline]
pub fn clamp_frame_dt(dt_ms: f32) -> f32 {
    if dt_ms.is_finite() {
        dt_ms.clamp(0.0, consts::MAX_FRAME_DT_MS)
    } else {
        0.0
    }
}
