//! Step accumulator for the MOVE tab
//!
//! Idle until started. While tracking it counts at most one step per motion
//! sample whose acceleration change exceeds the threshold, with a refractory
//! window between counted steps. Without a motion sensor it falls back to a
//! simulated mode that adds a few steps per interval.

use std::fmt;

use glam::DVec3;

use crate::reward::compute_step_reward;
use crate::settings::StepSettings;
use crate::sim::rng::RandomSource;
use crate::submission::StepClaim;

/// Outcome of the host's motion permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionAccess {
    Granted,
    Denied,
    /// No motion sensor on this platform
    Unsupported,
}

/// Where counted steps come from while tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode {
    Motion,
    Simulated,
}

impl TrackingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingMode::Motion => "motion",
            TrackingMode::Simulated => "simulated",
        }
    }
}

/// One accelerometer reading. Any axis may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionSample {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub timestamp_ms: f64,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64, timestamp_ms: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
            timestamp_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    /// The user refused motion access
    PermissionDenied,
    ResetWhileTracking,
    ClaimWhileTracking,
    NothingToClaim,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::PermissionDenied => write!(f, "Motion permission required"),
            StepError::ResetWhileTracking => write!(f, "Stop tracking before resetting steps"),
            StepError::ClaimWhileTracking => write!(f, "Stop tracking before claiming steps"),
            StepError::NothingToClaim => write!(f, "No steps to claim"),
        }
    }
}

impl std::error::Error for StepError {}

#[derive(Debug, Clone)]
pub struct StepTracker {
    settings: StepSettings,
    steps: u64,
    mode: Option<TrackingMode>,
    /// Previous reading, kept across sessions
    last_accel: DVec3,
    last_step_ms: Option<f64>,
    simulated_timer_ms: f64,
}

impl Default for StepTracker {
    fn default() -> Self {
        Self::new(StepSettings::default())
    }
}

impl StepTracker {
    pub fn new(settings: StepSettings) -> Self {
        Self {
            settings,
            steps: 0,
            mode: None,
            last_accel: DVec3::ZERO,
            last_step_ms: None,
            simulated_timer_ms: 0.0,
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn mode(&self) -> Option<TrackingMode> {
        self.mode
    }

    pub fn is_tracking(&self) -> bool {
        self.mode.is_some()
    }

    pub fn settings(&self) -> &StepSettings {
        &self.settings
    }

    /// Idle -> Tracking. Starting while tracking keeps the current mode.
    pub fn start(&mut self, access: MotionAccess) -> Result<TrackingMode, StepError> {
        if let Some(mode) = self.mode {
            return Ok(mode);
        }
        let mode = match access {
            MotionAccess::Granted => TrackingMode::Motion,
            MotionAccess::Unsupported => TrackingMode::Simulated,
            MotionAccess::Denied => {
                log::warn!("Motion permission denied, staying idle");
                return Err(StepError::PermissionDenied);
            }
        };
        self.mode = Some(mode);
        self.last_step_ms = None;
        self.simulated_timer_ms = 0.0;
        log::info!("Step tracking started ({})", mode.as_str());
        Ok(mode)
    }

    /// Start, then attach the input source for the chosen mode. The source
    /// is only attached on a fresh start (`None` when already tracking). If
    /// attaching fails the tracker drops back to Idle.
    pub fn start_with<T, E: From<StepError>>(
        &mut self,
        access: MotionAccess,
        attach: impl FnOnce(TrackingMode) -> Result<T, E>,
    ) -> Result<(TrackingMode, Option<T>), E> {
        if let Some(mode) = self.mode {
            return Ok((mode, None));
        }
        let mode = self.start(access)?;
        match attach(mode) {
            Ok(source) => Ok((mode, Some(source))),
            Err(e) => {
                log::warn!("No {} step source, tracking stopped", mode.as_str());
                self.stop();
                Err(e)
            }
        }
    }

    /// Tracking -> Idle. The count is kept.
    pub fn stop(&mut self) -> u64 {
        if let Some(mode) = self.mode.take() {
            log::info!("Step tracking stopped ({}), {} steps", mode.as_str(), self.steps);
        }
        self.steps
    }

    /// Feed one motion reading. Returns whether it counted a step.
    pub fn on_motion(&mut self, sample: MotionSample) -> bool {
        if self.mode != Some(TrackingMode::Motion) {
            return false;
        }
        let Some(x) = sample.x else {
            return false;
        };
        let accel = DVec3::new(x, sample.y.unwrap_or(0.0), sample.z.unwrap_or(0.0));
        if !accel.is_finite() || !sample.timestamp_ms.is_finite() {
            return false;
        }

        let magnitude = (accel - self.last_accel).length();
        self.last_accel = accel;

        let rested = self
            .last_step_ms
            .is_none_or(|last| sample.timestamp_ms - last > self.settings.min_step_interval_ms);
        if magnitude > self.settings.threshold && rested {
            self.steps += 1;
            self.last_step_ms = Some(sample.timestamp_ms);
            log::trace!("Step counted ({magnitude:.2}), total {}", self.steps);
            return true;
        }
        false
    }

    /// Drive simulated mode by `dt_ms`. Returns the steps added.
    pub fn advance(&mut self, dt_ms: f64, rng: &mut dyn RandomSource) -> u64 {
        let interval = self.settings.simulated_interval_ms;
        if self.mode != Some(TrackingMode::Simulated) || interval <= 0.0 || !dt_ms.is_finite() {
            return 0;
        }
        let max = self.settings.simulated_max_increment.max(1) as usize;

        self.simulated_timer_ms += dt_ms.max(0.0);
        let mut added = 0;
        while self.simulated_timer_ms >= interval {
            self.simulated_timer_ms -= interval;
            added += 1 + rng.pick(max) as u64;
        }
        self.steps += added;
        added
    }

    /// Zero the count. Only while idle.
    pub fn reset(&mut self) -> Result<(), StepError> {
        if self.is_tracking() {
            return Err(StepError::ResetWhileTracking);
        }
        self.steps = 0;
        Ok(())
    }

    /// Hand the count over for claiming and zero it
    pub fn take_claim(&mut self) -> Result<StepClaim, StepError> {
        if self.is_tracking() {
            return Err(StepError::ClaimWhileTracking);
        }
        if self.steps == 0 {
            return Err(StepError::NothingToClaim);
        }
        let steps = std::mem::take(&mut self.steps);
        Ok(StepClaim { steps })
    }

    /// Live reward estimate for the current count
    pub fn reward_preview(&self, tier_multiplier: f64) -> f64 {
        compute_step_reward(self.steps, tier_multiplier)
    }
}
