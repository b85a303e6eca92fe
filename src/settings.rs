//! Player settings and tuning
//!
//! Persisted separately from high scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_LEVEL;
use crate::membership::Tier;

/// Step accumulator tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepSettings {
    /// Acceleration change (m/s²) that counts as a step
    pub threshold: f64,
    /// Refractory window between counted steps
    pub min_step_interval_ms: f64,
    /// Period of the simulated fallback
    pub simulated_interval_ms: f64,
    /// Simulated mode adds 1..=this many steps per period
    pub simulated_max_increment: u32,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            threshold: 1.2,
            min_step_interval_ms: 300.0,
            simulated_interval_ms: 800.0,
            simulated_max_increment: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Membership tier last reported by the backend
    pub tier: Tier,
    /// Level new sessions start at
    pub starting_level: u32,
    pub steps: StepSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tier: Tier::default(),
            starting_level: DEFAULT_LEVEL,
            steps: StepSettings::default(),
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "zwap_arcade_settings";

    /// Multiplier applied to step rewards
    pub fn reward_multiplier(&self) -> f64 {
        self.tier.multiplier()
    }

    /// Starting level, never below 1
    pub fn level(&self) -> u32 {
        self.starting_level.max(1)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.tier, Tier::Starter);
        assert_eq!(settings.level(), 1);
        assert_eq!(settings.steps.threshold, 1.2);
        assert_eq!(settings.steps.min_step_interval_ms, 300.0);
        assert_eq!(settings.reward_multiplier(), 1.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"tier":"plus","steps":{"threshold":2.0}}"#).unwrap();
        assert_eq!(settings.tier, Tier::Plus);
        assert_eq!(settings.reward_multiplier(), 1.5);
        assert_eq!(settings.steps.threshold, 2.0);
        assert_eq!(settings.steps.simulated_interval_ms, 800.0);
        assert_eq!(settings.starting_level, 1);
    }

    #[test]
    fn test_level_floor() {
        let settings = Settings {
            starting_level: 0,
            ..Settings::default()
        };
        assert_eq!(settings.level(), 1);
    }
}
