//! Reward calculators
//!
//! Pure functions of session metrics. Live previews and final settlement
//! call the same functions with the same inputs, so they always agree.

use serde::{Deserialize, Serialize};

/// Step bands as (width in steps, hundredths of a credit per step).
/// Steps past the last band earn [`TOP_RATE_CENTS`].
const STEP_BANDS: [(u64, u64); 3] = [(1_000, 1), (4_000, 2), (5_000, 3)];
const TOP_RATE_CENTS: u64 = 5;

/// Credit per destroyed brick
pub const BRICK_BLOCK_RATE: f64 = 0.5;
/// Score below this earns no score bonus
pub const BRICK_SCORE_THRESHOLD: u64 = 1_000;
pub const BRICK_SCORE_RATE: f64 = 0.01;
/// Most a single brick-breaker session can earn
pub const BRICK_REWARD_CAP: f64 = 500.0;

/// Loyalty points per primary credit
pub const SECONDARY_PER_PRIMARY: f64 = 1_000.0;

/// Step reward before the tier multiplier, in hundredths of a credit
fn step_reward_cents(steps: u64) -> u128 {
    let mut remaining = u128::from(steps);
    let mut cents = 0u128;
    for (width, rate) in STEP_BANDS {
        let take = remaining.min(u128::from(width));
        cents += take * u128::from(rate);
        remaining -= take;
    }
    cents + remaining * u128::from(TOP_RATE_CENTS)
}

/// Tiered marginal step reward, scaled by the membership multiplier.
///
/// 1,000 steps earn 10, 5,000 earn 90 and 10,000 earn 240 at multiplier 1.
pub fn compute_step_reward(steps: u64, tier_multiplier: f64) -> f64 {
    let base = step_reward_cents(steps) as f64 / 100.0;
    base * tier_multiplier
}

/// Per-block rate plus a bonus for score above 1,000, capped at 500
pub fn compute_brick_reward(score: u64, blocks_destroyed: u64) -> f64 {
    let raw = blocks_destroyed as f64 * BRICK_BLOCK_RATE
        + score.saturating_sub(BRICK_SCORE_THRESHOLD) as f64 * BRICK_SCORE_RATE;
    raw.min(BRICK_REWARD_CAP)
}

/// Convert loyalty points to primary credit at the fixed rate
pub fn secondary_to_primary(points: u64) -> f64 {
    points as f64 / SECONDARY_PER_PRIMARY
}

/// Reward derived from one session's metrics. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardQuote {
    pub amount_primary: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_secondary: Option<f64>,
}

impl RewardQuote {
    pub fn for_steps(steps: u64, tier_multiplier: f64) -> Self {
        Self {
            amount_primary: compute_step_reward(steps, tier_multiplier),
            amount_secondary: None,
        }
    }

    pub fn for_bricks(score: u64, blocks_destroyed: u64) -> Self {
        Self {
            amount_primary: compute_brick_reward(score, blocks_destroyed),
            amount_secondary: None,
        }
    }

    /// Loyalty points together with their primary-credit value
    pub fn for_points(points: u64) -> Self {
        Self {
            amount_primary: secondary_to_primary(points),
            amount_secondary: Some(points as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_step_breakpoints() {
        assert_eq!(compute_step_reward(0, 1.0), 0.0);
        assert_eq!(compute_step_reward(1_000, 1.0), 10.0);
        assert_eq!(compute_step_reward(5_000, 1.0), 90.0);
        assert_eq!(compute_step_reward(10_000, 1.0), 240.0);
        assert_eq!(compute_step_reward(12_000, 1.0), 340.0);
        assert_eq!(compute_step_reward(500, 1.0), 5.0);
    }

    #[test]
    fn test_step_multiplier() {
        assert_eq!(compute_step_reward(2_000, 1.5), 1.5 * compute_step_reward(2_000, 1.0));
        assert_eq!(compute_step_reward(2_000, 1.5), 45.0);
    }

    #[test]
    fn test_step_huge_count() {
        assert!(compute_step_reward(u64::MAX, 1.0).is_finite());
    }

    #[test]
    fn test_brick_reward() {
        assert_eq!(compute_brick_reward(0, 0), 0.0);
        assert_eq!(compute_brick_reward(900, 20), 10.0);
        assert_eq!(compute_brick_reward(1_500, 40), 25.0);
        assert_eq!(compute_brick_reward(u64::MAX, 0), 500.0);
        assert_eq!(compute_brick_reward(1_000, 2_000), 500.0);
    }

    #[test]
    fn test_points_conversion() {
        let quote = RewardQuote::for_points(2_500);
        assert_eq!(quote.amount_primary, 2.5);
        assert_eq!(quote.amount_secondary, Some(2_500.0));
    }

    #[test]
    fn test_quote_serializes_without_missing_secondary() {
        let json = serde_json::to_string(&RewardQuote::for_bricks(1_200, 10)).unwrap();
        assert_eq!(json, r#"{"amount_primary":7.0}"#);
    }

    proptest! {
        #[test]
        fn prop_step_reward_monotonic(a in 0u64..200_000, b in 0u64..200_000, m in prop_oneof![Just(1.0f64), Just(1.5f64)]) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(compute_step_reward(lo, m) <= compute_step_reward(hi, m));
        }

        #[test]
        fn prop_step_reward_linear_in_multiplier(s in 0u64..1_000_000, m in 0.0f64..4.0) {
            prop_assert_eq!(compute_step_reward(s, m), m * compute_step_reward(s, 1.0));
        }

        #[test]
        fn prop_preview_matches_settlement(s in any::<u64>(), m in 0.0f64..4.0) {
            let preview = compute_step_reward(s, m);
            let settled = RewardQuote::for_steps(s, m).amount_primary;
            prop_assert_eq!(preview.to_bits(), settled.to_bits());
        }

        #[test]
        fn prop_brick_preview_matches_settlement(score in any::<u64>(), blocks in any::<u64>()) {
            let preview = compute_brick_reward(score, blocks);
            let settled = RewardQuote::for_bricks(score, blocks).amount_primary;
            prop_assert_eq!(preview.to_bits(), settled.to_bits());
        }

        #[test]
        fn prop_brick_reward_capped(score in any::<u64>(), blocks in any::<u64>()) {
            let raw = blocks as f64 * BRICK_BLOCK_RATE
                + score.saturating_sub(BRICK_SCORE_THRESHOLD) as f64 * BRICK_SCORE_RATE;
            let reward = compute_brick_reward(score, blocks);
            prop_assert!(reward <= BRICK_REWARD_CAP);
            if raw > BRICK_REWARD_CAP {
                prop_assert_eq!(reward, BRICK_REWARD_CAP);
            }
        }
    }
}
