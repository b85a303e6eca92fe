//! Result payloads the host posts to the rewards backend
//!
//! Nothing here performs I/O. The host serialises these bodies and sends
//! them; validation catches results the backend would reject anyway.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::GameEnd;
use crate::membership::{GameKind, Tier};

/// Fewest steps worth a claim
pub const MIN_STEP_CLAIM: u64 = 10;
/// Most steps accepted in one claim
pub const MAX_STEP_CLAIM: u64 = 50_000;

/// Highest score a legitimate session of `game` can reach
pub fn max_plausible_score(game: GameKind) -> u64 {
    match game {
        GameKind::Bricks => 5_000,
        GameKind::Trivia => 50,
        GameKind::FallingBlocks => 10_000,
        GameKind::Slots => 8_000,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The player's tier does not include this game
    GameLocked { game: GameKind, tier: Tier },
    ImpossibleScore { game: GameKind, score: u64, max: u64 },
    TooFewSteps { steps: u64 },
    TooManySteps { steps: u64 },
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::GameLocked { game, tier } => write!(
                f,
                "{} requires {} membership (current: {})",
                game.display_name(),
                game.required_tier().as_str(),
                tier.as_str()
            ),
            SubmitError::ImpossibleScore { game, score, max } => write!(
                f,
                "{} score {score} exceeds the maximum of {max}",
                game.display_name()
            ),
            SubmitError::TooFewSteps { steps } => {
                write!(f, "Need at least {MIN_STEP_CLAIM} steps to claim (have {steps})")
            }
            SubmitError::TooManySteps { steps } => {
                write!(f, "Cannot claim more than {MAX_STEP_CLAIM} steps at once (have {steps})")
            }
        }
    }
}

impl std::error::Error for SubmitError {}

/// Body of a game result submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_type: GameKind,
    pub score: u64,
    pub level: u32,
    #[serde(default)]
    pub blocks_destroyed: u64,
}

impl GameResult {
    /// Build the payload for a finished session. Only the brick-breaker
    /// reports blocks; trivia reports its difficulty in place of a level.
    pub fn from_end(game: GameKind, end: &GameEnd) -> Self {
        let level = match game {
            GameKind::Trivia => u32::try_from(end.secondary).unwrap_or(u32::MAX),
            _ => end.level,
        };
        let blocks_destroyed = match game {
            GameKind::Bricks => end.secondary,
            _ => 0,
        };
        Self {
            game_type: game,
            score: end.score,
            level,
            blocks_destroyed,
        }
    }

    pub fn validate(&self, tier: Tier) -> Result<(), SubmitError> {
        if !tier.unlocks(self.game_type) {
            return Err(SubmitError::GameLocked {
                game: self.game_type,
                tier,
            });
        }
        let max = max_plausible_score(self.game_type);
        if self.score > max {
            return Err(SubmitError::ImpossibleScore {
                game: self.game_type,
                score: self.score,
                max,
            });
        }
        Ok(())
    }

    /// Request path for `wallet`
    pub fn endpoint(wallet: &str) -> String {
        format!("/games/result/{wallet}")
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Body of a step reward claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepClaim {
    pub steps: u64,
}

impl StepClaim {
    pub fn validate(&self) -> Result<(), SubmitError> {
        if self.steps < MIN_STEP_CLAIM {
            Err(SubmitError::TooFewSteps { steps: self.steps })
        } else if self.steps > MAX_STEP_CLAIM {
            Err(SubmitError::TooManySteps { steps: self.steps })
        } else {
            Ok(())
        }
    }

    pub fn endpoint(wallet: &str) -> String {
        format!("/faucet/steps/{wallet}")
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
