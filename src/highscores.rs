//! Local high score tables
//!
//! Persisted to LocalStorage, top 10 per game.

use serde::{Deserialize, Serialize};

use crate::engine::GameEnd;
use crate::membership::GameKind;

/// Maximum number of entries kept per game
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub game: GameKind,
    pub score: u64,
    /// Level the session was played at
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High scores for every game, each list sorted descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "zwap_arcade_highscores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Entries for one game, best first
    pub fn for_game(&self, game: GameKind) -> impl Iterator<Item = &HighScoreEntry> + '_ {
        self.entries.iter().filter(move |e| e.game == game)
    }

    /// Check if a score would make the game's table
    pub fn qualifies(&self, game: GameKind, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        let table: Vec<_> = self.for_game(game).collect();
        if table.len() < MAX_HIGH_SCORES {
            return true;
        }
        table.last().is_none_or(|e| score > e.score)
    }

    /// Add a score. Returns the rank achieved (1-indexed) or None if it
    /// didn't qualify.
    pub fn add_score(&mut self, game: GameKind, score: u64, level: u32, timestamp: f64) -> Option<usize> {
        if !self.qualifies(game, score) {
            return None;
        }

        let rank = self.for_game(game).take_while(|e| e.score >= score).count() + 1;

        // Insert after the last entry of this game that stays ahead
        let pos = self
            .entries
            .iter()
            .position(|e| e.game == game && score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            pos,
            HighScoreEntry {
                game,
                score,
                level,
                timestamp,
            },
        );

        // Trim this game's table to size
        let mut kept = 0;
        self.entries.retain(|e| {
            if e.game != game {
                return true;
            }
            kept += 1;
            kept <= MAX_HIGH_SCORES
        });

        Some(rank)
    }

    /// Record a finished session
    pub fn record(&mut self, game: GameKind, end: &GameEnd, timestamp: f64) -> Option<usize> {
        let rank = self.add_score(game, end.score, end.level, timestamp);
        if let Some(rank) = rank {
            log::info!("New {} high score #{rank}: {}", game.display_name(), end.score);
        }
        rank
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self, game: GameKind) -> Option<u64> {
        self.for_game(game).next().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
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
    fn test_ranks_per_game() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(GameKind::Bricks, 300, 1, 0.0), Some(1));
        assert_eq!(scores.add_score(GameKind::Bricks, 500, 1, 1.0), Some(1));
        assert_eq!(scores.add_score(GameKind::Bricks, 400, 2, 2.0), Some(2));
        // Other games keep separate tables
        assert_eq!(scores.add_score(GameKind::Slots, 100, 1, 3.0), Some(1));

        let bricks: Vec<u64> = scores.for_game(GameKind::Bricks).map(|e| e.score).collect();
        assert_eq!(bricks, vec![500, 400, 300]);
        assert_eq!(scores.top_score(GameKind::Slots), Some(100));
        assert_eq!(scores.top_score(GameKind::FallingBlocks), None);
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert!(!scores.qualifies(GameKind::Bricks, 0));
        assert_eq!(scores.add_score(GameKind::Bricks, 0, 1, 0.0), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_table_capped() {
        let mut scores = HighScores::new();
        for i in 1..=12u64 {
            scores.add_score(GameKind::FallingBlocks, i * 100, 1, i as f64);
        }
        scores.add_score(GameKind::Slots, 50, 1, 0.0);

        assert_eq!(scores.for_game(GameKind::FallingBlocks).count(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(GameKind::FallingBlocks, 300));
        assert!(scores.qualifies(GameKind::FallingBlocks, 301));
        assert_eq!(scores.top_score(GameKind::FallingBlocks), Some(1_200));
        assert_eq!(scores.top_score(GameKind::Slots), Some(50));
    }

    #[test]
    fn test_record_session() {
        let mut scores = HighScores::new();
        let end = GameEnd {
            score: 740,
            secondary: 50,
            level: 3,
            cleared: true,
        };
        assert_eq!(scores.record(GameKind::Bricks, &end, 10.0), Some(1));
        assert_eq!(scores.entries[0].level, 3);
    }
}
