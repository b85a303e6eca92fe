//! Falling-block session state

use rand_pcg::Pcg32;

use super::grid::Grid;
use super::piece::Piece;
use crate::sim::rng::{RandomSource, RngState};
use crate::sim::tables::ShapeKind;

/// Points for clearing 0..=4 rows in one lock, before the level multiplier
pub const LINE_SCORES: [u64; 5] = [0, 100, 300, 500, 800];
/// Points per row travelled by a hard drop
pub const HARD_DROP_POINTS: u64 = 2;

/// Gravity at level 0 and its floor
const BASE_DROP_MS: i64 = 500;
const DROP_STEP_MS: i64 = 40;
const MIN_DROP_MS: i64 = 80;

/// Milliseconds between gravity steps at `level`
pub fn drop_interval_ms(level: u32) -> f32 {
    (BASE_DROP_MS - i64::from(level) * DROP_STEP_MS).max(MIN_DROP_MS) as f32
}

/// Score for clearing `rows` rows at once
pub fn line_score(rows: u32, level: u32) -> u64 {
    let idx = (rows as usize).min(LINE_SCORES.len() - 1);
    LINE_SCORES[idx] * u64::from(level)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPhase {
    Playing,
    /// A piece locked above the top or a new piece had no room
    ToppedOut,
}

/// Complete falling-block session. `R` supplies shape picks.
#[derive(Debug, Clone)]
pub struct BlockState<R = Pcg32> {
    pub level: u32,
    pub score: u64,
    pub lines: u64,
    pub grid: Grid,
    pub piece: Piece,
    /// Shape spawned after the current piece locks
    pub next: ShapeKind,
    pub phase: BlockPhase,
    /// Time accumulated towards the next gravity step
    pub drop_timer_ms: f32,
    pub locks: u64,
    pub(super) rng: R,
}

impl BlockState<Pcg32> {
    pub fn new(level: u32, seed: u64) -> Self {
        Self::with_rng(level, RngState::new(seed).to_rng())
    }
}

impl<R: RandomSource> BlockState<R> {
    pub fn with_rng(level: u32, mut rng: R) -> Self {
        let piece = Piece::random(&mut rng);
        let next = ShapeKind::random(&mut rng);
        Self {
            level,
            score: 0,
            lines: 0,
            grid: Grid::new(),
            piece,
            next,
            phase: BlockPhase::Playing,
            drop_timer_ms: 0.0,
            locks: 0,
            rng,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == BlockPhase::Playing
    }

    pub fn drop_interval_ms(&self) -> f32 {
        drop_interval_ms(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_interval() {
        assert_eq!(drop_interval_ms(0), 500.0);
        assert_eq!(drop_interval_ms(1), 460.0);
        assert_eq!(drop_interval_ms(10), 100.0);
        assert_eq!(drop_interval_ms(11), 80.0);
        assert_eq!(drop_interval_ms(u32::MAX), 80.0);
    }

    #[test]
    fn test_line_score_table() {
        assert_eq!(line_score(0, 5), 0);
        assert_eq!(line_score(1, 1), 100);
        assert_eq!(line_score(2, 3), 900);
        assert_eq!(line_score(4, 2), 1600);
        assert_eq!(line_score(6, 1), 800);
    }

    #[test]
    fn test_seeded_sessions_match() {
        let a = BlockState::new(1, 9);
        let b = BlockState::new(1, 9);
        assert_eq!(a.piece, b.piece);
        assert_eq!(a.next, b.next);
        assert!(a.is_running());
    }
}
