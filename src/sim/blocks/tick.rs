//! Falling-block tick: queued commands first, then gravity

use super::input::{BlockInput, Command};
use super::piece::{Piece, rotate_offsets};
use super::state::{BlockPhase, BlockState, HARD_DROP_POINTS, line_score};
use crate::engine::GameEnd;
use crate::sim::rng::RandomSource;
use crate::sim::tables::ShapeKind;

/// Column shifts tried when a rotation does not fit in place
const KICKS: [i32; 3] = [0, -1, 1];

/// Advance the session by `dt_ms`
pub fn tick<R: RandomSource>(state: &mut BlockState<R>, input: &BlockInput, dt_ms: f32) -> Option<GameEnd> {
    if !state.is_running() {
        return None;
    }

    for &command in &input.commands {
        if let Some(end) = state.apply(command) {
            return Some(end);
        }
    }

    state.drop_timer_ms += dt_ms.max(0.0);
    if state.drop_timer_ms > state.drop_interval_ms() {
        state.drop_timer_ms = 0.0;
        if !state.try_move(0, 1) {
            return state.lock();
        }
    }
    None
}

impl<R: RandomSource> BlockState<R> {
    /// Apply one command
    pub fn apply(&mut self, command: Command) -> Option<GameEnd> {
        if !self.is_running() {
            return None;
        }
        match command {
            Command::MoveLeft => {
                self.try_move(-1, 0);
            }
            Command::MoveRight => {
                self.try_move(1, 0);
            }
            Command::SoftDrop => {
                self.try_move(0, 1);
            }
            Command::Rotate => {
                self.rotate();
            }
            Command::HardDrop => return self.hard_drop(),
        }
        None
    }

    /// Shift the piece if the target is open
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        let fits = self
            .grid
            .fits(&self.piece.blocks, self.piece.x + dx, self.piece.y + dy);
        if fits {
            self.piece.x += dx;
            self.piece.y += dy;
        }
        fits
    }

    /// Rotate in place, else kicked one column left, else one right
    pub fn rotate(&mut self) -> bool {
        let rotated = rotate_offsets(&self.piece.blocks);
        for dx in KICKS {
            if self.grid.fits(&rotated, self.piece.x + dx, self.piece.y) {
                self.piece.blocks = rotated;
                self.piece.x += dx;
                return true;
            }
        }
        false
    }

    fn hard_drop(&mut self) -> Option<GameEnd> {
        while self.try_move(0, 1) {
            self.score += HARD_DROP_POINTS;
        }
        self.lock()
    }

    /// Write the piece into the grid, clear rows and spawn the next piece
    fn lock(&mut self) -> Option<GameEnd> {
        let shape = self.piece.shape;
        let mut above_top = false;
        for (col, row) in self.piece.cells() {
            if row < 0 {
                above_top = true;
            } else {
                self.grid.set(col as usize, row as usize, Some(shape));
            }
        }
        self.locks += 1;
        if above_top {
            return Some(self.top_out());
        }

        let cleared = self.grid.clear_full_rows();
        if cleared > 0 {
            self.lines += u64::from(cleared);
            self.score += line_score(cleared, self.level);
            log::debug!("Cleared {cleared} rows, {} total", self.lines);
        }

        self.piece = Piece::spawn(self.next);
        self.next = ShapeKind::random(&mut self.rng);
        if !self.grid.fits(&self.piece.blocks, self.piece.x, self.piece.y) {
            return Some(self.top_out());
        }
        None
    }

    fn top_out(&mut self) -> GameEnd {
        self.phase = BlockPhase::ToppedOut;
        GameEnd {
            score: self.score,
            secondary: self.lines,
            level: self.level,
            cleared: false,
        }
    }
}
