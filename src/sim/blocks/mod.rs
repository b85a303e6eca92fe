//! Falling blocks: a 10x20 well, seven shapes and line clears

pub mod grid;
pub mod input;
pub mod piece;
pub mod state;
pub mod tick;

pub use grid::{COLS, Grid, ROWS};
pub use input::{BlockInput, Command, TouchGesture, command_for_key};
pub use piece::Piece;
pub use state::{BlockPhase, BlockState, drop_interval_ms};
pub use tick::tick;

use crate::engine::{GameEnd, Simulation};
use crate::render::{BACKGROUND, HUD_TEXT, Surface};
use crate::sim::rng::RandomSource;

/// Cell size in surface units
pub const CELL: f32 = 14.0;
pub const SURFACE_WIDTH: f32 = COLS as f32 * CELL;
pub const SURFACE_HEIGHT: f32 = ROWS as f32 * CELL;

const GRID_LINE: &str = "#1a1b3e";

impl<R: RandomSource> Simulation for BlockState<R> {
    type Input = BlockInput;

    fn step(&mut self, input: &BlockInput, dt_ms: f32) -> Option<GameEnd> {
        tick(self, input, dt_ms)
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(BACKGROUND);

        for row in 0..ROWS {
            for col in 0..COLS {
                let (x, y) = (col as f32 * CELL, row as f32 * CELL);
                match self.grid.cell(col, row) {
                    Some(shape) => surface.fill_rect(x, y, CELL - 1.0, CELL - 1.0, shape.color()),
                    None => surface.stroke_rect(x, y, CELL, CELL, GRID_LINE),
                }
            }
        }

        for (col, row) in self.piece.cells().filter(|&(_, row)| row >= 0) {
            surface.fill_rect(
                col as f32 * CELL,
                row as f32 * CELL,
                CELL - 1.0,
                CELL - 1.0,
                self.piece.color(),
            );
        }

        let (_, height) = surface.size();
        surface.fill_text(
            &format!("Score: {} Lines: {} Lvl: {}", self.score, self.lines, self.level),
            4.0,
            height - 4.0,
            HUD_TEXT,
        );
    }

    fn is_over(&self) -> bool {
        !self.is_running()
    }
}
