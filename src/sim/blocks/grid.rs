//! Locked-cell grid for the falling-block game

use serde::{Deserialize, Serialize};

use crate::sim::tables::ShapeKind;

pub const COLS: usize = 10;
pub const ROWS: usize = 20;

type Row = [Option<ShapeKind>; COLS];

/// ROWS x COLS cells, row 0 at the top. A cell holds the shape that
/// locked there (which determines its colour).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<Row>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Self {
            rows: vec![[None; COLS]; ROWS],
        }
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<ShapeKind> {
        self.rows.get(row).and_then(|r| r.get(col).copied().flatten())
    }

    /// Write a cell. Out-of-range coordinates are ignored.
    pub fn set(&mut self, col: usize, row: usize, shape: Option<ShapeKind>) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = shape;
        }
    }

    /// Whether a block may sit at (col, row). Rows above the top are open
    /// as long as the column is in range.
    pub fn is_open(&self, col: i32, row: i32) -> bool {
        if col < 0 || col >= COLS as i32 || row >= ROWS as i32 {
            return false;
        }
        row < 0 || self.rows[row as usize][col as usize].is_none()
    }

    /// Whether every offset fits with the piece origin at (x, y)
    pub fn fits(&self, blocks: &[(i32, i32)], x: i32, y: i32) -> bool {
        blocks.iter().all(|&(bx, by)| self.is_open(x + bx, y + by))
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.rows.get(row).is_some_and(|r| r.iter().all(Option::is_some))
    }

    /// Remove every full row, scanning bottom to top. Rows above shift
    /// down and empty rows enter at the top. Returns the number removed.
    pub fn clear_full_rows(&mut self) -> u32 {
        let mut cleared = 0;
        let mut row = ROWS;
        while row > 0 {
            let r = row - 1;
            if self.is_row_full(r) {
                self.rows.remove(r);
                self.rows.insert(0, [None; COLS]);
                cleared += 1;
                // Same index now holds the row that was above it
            } else {
                row -= 1;
            }
        }
        cleared
    }

    /// Number of occupied cells
    pub fn occupied(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Iterate (col, row, shape) over occupied cells
    pub fn iter_occupied(&self) -> impl Iterator<Item = (usize, usize, ShapeKind)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.map(|shape| (col, row, shape)))
        })
    }
}
