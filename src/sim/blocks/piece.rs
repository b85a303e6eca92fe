//! Active falling piece

use serde::{Deserialize, Serialize};

use crate::sim::rng::RandomSource;
use crate::sim::tables::ShapeKind;

/// Spawn origin column
pub const SPAWN_X: i32 = 3;
/// Spawn origin row
pub const SPAWN_Y: i32 = 0;

/// A piece in play: shape, current block offsets and origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub shape: ShapeKind,
    /// (column, row) offsets from the origin
    pub blocks: [(i32, i32); 4],
    pub x: i32,
    pub y: i32,
}

impl Piece {
    pub fn spawn(shape: ShapeKind) -> Self {
        Self {
            shape,
            blocks: shape.blocks(),
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }

    pub fn random(rng: &mut dyn RandomSource) -> Self {
        Self::spawn(ShapeKind::random(rng))
    }

    pub fn color(&self) -> &'static str {
        self.shape.color()
    }

    /// Absolute (column, row) of each block
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.blocks.iter().map(|&(bx, by)| (self.x + bx, self.y + by))
    }
}

/// Quarter turn within the piece's own bounding box: (x, y) -> (maxY - y, x)
pub fn rotate_offsets(blocks: &[(i32, i32); 4]) -> [(i32, i32); 4] {
    let max_y = blocks.iter().map(|&(_, y)| y).max().unwrap_or(0);
    blocks.map(|(x, y)| (max_y - y, x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_i_piece() {
        let flat = ShapeKind::I.blocks();
        let upright = rotate_offsets(&flat);
        assert_eq!(upright, [(0, 0), (0, 1), (0, 2), (0, 3)]);
        assert_eq!(rotate_offsets(&upright), [(3, 0), (2, 0), (1, 0), (0, 0)]);
    }

    #[test]
    fn test_rotation_stays_non_negative() {
        for shape in ShapeKind::ALL {
            let mut blocks = shape.blocks();
            for _ in 0..4 {
                blocks = rotate_offsets(&blocks);
                assert!(blocks.iter().all(|&(x, y)| x >= 0 && y >= 0), "{shape:?}");
            }
        }
    }

    #[test]
    fn test_cells_follow_origin() {
        let mut piece = Piece::spawn(ShapeKind::O);
        piece.x = 7;
        piece.y = 10;
        let cells: Vec<_> = piece.cells().collect();
        assert_eq!(cells, vec![(7, 10), (8, 10), (7, 11), (8, 11)]);
    }
}
