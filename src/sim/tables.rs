//! Static game data: slot symbols and falling-block shapes

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;

/// One slot-machine symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSymbol {
    /// Glyph drawn on the reel
    pub label: &'static str,
    pub name: &'static str,
    pub color: &'static str,
}

/// Reel symbols, in index order
pub const SYMBOLS: [SlotSymbol; 6] = [
    SlotSymbol {
        label: "Z",
        name: "ZWAP",
        color: "#00f5ff",
    },
    SlotSymbol {
        label: "P",
        name: "zPts",
        color: "#a855f7",
    },
    SlotSymbol {
        label: "7",
        name: "Seven",
        color: "#ffd700",
    },
    SlotSymbol {
        label: "D",
        name: "Diamond",
        color: "#ec4899",
    },
    SlotSymbol {
        label: "C",
        name: "Cherry",
        color: "#22c55e",
    },
    SlotSymbol {
        label: "B",
        name: "Bar",
        color: "#f97316",
    },
];

/// The primary-credit symbol (biggest jackpot)
pub const PRIMARY_SYMBOL: usize = 0;
/// The lucky seven
pub const SEVEN_SYMBOL: usize = 2;

/// Falling-block piece shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::J,
        ShapeKind::L,
    ];

    /// Spawn-orientation block offsets as (column, row).
    /// Rotation is computed from these, there are no stored rotation states.
    pub fn blocks(self) -> [(i32, i32); 4] {
        match self {
            ShapeKind::I => [(0, 0), (1, 0), (2, 0), (3, 0)],
            ShapeKind::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
            ShapeKind::T => [(0, 0), (1, 0), (2, 0), (1, 1)],
            ShapeKind::S => [(1, 0), (2, 0), (0, 1), (1, 1)],
            ShapeKind::Z => [(0, 0), (1, 0), (1, 1), (2, 1)],
            ShapeKind::J => [(0, 0), (0, 1), (1, 1), (2, 1)],
            ShapeKind::L => [(2, 0), (0, 1), (1, 1), (2, 1)],
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ShapeKind::I => "#00f5ff",
            ShapeKind::O => "#ffd700",
            ShapeKind::T => "#a855f7",
            ShapeKind::S => "#22c55e",
            ShapeKind::Z => "#ef4444",
            ShapeKind::J => "#3b82f6",
            ShapeKind::L => "#f97316",
        }
    }

    pub fn random(rng: &mut dyn RandomSource) -> Self {
        Self::ALL[rng.pick(Self::ALL.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_shapes_have_four_distinct_blocks() {
        for shape in ShapeKind::ALL {
            let blocks: HashSet<_> = shape.blocks().into_iter().collect();
            assert_eq!(blocks.len(), 4, "{shape:?}");
            assert!(blocks.iter().all(|&(x, y)| x >= 0 && y >= 0));
        }
    }

    #[test]
    fn test_special_symbols() {
        assert_eq!(SYMBOLS[PRIMARY_SYMBOL].name, "ZWAP");
        assert_eq!(SYMBOLS[SEVEN_SYMBOL].label, "7");
    }
}
