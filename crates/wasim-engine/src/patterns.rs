//! Well-known Life patterns used to seed a binary grid.

use crate::grid::Grid;
use wasim_core::Position;

/// A set of live cells given as `(x, y)` offsets from the pattern's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(i32, i32)],
}

pub const GLIDER: Pattern = Pattern {
    name: "glider",
    cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
};

pub const BLINKER: Pattern = Pattern {
    name: "blinker",
    cells: &[(0, 0), (1, 0), (2, 0)],
};

pub const TOAD: Pattern = Pattern {
    name: "toad",
    cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
};

pub const BEACON: Pattern = Pattern {
    name: "beacon",
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
};

pub const R_PENTOMINO: Pattern = Pattern {
    name: "r-pentomino",
    cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
};

#[rustfmt::skip]
pub const GOSPER_GLIDER_GUN: Pattern = Pattern {
    name: "gosper-glider-gun",
    cells: &[
        (0, 4), (0, 5), (1, 4), (1, 5),
        (10, 4), (10, 5), (10, 6), (11, 3), (11, 7), (12, 2), (12, 8),
        (13, 2), (13, 8), (14, 5), (15, 3), (15, 7), (16, 4), (16, 5),
        (16, 6), (17, 5), (20, 2), (20, 3), (20, 4), (21, 2), (21, 3),
        (21, 4), (22, 1), (22, 5), (24, 0), (24, 1), (24, 5), (24, 6),
        (34, 2), (34, 3), (35, 2), (35, 3),
    ],
};

pub const PATTERNS: &[Pattern] = &[GLIDER, BLINKER, TOAD, BEACON, R_PENTOMINO, GOSPER_GLIDER_GUN];

impl Pattern {
    /// Look a pattern up by name, ignoring case
    pub fn by_name(name: &str) -> Option<Pattern> {
        PATTERNS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .copied()
    }

    /// Width and height of the pattern's bounding box
    pub fn extent(&self) -> (i32, i32) {
        let w = self.cells.iter().map(|&(x, _)| x + 1).max().unwrap_or(0);
        let h = self.cells.iter().map(|&(_, y)| y + 1).max().unwrap_or(0);
        (w, h)
    }

    /// Set the pattern's cells alive with its top-left corner at `origin`.
    /// Cells past an edge wrap around to the opposite side.
    pub fn stamp(&self, grid: &mut Grid<u8>, origin: Position) {
        for &(dx, dy) in self.cells {
            grid.set_wrapped(origin.add(dx, dy), 1);
        }
    }

    /// Stamp the pattern centered on the grid
    pub fn stamp_centered(&self, grid: &mut Grid<u8>) {
        let (w, h) = self.extent();
        let origin = Position::new(
            (grid.width() as i32 - w) / 2,
            (grid.height() as i32 - h) / 2,
        );
        self.stamp(grid, origin);
    }
}
