//! Binary Game of Life (B3/S23) on a toroidal grid.

use crate::grid::{wrapped_window, Grid};
use crate::patterns::Pattern;
use crate::steppable::SteppableGrid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};
use wasim_core::{ConwayConfig, Dimensions, Error, Result};

pub const DEAD: u8 = 0;
pub const ALIVE: u8 = 1;

/// Conway's Game of Life.
///
/// Cells are `0` (dead) or `1` (alive). Neighbors are the 8 surrounding cells,
/// wrapping around every edge, so the grid behaves like a torus.
#[derive(Debug, Clone)]
pub struct ConwayGrid {
    grid: Grid<u8>,
    scratch: Vec<u8>,
    generation: u64,
}

impl ConwayGrid {
    /// Fraction of cells alive in a randomly seeded grid
    pub const DEFAULT_DENSITY: f64 = 0.3;

    /// Random population seeded from system entropy
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let mut rng = ChaCha8Rng::from_entropy();
        Self::random(width, height, Self::DEFAULT_DENSITY, &mut rng)
    }

    /// Random population from a fixed seed
    pub fn with_seed(width: i32, height: i32, seed: u64) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::random(width, height, Self::DEFAULT_DENSITY, &mut rng)
    }

    pub fn from_config(config: &ConwayConfig) -> Result<Self> {
        if let Some(name) = &config.pattern {
            let pattern = Pattern::by_name(name)
                .ok_or_else(|| Error::Config(format!("unknown pattern: {}", name)))?;
            return Self::with_pattern(config.width, config.height, pattern);
        }

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::random(config.width, config.height, config.density, &mut rng)
    }

    /// Each cell alive with probability `density`
    pub fn random<R: Rng>(width: i32, height: i32, density: f64, rng: &mut R) -> Result<Self> {
        if !(0.0..=1.0).contains(&density) {
            return Err(Error::Config(format!(
                "density must be within [0, 1], got {}",
                density
            )));
        }

        let dims = Dimensions::new(width, height)?;
        let cells = (0..dims.area())
            .map(|_| if rng.gen::<f64>() < density { ALIVE } else { DEAD })
            .collect();

        Ok(Self::from_grid(Grid::from_cells(dims, cells)?))
    }

    /// All cells dead
    pub fn empty(width: i32, height: i32) -> Result<Self> {
        let dims = Dimensions::new(width, height)?;
        Ok(Self::from_grid(Grid::new_with_default(dims, DEAD)))
    }

    /// A dead grid with `pattern` stamped at its center
    pub fn with_pattern(width: i32, height: i32, pattern: Pattern) -> Result<Self> {
        let dims = Dimensions::new(width, height)?;
        let mut grid = Grid::new_with_default(dims, DEAD);
        pattern.stamp_centered(&mut grid);
        debug!(pattern = pattern.name, "Stamped seed pattern");
        Ok(Self::from_grid(grid))
    }

    /// Start from an explicit row-major generation; any non-zero value counts as alive
    pub fn from_cells(width: i32, height: i32, cells: Vec<u8>) -> Result<Self> {
        let dims = Dimensions::new(width, height)?;
        let cells = cells
            .into_iter()
            .map(|c| if c != DEAD { ALIVE } else { DEAD })
            .collect();
        Ok(Self::from_grid(Grid::from_cells(dims, cells)?))
    }

    fn from_grid(grid: Grid<u8>) -> Self {
        debug!(
            width = grid.width(),
            height = grid.height(),
            "Conway grid initialized"
        );
        let scratch = vec![DEAD; grid.cells().len()];
        Self {
            grid,
            scratch,
            generation: 0,
        }
    }

    pub fn grid(&self) -> &Grid<u8> {
        &self.grid
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.grid.get(x, y).copied() == Some(ALIVE)
    }

    pub fn live_count(&self) -> usize {
        self.grid.cells().iter().filter(|&&c| c == ALIVE).count()
    }

    /// Count alive cells in the Moore neighborhood of (x, y)
    fn count_neighbors(&self, x: usize, y: usize) -> u8 {
        let (w, h) = (self.grid.width(), self.grid.height());
        let cells = self.grid.cells();
        let mut count = 0;

        for ny in wrapped_window(y, h) {
            for nx in wrapped_window(x, w) {
                count += cells[ny * w + nx];
            }
        }

        // The window includes the cell itself
        count - cells[y * w + x]
    }
}

impl SteppableGrid for ConwayGrid {
    type Cell = u8;

    fn tick(&mut self) {
        let w = self.grid.width();
        let mut next = std::mem::take(&mut self.scratch);

        for y in 0..self.grid.height() {
            for x in 0..w {
                let index = y * w + x;
                let current = self.grid.cells()[index];
                let live_neighbors = self.count_neighbors(x, y);

                next[index] = match (current, live_neighbors) {
                    (ALIVE, 2) | (ALIVE, 3) => ALIVE, // Survive
                    (DEAD, 3) => ALIVE,               // Birth
                    _ => DEAD,                        // Death
                };
            }
        }

        self.grid.swap_cells(&mut next);
        self.scratch = next;
        self.generation += 1;
        trace!(generation = self.generation, "Conway tick");
    }

    fn cells(&self) -> &[u8] {
        self.grid.cells()
    }

    fn dimensions(&self) -> Dimensions {
        self.grid.dimensions()
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    /// Fraction of cells alive
    fn activity(&self) -> f64 {
        self.live_count() as f64 / self.grid.cells().len() as f64
    }
}
