//! The contract a host uses to drive any of the simulations.

use wasim_core::Dimensions;

/// A grid that advances one generation at a time and exposes the settled result.
///
/// `cells()` borrows the current generation, so a host cannot hold on to it
/// across a `tick()` without copying.
pub trait SteppableGrid {
    /// Value stored per cell
    type Cell: Copy;

    /// Advance exactly one generation
    fn tick(&mut self);

    /// Current generation, row-major, `width * height` long
    fn cells(&self) -> &[Self::Cell];

    fn dimensions(&self) -> Dimensions;

    /// Number of ticks applied since construction
    fn generation(&self) -> u64;

    /// How much of the grid is active, in [0, 1]
    fn activity(&self) -> f64;

    fn width(&self) -> usize {
        self.dimensions().width()
    }

    fn height(&self) -> usize {
        self.dimensions().height()
    }

    /// Advance `n` generations
    fn advance(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }
}
