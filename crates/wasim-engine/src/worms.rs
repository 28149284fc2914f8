//! Continuous "worms" field.
//!
//! Every generation convolves the field with a fixed 3x3 kernel (wrapping at
//! the edges) and feeds the sum through an inverse-gaussian activation. The
//! alternating positive corners and negative edges make bands of activity
//! chase each other, which shows up as drifting worm-like strands.

use crate::grid::{wrapped_window, Grid};
use crate::steppable::SteppableGrid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};
use wasim_core::{Dimensions, Error, Result, WormsConfig};

/// Convolution weights, row-major, centered on the cell being updated
pub const KERNEL: [[f32; 3]; 3] = [
    [0.68, -0.90, 0.68],
    [-0.90, -0.66, -0.90],
    [0.68, -0.90, 0.68],
];

/// `1 - 2^(-0.6 x²)`: zero at the origin, approaching one as |x| grows.
///
/// Maps every finite input into `[0, 1)`.
#[inline]
pub fn activation(x: f32) -> f32 {
    1.0 - 2.0f32.powf(-0.6 * x * x)
}

/// Advance a row-major field by one generation, writing into `output`.
///
/// Both slices must hold `width * height` values.
pub fn worms_step(input: &[f32], output: &mut [f32], width: usize, height: usize) -> Result<()> {
    let expected = width
        .checked_mul(height)
        .filter(|&area| area > 0)
        .ok_or_else(|| Error::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        })?;

    if input.len() != expected || output.len() != expected {
        return Err(Error::InvalidCells(format!(
            "expected {} values for a {}x{} field, got input {} and output {}",
            expected,
            width,
            height,
            input.len(),
            output.len()
        )));
    }

    convolve(input, output, width, height);
    Ok(())
}

fn convolve(input: &[f32], output: &mut [f32], width: usize, height: usize) {
    for y in 0..height {
        let rows = wrapped_window(y, height);
        for x in 0..width {
            let cols = wrapped_window(x, width);

            let mut s = 0.0f32;
            for (ky, &ny) in rows.iter().enumerate() {
                let row = &input[ny * width..(ny + 1) * width];
                for (kx, &nx) in cols.iter().enumerate() {
                    s += KERNEL[ky][kx] * row[nx];
                }
            }

            let value = activation(s);
            // NaN only reaches here from a NaN input
            output[y * width + x] = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        }
    }
}

/// The worms simulation. Cells hold intensities in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct WormsGrid {
    grid: Grid<f32>,
    scratch: Vec<f32>,
    generation: u64,
}

impl WormsGrid {
    /// Uniform noise seeded from system entropy
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let mut rng = ChaCha8Rng::from_entropy();
        Self::random(width, height, &mut rng)
    }

    /// Uniform noise from a fixed seed
    pub fn with_seed(width: i32, height: i32, seed: u64) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::random(width, height, &mut rng)
    }

    pub fn from_config(config: &WormsConfig) -> Result<Self> {
        match config.seed {
            Some(seed) => Self::with_seed(config.width, config.height, seed),
            None => Self::new(config.width, config.height),
        }
    }

    /// Each cell drawn uniformly from `[0, 1)`
    pub fn random<R: Rng>(width: i32, height: i32, rng: &mut R) -> Result<Self> {
        let dims = Dimensions::new(width, height)?;
        let cells = (0..dims.area()).map(|_| rng.gen::<f32>()).collect();
        Ok(Self::from_grid(Grid::from_cells(dims, cells)?))
    }

    /// Every cell set to `value`, clamped into `[0, 1]`
    pub fn uniform(width: i32, height: i32, value: f32) -> Result<Self> {
        let dims = Dimensions::new(width, height)?;
        let value = checked_intensity(value)?;
        Ok(Self::from_grid(Grid::new_with_default(dims, value)))
    }

    /// Start from an explicit row-major field. Values are clamped into `[0, 1]`;
    /// NaN and infinities are rejected.
    pub fn from_cells(width: i32, height: i32, cells: Vec<f32>) -> Result<Self> {
        let dims = Dimensions::new(width, height)?;
        let cells = cells
            .into_iter()
            .map(checked_intensity)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_grid(Grid::from_cells(dims, cells)?))
    }

    fn from_grid(grid: Grid<f32>) -> Self {
        debug!(
            width = grid.width(),
            height = grid.height(),
            "Worms grid initialized"
        );
        let scratch = vec![0.0; grid.cells().len()];
        Self {
            grid,
            scratch,
            generation: 0,
        }
    }

    pub fn grid(&self) -> &Grid<f32> {
        &self.grid
    }

    /// Mean intensity over the whole field
    pub fn mean_activity(&self) -> f32 {
        let cells = self.grid.cells();
        let total: f64 = cells.iter().map(|&v| v as f64).sum();
        (total / cells.len() as f64) as f32
    }
}

fn checked_intensity(value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value.clamp(0.0, 1.0))
    } else {
        Err(Error::InvalidCells(format!("non-finite intensity: {}", value)))
    }
}

impl SteppableGrid for WormsGrid {
    type Cell = f32;

    fn tick(&mut self) {
        let (w, h) = (self.grid.width(), self.grid.height());
        let mut next = std::mem::take(&mut self.scratch);

        convolve(self.grid.cells(), &mut next, w, h);

        self.grid.swap_cells(&mut next);
        self.scratch = next;
        self.generation += 1;
        trace!(generation = self.generation, "Worms tick");
    }

    fn cells(&self) -> &[f32] {
        self.grid.cells()
    }

    fn dimensions(&self) -> Dimensions {
        self.grid.dimensions()
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn activity(&self) -> f64 {
        self.mean_activity() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
    }

    #[test]
    fn test_activation_shape() {
        assert_eq!(activation(0.0), 0.0);
        assert_close(activation(1.0), activation(-1.0));
        assert!(activation(0.5) < activation(1.0));
        assert!(activation(100.0) <= 1.0);
        assert_eq!(activation(f32::INFINITY), 1.0);
    }

    #[test]
    fn test_construction_domain() {
        let worms = WormsGrid::new(64, 16).unwrap();
        assert_eq!(worms.cells().len(), 64 * 16);
        assert!(worms.cells().iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(worms.generation(), 0);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            WormsGrid::new(0, 0),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(WormsGrid::uniform(-4, 4, 0.5).is_err());
    }

    #[test]
    fn test_from_cells_clamps_and_rejects_non_finite() {
        let worms = WormsGrid::from_cells(2, 1, vec![-0.5, 3.0]).unwrap();
        assert_eq!(worms.cells(), &[0.0, 1.0]);

        assert!(WormsGrid::from_cells(2, 1, vec![0.1, f32::NAN]).is_err());
        assert!(WormsGrid::from_cells(2, 1, vec![f32::INFINITY, 0.1]).is_err());
        assert!(WormsGrid::from_cells(2, 2, vec![0.1; 3]).is_err());
    }

    #[test]
    fn test_uniform_stays_uniform() {
        for value in [0.0f32, 0.25, 0.5, 0.37, 1.0] {
            let mut worms = WormsGrid::uniform(13, 7, value).unwrap();
            worms.tick();

            let first = worms.cells()[0];
            assert!(
                worms.cells().iter().all(|&v| v == first),
                "uniform {} did not stay uniform",
                value
            );

            let kernel_sum: f32 = KERNEL.iter().flatten().sum();
            assert_close(first, activation(kernel_sum * value));
        }
    }

    #[test]
    fn test_zero_field_is_fixed_point() {
        let mut worms = WormsGrid::uniform(8, 8, 0.0).unwrap();
        worms.advance(10);
        assert!(worms.cells().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_impulse_response_is_symmetric() {
        let mut cells = vec![0.0f32; 25];
        cells[2 * 5 + 2] = 1.0;
        let mut worms = WormsGrid::from_cells(5, 5, cells).unwrap();
        worms.tick();

        let at = |x: usize, y: usize| *worms.grid().get(x, y).unwrap();

        assert_close(at(2, 2), activation(-0.66));
        for (x, y) in [(1, 1), (3, 1), (1, 3), (3, 3)] {
            assert_close(at(x, y), activation(0.68));
        }
        for (x, y) in [(2, 1), (1, 2), (3, 2), (2, 3)] {
            assert_close(at(x, y), activation(-0.90));
        }
        assert_eq!(at(0, 0), 0.0);
        assert_eq!(at(4, 2), 0.0);
    }

    #[test]
    fn test_impulse_wraps_across_edges() {
        let mut cells = vec![0.0f32; 16];
        cells[0] = 1.0;
        let mut worms = WormsGrid::from_cells(4, 4, cells).unwrap();
        worms.tick();

        let at = |x: usize, y: usize| *worms.grid().get(x, y).unwrap();
        assert_close(at(3, 3), activation(0.68));
        assert_close(at(3, 0), activation(-0.90));
        assert_close(at(0, 3), activation(-0.90));
        assert_eq!(at(2, 2), 0.0);
    }

    #[test]
    fn test_worms_step_matches_tick() {
        let mut worms = WormsGrid::with_seed(9, 5, 11).unwrap();
        let mut output = vec![0.0f32; 45];
        worms_step(worms.cells(), &mut output, 9, 5).unwrap();

        worms.tick();
        assert_eq!(worms.cells(), output.as_slice());
    }

    #[test]
    fn test_worms_step_rejects_mismatched_buffers() {
        let input = vec![0.5f32; 12];
        let mut output = vec![0.0f32; 11];
        assert!(matches!(
            worms_step(&input, &mut output, 4, 3),
            Err(Error::InvalidCells(_))
        ));

        let mut output = vec![0.0f32; 12];
        assert!(worms_step(&input, &mut output, 0, 3).is_err());
    }

    #[test]
    fn test_cells_idempotent() {
        let mut worms = WormsGrid::with_seed(20, 10, 5).unwrap();
        worms.tick();
        let first = worms.cells().to_vec();
        let second = worms.cells().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_config() {
        let config = WormsConfig {
            width: 32,
            height: 8,
            seed: Some(99),
        };
        let a = WormsGrid::from_config(&config).unwrap();
        let b = WormsGrid::with_seed(32, 8, 99).unwrap();
        assert_eq!(a.cells(), b.cells());
    }

    #[test]
    fn test_mean_activity() {
        let worms = WormsGrid::uniform(4, 4, 0.25).unwrap();
        assert_close(worms.mean_activity(), 0.25);
        assert!((worms.activity() - 0.25).abs() < 1e-6);

        let worms = WormsGrid::from_cells(2, 1, vec![0.0, 1.0]).unwrap();
        assert!((worms.activity() - 0.5).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_values_stay_bounded(seed in any::<u64>(), w in 1i32..32, h in 1i32..32, ticks in 0u64..20) {
            let mut worms = WormsGrid::with_seed(w, h, seed).unwrap();
            for _ in 0..ticks {
                worms.tick();
                prop_assert!(worms.cells().iter().all(|&v| v.is_finite() && (0.0..=1.0).contains(&v)));
            }
            prop_assert_eq!(worms.cells().len(), (w * h) as usize);
        }

        #[test]
        fn prop_arbitrary_field_stays_bounded(cells in proptest::collection::vec(0.0f32..=1.0, 48)) {
            let mut worms = WormsGrid::from_cells(8, 6, cells).unwrap();
            worms.advance(5);
            prop_assert!(worms.cells().iter().all(|&v| (0.0..=1.0).contains(&v)));
        }

        #[test]
        fn prop_same_seed_same_history(seed in any::<u64>(), ticks in 0u64..10) {
            let mut a = WormsGrid::with_seed(16, 9, seed).unwrap();
            let mut b = WormsGrid::with_seed(16, 9, seed).unwrap();
            a.advance(ticks);
            b.advance(ticks);
            prop_assert_eq!(a.cells(), b.cells());
        }
    }
}
