//! 2D row-major cell buffer.

use wasim_core::{Dimensions, Error, Position, Result};

/// A 2D toroidal grid of cells, stored row-major (`index = y * width + x`)
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    dims: Dimensions,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    pub fn new_with_default(dims: Dimensions, default_value: T) -> Self {
        Self {
            dims,
            cells: vec![default_value; dims.area()],
        }
    }

    /// Wrap an existing row-major buffer; its length must match `dims`
    pub fn from_cells(dims: Dimensions, cells: Vec<T>) -> Result<Self> {
        if cells.len() != dims.area() {
            return Err(Error::InvalidCells(format!(
                "expected {} cells for a {} grid, got {}",
                dims.area(),
                dims,
                cells.len()
            )));
        }

        Ok(Self { dims, cells })
    }

    /// Get cell at (x, y), or `None` when out of range
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if self.dims.contains(x, y) {
            Some(&self.cells[self.dims.index_of(x, y)])
        } else {
            None
        }
    }

    /// Get cell at position (with toroidal wrapping)
    pub fn get_wrapped(&self, pos: Position) -> &T {
        let (x, y) = pos.wrap(self.dims);
        &self.cells[self.dims.index_of(x, y)]
    }

    /// Set cell at (x, y); out-of-range writes are ignored
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if self.dims.contains(x, y) {
            let index = self.dims.index_of(x, y);
            self.cells[index] = value;
        }
    }

    /// Set cell at position (with toroidal wrapping)
    pub fn set_wrapped(&mut self, pos: Position, value: T) {
        let (x, y) = pos.wrap(self.dims);
        let index = self.dims.index_of(x, y);
        self.cells[index] = value;
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn width(&self) -> usize {
        self.dims.width()
    }

    pub fn height(&self) -> usize {
        self.dims.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Replace the whole generation with `next`, handing the old buffer back in its place.
    ///
    /// Both buffers keep their length, so no allocation happens per generation.
    pub(crate) fn swap_cells(&mut self, next: &mut Vec<T>) {
        debug_assert_eq!(next.len(), self.cells.len());
        std::mem::swap(&mut self.cells, next);
    }

    /// Iterator over all tiles with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.dims.position_of(i), cell))
    }
}

/// Indices of `i - 1`, `i` and `i + 1` along an axis of length `len`, wrapping at both ends.
#[inline]
pub(crate) fn wrapped_window(i: usize, len: usize) -> [usize; 3] {
    [(i + len - 1) % len, i, (i + 1) % len]
}
