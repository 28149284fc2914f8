//! Core type definitions for the simulations.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated grid dimensions.
///
/// Both sides are positive and `width * height` fits in `usize`, so a
/// `Dimensions` value always describes a buffer that can be indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Dimensions {
    width: usize,
    height: usize,
}

impl Dimensions {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }

        let (width, height) = (width as usize, height as usize);
        width.checked_mul(height).ok_or_else(|| {
            Error::ResourceExhausted(format!("{}x{} cells do not fit in memory", width, height))
        })?;

        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells in a buffer of these dimensions
    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Row-major index of an in-range coordinate
    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Coordinate of a row-major index
    #[inline]
    pub fn position_of(&self, index: usize) -> Position {
        Position::new((index % self.width) as i32, (index / self.width) as i32)
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 2D position on a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Apply toroidal wrapping for the given grid dimensions
    pub fn wrap(&self, dims: Dimensions) -> (usize, usize) {
        let w = dims.width() as i64;
        let h = dims.height() as i64;
        let x = ((self.x as i64 % w) + w) % w;
        let y = ((self.y as i64 % h) + h) % h;
        (x as usize, y as usize)
    }
}

/// The two simulations this workspace knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationKind {
    Conway,
    Worms,
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationKind::Conway => write!(f, "conway"),
            SimulationKind::Worms => write!(f, "worms"),
        }
    }
}
