//! Mapping cell buffers to pixels.

use crate::surface::{Rgb, Surface};
use wasim_core::{Dimensions, RenderConfig};

/// Draws one generation of cells onto a surface
pub trait Painter {
    type Cell: Copy;

    /// Pixel size of a surface showing a grid of `dims`
    fn surface_size(&self, dims: Dimensions) -> (u32, u32);

    /// Clear `surface` and draw `cells` (row-major, `dims.area()` long) onto it
    fn paint(&self, cells: &[Self::Cell], dims: Dimensions, surface: &mut Surface);
}

fn scaled_size(dims: Dimensions, cell_size: u32) -> (u32, u32) {
    (
        (dims.width() as u32).saturating_mul(cell_size),
        (dims.height() as u32).saturating_mul(cell_size),
    )
}

/// Live cells become filled squares, dead cells are left transparent
#[derive(Debug, Clone)]
pub struct BinaryPainter {
    pub cell_size: u32,
    pub color: Rgb,
}

impl BinaryPainter {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            cell_size: config.cell_size,
            color: Rgb::BLACK,
        }
    }
}

impl Painter for BinaryPainter {
    type Cell = u8;

    fn surface_size(&self, dims: Dimensions) -> (u32, u32) {
        scaled_size(dims, self.cell_size)
    }

    fn paint(&self, cells: &[u8], dims: Dimensions, surface: &mut Surface) {
        surface.clear();
        let size = self.cell_size;

        for (row, line) in cells.chunks_exact(dims.width()).enumerate() {
            for (col, &cell) in line.iter().enumerate() {
                if cell == 1 {
                    surface.fill_rect(col as u32 * size, row as u32 * size, size, size, self.color);
                }
            }
        }
    }
}

/// Intensities become gray levels after a gamma curve; faint cells are skipped
#[derive(Debug, Clone)]
pub struct GrayscalePainter {
    pub cell_size: u32,
    pub gamma: f32,
    pub cutoff: f32,
}

impl GrayscalePainter {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            cell_size: config.cell_size,
            gamma: config.gamma,
            cutoff: config.cutoff,
        }
    }

    /// Gray level for an intensity, or `None` when it falls at or below the cutoff
    pub fn gray_level(&self, value: f32) -> Option<u8> {
        let intensity = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        if intensity <= self.cutoff {
            return None;
        }
        let enhanced = intensity.powf(self.gamma);
        Some((enhanced * 255.0).floor() as u8)
    }
}

impl Painter for GrayscalePainter {
    type Cell = f32;

    fn surface_size(&self, dims: Dimensions) -> (u32, u32) {
        scaled_size(dims, self.cell_size)
    }

    fn paint(&self, cells: &[f32], dims: Dimensions, surface: &mut Surface) {
        surface.clear();
        let size = self.cell_size;

        for (row, line) in cells.chunks_exact(dims.width()).enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if let Some(level) = self.gray_level(value) {
                    surface.fill_rect(col as u32 * size, row as u32 * size, size, size, Rgb::gray(level));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dims(width: i32, height: i32) -> Dimensions {
        Dimensions::new(width, height).unwrap()
    }

    #[test]
    fn test_binary_paints_live_cells() {
        let painter = BinaryPainter::new(&RenderConfig::conway());
        let d = dims(3, 2);
        let (w, h) = painter.surface_size(d);
        assert_eq!((w, h), (6, 4));

        let mut surface = Surface::new(w, h).unwrap();
        painter.paint(&[0, 1, 0, 0, 0, 1], d, &mut surface);

        // Cell (1, 0) covers pixels x 2..4, y 0..2
        assert_eq!(surface.pixel(2, 0), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(3, 1), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
        // Cell (2, 1) covers pixels x 4..6, y 2..4
        assert_eq!(surface.pixel(5, 3), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(1, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_repaint_clears_previous_frame() {
        let painter = BinaryPainter::new(&RenderConfig::conway());
        let d = dims(2, 1);
        let mut surface = Surface::new(4, 2).unwrap();

        painter.paint(&[1, 0], d, &mut surface);
        painter.paint(&[0, 0], d, &mut surface);
        assert!(surface.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_gray_level_cutoff_and_gamma() {
        let painter = GrayscalePainter::new(&RenderConfig::worms());

        assert_eq!(painter.gray_level(0.0), None);
        assert_eq!(painter.gray_level(0.005), None);
        assert_eq!(painter.gray_level(1.0), Some(255));
        assert_eq!(painter.gray_level(2.0), Some(255));
        assert_eq!(painter.gray_level(-1.0), None);

        // 0.5^0.8 = 0.574..., brighter than a linear mapping
        let mid = painter.gray_level(0.5).unwrap();
        assert_eq!(mid, (0.5f32.powf(0.8) * 255.0).floor() as u8);
        assert!(mid > 127);
    }

    #[test]
    fn test_grayscale_paint() {
        let painter = GrayscalePainter::new(&RenderConfig::worms());
        let d = dims(2, 1);
        let mut surface = Surface::new(2, 1).unwrap();
        painter.paint(&[0.001, 1.0], d, &mut surface);

        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(1, 0), Some([255, 255, 255, 255]));
    }

    proptest! {
        #[test]
        fn prop_gray_level_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let painter = GrayscalePainter::new(&RenderConfig::worms());
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo_level = painter.gray_level(lo).map(|l| l as i32).unwrap_or(-1);
            let hi_level = painter.gray_level(hi).map(|l| l as i32).unwrap_or(-1);
            prop_assert!(lo_level <= hi_level);
        }
    }
}
