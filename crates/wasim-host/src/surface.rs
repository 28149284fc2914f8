//! RGBA pixel surface the painters draw into.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use wasim_core::{Error, Result};

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub fn gray(level: u8) -> Self {
        Rgb(level, level, level)
    }
}

/// A `width x height` RGBA8 buffer, row-major, fully transparent when cleared
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }

        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                Error::ResourceExhausted(format!("{}x{} surface does not fit in memory", width, height))
            })?;

        Ok(Self {
            width,
            height,
            pixels: vec![0; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// RGBA value at (x, y), or `None` when out of range
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Fill a rectangle with an opaque color; the part outside the surface is dropped
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        let Rgb(r, g, b) = color;

        for py in y.min(y_end)..y_end {
            let row = py as usize * self.width as usize;
            for px in x.min(x_end)..x_end {
                let i = (row + px as usize) * 4;
                self.pixels[i..i + 4].copy_from_slice(&[r, g, b, 255]);
            }
        }
    }

    /// Write the surface as a binary PPM (P6), compositing over `background`
    pub fn write_ppm(&self, path: impl AsRef<Path>, background: Rgb) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;

        let Rgb(br, bg, bb) = background;
        for px in self.pixels.chunks_exact(4) {
            let a = px[3] as u32;
            let blend = |c: u8, back: u8| ((c as u32 * a + back as u32 * (255 - a)) / 255) as u8;
            out.write_all(&[blend(px[0], br), blend(px[1], bg), blend(px[2], bb)])?;
        }

        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_creation() {
        let surface = Surface::new(4, 3).unwrap();
        assert_eq!(surface.pixels().len(), 48);
        assert!(surface.pixels().iter().all(|&b| b == 0));
        assert!(Surface::new(0, 3).is_err());
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.fill_rect(3, 3, 2, 2, Rgb(10, 20, 30));

        assert_eq!(surface.pixel(3, 3), Some([10, 20, 30, 255]));
        assert_eq!(surface.pixel(2, 3), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(4, 4), None);

        surface.clear();
        assert_eq!(surface.pixel(3, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_write_ppm() {
        let mut surface = Surface::new(2, 1).unwrap();
        surface.fill_rect(0, 0, 1, 1, Rgb::BLACK);

        let path = std::env::temp_dir().join(format!("wasim-surface-{}.ppm", std::process::id()));
        surface.write_ppm(&path, Rgb::WHITE).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let header = b"P6\n2 1\n255\n";
        assert_eq!(&bytes[..header.len()], header);
        // Painted pixel stays black, the transparent one shows the background
        assert_eq!(&bytes[header.len()..], &[0, 0, 0, 255, 255, 255]);
    }
}
