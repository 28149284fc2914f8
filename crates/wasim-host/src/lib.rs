//! Host side of the wasim simulations: pixel surface, painters and the
//! fixed-period driver that steps an engine and renders each generation.

pub mod driver;
pub mod painter;
pub mod surface;
pub mod telemetry;

pub use driver::{Driver, RunSummary};
pub use painter::{BinaryPainter, GrayscalePainter, Painter};
pub use surface::{Rgb, Surface};
