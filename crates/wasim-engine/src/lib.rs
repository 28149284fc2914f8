//! Simulation engines.
//!
//! This module implements the two cellular simulations: a binary Game of Life
//! and a continuous "worms" field. Both live on a toroidal grid and are stepped
//! by the host one generation at a time through [`SteppableGrid`].

pub mod grid;
pub mod steppable;
pub mod conway;
pub mod worms;
pub mod patterns;

pub use grid::Grid;
pub use steppable::SteppableGrid;
pub use conway::ConwayGrid;
pub use worms::{worms_step, WormsGrid};
pub use patterns::Pattern;
