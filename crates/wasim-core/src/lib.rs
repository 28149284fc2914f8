//! Core types and utilities shared by the wasim cellular simulations and their host.

pub mod types;
pub mod config;
pub mod error;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
