//! Configuration types for the simulations and their host.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Binary (Conway) simulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConwayConfig {
    /// Width of the grid in cells
    pub width: i32,
    /// Height of the grid in cells
    pub height: i32,
    /// Probability that a cell starts alive (0.0 to 1.0)
    pub density: f64,
    /// Random seed for reproducibility; entropy when absent
    pub seed: Option<u64>,
    /// Named pattern stamped at the center of an otherwise dead grid.
    /// Takes precedence over random seeding.
    pub pattern: Option<String>,
}

impl Default for ConwayConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 60,
            density: 0.3,
            seed: None,
            pattern: None,
        }
    }
}

/// Continuous (worms) simulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WormsConfig {
    /// Width of the grid in cells
    pub width: i32,
    /// Height of the grid in cells
    pub height: i32,
    /// Random seed for reproducibility; entropy when absent
    pub seed: Option<u64>,
}

impl Default for WormsConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 240,
            seed: None,
        }
    }
}

/// How cell values become pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Side of the square drawn for one cell, in pixels
    pub cell_size: u32,
    /// Exponent applied to intensities before quantizing (1.0 = linear)
    pub gamma: f32,
    /// Intensities at or below this value are not drawn
    pub cutoff: f32,
}

impl RenderConfig {
    pub fn conway() -> Self {
        Self {
            cell_size: 2,
            gamma: 1.0,
            cutoff: 0.0,
        }
    }

    pub fn worms() -> Self {
        Self {
            cell_size: 1,
            gamma: 0.8,
            cutoff: 0.005,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::conway()
    }
}

/// Pacing of one render loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Period between frames (milliseconds)
    pub period_ms: u64,
    /// Emit a performance summary every this many frames (0 disables it)
    pub perf_log_every: u64,
}

impl DriverConfig {
    pub fn conway() -> Self {
        Self {
            period_ms: 100,
            perf_log_every: 60,
        }
    }

    pub fn worms() -> Self {
        Self {
            period_ms: 8,
            perf_log_every: 60,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::conway()
    }
}

/// Everything the host needs for the conway loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConwayHostConfig {
    pub grid: ConwayConfig,
    pub render: RenderConfig,
    pub driver: DriverConfig,
}

impl Default for ConwayHostConfig {
    fn default() -> Self {
        Self {
            grid: ConwayConfig::default(),
            render: RenderConfig::conway(),
            driver: DriverConfig::conway(),
        }
    }
}

/// Everything the host needs for the worms loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WormsHostConfig {
    pub grid: WormsConfig,
    pub render: RenderConfig,
    pub driver: DriverConfig,
}

impl Default for WormsHostConfig {
    fn default() -> Self {
        Self {
            grid: WormsConfig::default(),
            render: RenderConfig::worms(),
            driver: DriverConfig::worms(),
        }
    }
}

/// Host configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub conway: ConwayHostConfig,
    pub worms: WormsHostConfig,
}

impl HostConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading host configuration");
        let text = std::fs::read_to_string(path)?;
        let config: HostConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the renderer or the seeding logic cannot use
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.conway.grid.density) {
            return Err(Error::Config(format!(
                "conway.grid.density must be within [0, 1], got {}",
                self.conway.grid.density
            )));
        }

        for (name, render) in [("conway", &self.conway.render), ("worms", &self.worms.render)] {
            if render.cell_size == 0 {
                return Err(Error::Config(format!("{}.render.cell_size must be positive", name)));
            }
            if !render.gamma.is_finite() || render.gamma <= 0.0 {
                return Err(Error::Config(format!(
                    "{}.render.gamma must be a positive number, got {}",
                    name, render.gamma
                )));
            }
            // A cutoff of 1 or more suppresses every cell
            if !(0.0..1.0).contains(&render.cutoff) {
                return Err(Error::Config(format!(
                    "{}.render.cutoff must be within [0, 1), got {}",
                    name, render.cutoff
                )));
            }
        }

        for (name, driver) in [("conway", &self.conway.driver), ("worms", &self.worms.driver)] {
            if driver.period_ms == 0 {
                return Err(Error::Config(format!("{}.driver.period_ms must be positive", name)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let config = HostConfig::default();
        assert_eq!(config.conway.grid.width, 300);
        assert_eq!(config.conway.grid.height, 60);
        assert_eq!(config.conway.driver.period_ms, 100);
        assert_eq!(config.conway.render.cell_size, 2);

        assert_eq!(config.worms.grid.width, 1200);
        assert_eq!(config.worms.grid.height, 240);
        assert_eq!(config.worms.driver.period_ms, 8);
        assert_eq!(config.worms.render.cell_size, 1);
        assert_eq!(config.worms.render.gamma, 0.8);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let json = r#"{ "worms": { "grid": { "width": 64, "seed": 7 } } }"#;
        let config: HostConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.worms.grid.width, 64);
        assert_eq!(config.worms.grid.height, 240);
        assert_eq!(config.worms.grid.seed, Some(7));
        assert_eq!(config.worms.driver.period_ms, 8);
        assert_eq!(config.conway.grid.density, 0.3);
    }

    #[test]
    fn test_config_serialization() {
        let config = HostConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: HostConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.conway.grid.density, deserialized.conway.grid.density);
        assert_eq!(config.worms.render.cutoff, deserialized.worms.render.cutoff);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = HostConfig::default();
        config.conway.grid.density = 1.5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = HostConfig::default();
        config.worms.render.gamma = 0.0;
        assert!(config.validate().is_err());

        let mut config = HostConfig::default();
        config.worms.driver.period_ms = 0;
        assert!(config.validate().is_err());

        for cutoff in [1.0, 2.5, -0.1, f32::NAN, f32::INFINITY] {
            let mut config = HostConfig::default();
            config.worms.render.cutoff = cutoff;
            assert!(matches!(config.validate(), Err(Error::Config(_))), "cutoff {}", cutoff);
        }

        let mut config = HostConfig::default();
        config.conway.render.cutoff = 0.0;
        config.worms.render.cutoff = 0.999;
        assert!(config.validate().is_ok());
    }
}
