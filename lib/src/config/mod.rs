//! Paving configuration.
//!
//! [`PaverConfig`] holds the bit dimensions and the knobs of the fitting
//! loop. Geometric tolerances are not part of it; they live in
//! [`crate::geometry::tolerance`] so every component compares points the
//! same way.

use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Parameters of the border paver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaverConfig {
    /// Full bit length (mm). Also the straight-line length of each section.
    pub bit_length: CoordF,

    /// Bit width (mm).
    pub bit_width: CoordF,

    /// Material kept between an open section and the bit edge (mm).
    pub margin_to_keep: CoordF,

    /// Number of evenly spaced points added to a section before reduction.
    pub resample_points: usize,

    /// Reduction passes allowed before a section is declared unshrinkable.
    pub max_reduction_iterations: usize,

    /// Upper bound on bits placed along one loop.
    pub max_bits_per_loop: usize,

    /// Diameter of the vacuum pickup (mm).
    pub sucker_diameter: CoordF,

    /// Grid step of the lift-point fallback search (mm).
    pub lift_grid_step: CoordF,
}

impl PaverConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the bit length.
    pub fn with_bit_length(mut self, length: CoordF) -> Self {
        self.bit_length = length;
        self
    }

    /// Builder method: set the bit width.
    pub fn with_bit_width(mut self, width: CoordF) -> Self {
        self.bit_width = width;
        self
    }

    /// Builder method: set the margin to keep.
    pub fn with_margin_to_keep(mut self, margin: CoordF) -> Self {
        self.margin_to_keep = margin;
        self
    }

    pub fn with_resample_points(mut self, count: usize) -> Self {
        self.resample_points = count;
        self
    }

    pub fn with_max_reduction_iterations(mut self, iterations: usize) -> Self {
        self.max_reduction_iterations = iterations;
        self
    }

    pub fn with_max_bits_per_loop(mut self, bits: usize) -> Self {
        self.max_bits_per_loop = bits;
        self
    }

    pub fn with_sucker_diameter(mut self, diameter: CoordF) -> Self {
        self.sucker_diameter = diameter;
        self
    }

    pub fn with_lift_grid_step(mut self, step: CoordF) -> Self {
        self.lift_grid_step = step;
        self
    }

    /// Clearance radius required around a lift point.
    #[inline]
    pub fn lift_min_radius(&self) -> CoordF {
        self.sucker_diameter / 2.0
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("bit_length", self.bit_length),
            ("bit_width", self.bit_width),
            ("sucker_diameter", self.sucker_diameter),
            ("lift_grid_step", self.lift_grid_step),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.margin_to_keep.is_finite() && self.margin_to_keep >= 0.0) {
            return Err(Error::Config(format!(
                "margin_to_keep must be non-negative, got {}",
                self.margin_to_keep
            )));
        }
        if self.margin_to_keep >= self.bit_width {
            return Err(Error::Config(format!(
                "margin_to_keep {} leaves no room in a bit of width {}",
                self.margin_to_keep, self.bit_width
            )));
        }
        if self.max_reduction_iterations == 0 || self.max_bits_per_loop == 0 {
            return Err(Error::Config(
                "iteration and bit limits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON. Missing fields take
    /// their default value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

impl Default for PaverConfig {
    fn default() -> Self {
        Self {
            bit_length: 120.0,
            bit_width: 24.0,
            margin_to_keep: 3.0,
            resample_points: 200,
            max_reduction_iterations: 1000,
            max_bits_per_loop: 50,
            sucker_diameter: 10.0,
            lift_grid_step: 1.0,
        }
    }
}

impl fmt::Display for PaverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PaverConfig(bit={:.3}x{:.3}mm, margin={:.3}mm, max_bits={})",
            self.bit_length, self.bit_width, self.margin_to_keep, self.max_bits_per_loop
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paver_config_default() {
        let config = PaverConfig::new();
        assert_eq!(config.bit_length, 120.0);
        assert_eq!(config.bit_width, 24.0);
        assert_eq!(config.resample_points, 200);
        assert_eq!(config.lift_min_radius(), 5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_paver_config_builder() {
        let config = PaverConfig::new()
            .with_bit_length(60.0)
            .with_bit_width(12.0)
            .with_margin_to_keep(1.0)
            .with_max_bits_per_loop(5);
        assert_eq!(config.bit_length, 60.0);
        assert_eq!(config.bit_width, 12.0);
        assert_eq!(config.margin_to_keep, 1.0);
        assert_eq!(config.max_bits_per_loop, 5);
    }

    #[test]
    fn test_paver_config_invalid() {
        assert!(matches!(
            PaverConfig::new().with_bit_width(0.0).validate(),
            Err(Error::Config(_))
        ));
        assert!(PaverConfig::new().with_margin_to_keep(30.0).validate().is_err());
        assert!(PaverConfig::new().with_lift_grid_step(f64::NAN).validate().is_err());
        assert!(PaverConfig::new().with_max_bits_per_loop(0).validate().is_err());
    }

    #[test]
    fn test_paver_config_from_json() {
        let config = PaverConfig::from_json_str(r#"{"bit_length": 80.0, "margin_to_keep": 2.0}"#).unwrap();
        assert_eq!(config.bit_length, 80.0);
        assert_eq!(config.margin_to_keep, 2.0);
        assert_eq!(config.bit_width, 24.0);

        assert!(matches!(PaverConfig::from_json_str("{"), Err(Error::Json(_))));
        assert!(matches!(
            PaverConfig::from_json_str(r#"{"bit_width": -1.0}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_paver_config_load_missing_file() {
        assert!(matches!(
            PaverConfig::load("/nonexistent/paver.json"),
            Err(Error::Io(_))
        ));
    }
}
