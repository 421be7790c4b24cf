//! Run configuration.
//!
//! A run is described by a small JSON document:
//!
//! ```json
//! {
//!   "latitude": 35.658,
//!   "longitude": 139.741,
//!   "separation": "Perez",
//!   "target_elevation": 25.0,
//!   "grid_elevations": { "sw": 12.0, "se": 30.5, "nw": 8.0, "ne": 22.0 },
//!   "start_year": 2011,
//!   "end_year": 2020
//! }
//! ```
//!
//! Elevations can be given directly or as `elevation_points`, a list of
//! `{latitude, longitude, elevation}` entries matched against the grid
//! corners and the site. Weights default to inverse-distance weights of the
//! enclosing grid cell.

use crate::error::Result;
use crate::sim::separation::SeparationModel;
use crate::sim::solar::DEFAULT_STANDARD_MERIDIAN;
use crate::weather::grid::{resolve_elevation, ElevationTable, GridCell};
use crate::weather::Quadrant;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tolerance used to match `elevation_points` to grid corners (degrees).
const POINT_TOLERANCE_DEG: f64 = 1e-6;

/// One known terrain elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation above sea level (m)
    pub elevation: f64,
}

/// Parameters of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Site latitude (degrees north)
    pub latitude: f64,
    /// Site longitude (degrees east)
    pub longitude: f64,
    #[serde(default)]
    pub separation: SeparationModel,
    /// Meridian of the timestamps' standard time (degrees east)
    #[serde(default = "default_standard_meridian")]
    pub standard_meridian: f64,
    /// Site elevation (m); looked up in `elevation_points` when absent
    #[serde(default)]
    pub target_elevation: Option<f64>,
    /// Interpolation weights; derived from the grid cell when absent
    #[serde(default)]
    pub weights: Option<Quadrant<f64>>,
    /// Reference elevations of the grid points (m); looked up in
    /// `elevation_points` when absent
    #[serde(default)]
    pub grid_elevations: Option<Quadrant<f64>>,
    #[serde(default)]
    pub elevation_points: Vec<ElevationPoint>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}

fn default_standard_meridian() -> f64 {
    DEFAULT_STANDARD_MERIDIAN
}

impl RunConfig {
    /// Configuration with defaults for everything but the site.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        RunConfig {
            latitude,
            longitude,
            separation: SeparationModel::default(),
            standard_meridian: DEFAULT_STANDARD_MERIDIAN,
            target_elevation: None,
            weights: None,
            grid_elevations: None,
            elevation_points: Vec::new(),
            start_year: None,
            end_year: None,
        }
    }

    /// Parses a JSON configuration.
    ///
    /// # Errors
    /// [`crate::ClimateError::UnknownModel`] for an unknown `separation`
    /// name, [`crate::ClimateError::Json`] for any other malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(name) = value.get("separation").and_then(|v| v.as_str()) {
            name.parse::<SeparationModel>()?;
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Reads a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn grid_cell(&self) -> GridCell {
        GridCell::enclosing(self.latitude, self.longitude)
    }

    /// Configured weights, or inverse-distance weights of the grid cell.
    pub fn weights(&self) -> Quadrant<f64> {
        self.weights
            .unwrap_or_else(|| self.grid_cell().weights(self.latitude, self.longitude))
    }

    fn elevation_table(&self) -> ElevationTable {
        self.elevation_points
            .iter()
            .fold(ElevationTable::new(POINT_TOLERANCE_DEG), |table, p| {
                table.with_point(p.latitude, p.longitude, p.elevation)
            })
    }

    /// Reference elevations of the four grid points.
    ///
    /// # Errors
    /// [`crate::ClimateError::MissingElevation`] if neither `grid_elevations`
    /// nor `elevation_points` covers a corner.
    pub fn grid_elevations(&self) -> Result<Quadrant<f64>> {
        match self.grid_elevations {
            Some(elevations) => Ok(elevations),
            None => self.grid_cell().corner_elevations(&self.elevation_table()),
        }
    }

    /// Elevation of the site.
    ///
    /// # Errors
    /// [`crate::ClimateError::MissingElevation`] if neither
    /// `target_elevation` nor `elevation_points` gives it.
    pub fn target_elevation(&self) -> Result<f64> {
        match self.target_elevation {
            Some(elevation) => Ok(elevation),
            None => resolve_elevation(&self.elevation_table(), self.latitude, self.longitude),
        }
    }

    /// Inclusive year window for the output, if any bound is set.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        match (self.start_year, self.end_year) {
            (None, None) => None,
            (start, end) => Some((start.unwrap_or(i32::MIN), end.unwrap_or(i32::MAX))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClimateError;

    #[test]
    fn test_minimal_config_defaults() {
        let config = RunConfig::from_json(r#"{"latitude": 35.658, "longitude": 139.741}"#).unwrap();
        assert_eq!(config.separation, SeparationModel::Perez);
        assert_eq!(config.standard_meridian, 135.0);
        assert!(config.year_range().is_none());
        assert!((config.weights().sum() - 1.0).abs() < 1e-12);
        assert_eq!(config, RunConfig::new(35.658, 139.741));
    }

    #[test]
    fn test_full_config() {
        let json = r#"{
            "latitude": 35.658,
            "longitude": 139.741,
            "separation": "Erbs",
            "standard_meridian": 120.0,
            "target_elevation": 25.0,
            "weights": {"sw": 0.4, "se": 0.3, "nw": 0.2, "ne": 0.1},
            "grid_elevations": {"sw": 12.0, "se": 30.5, "nw": 8.0, "ne": 22.0},
            "start_year": 2011,
            "end_year": 2020
        }"#;
        let config = RunConfig::from_json(json).unwrap();
        assert_eq!(config.separation, SeparationModel::Erbs);
        assert_eq!(config.weights().into_array(), [0.4, 0.3, 0.2, 0.1]);
        assert_eq!(config.grid_elevations().unwrap().north_west, 8.0);
        assert_eq!(config.target_elevation().unwrap(), 25.0);
        assert_eq!(config.year_range(), Some((2011, 2020)));
    }

    #[test]
    fn test_unknown_model_rejected() {
        let result = RunConfig::from_json(r#"{"latitude": 35.0, "longitude": 139.0, "separation": "Liu"}"#);
        match result {
            Err(ClimateError::UnknownModel(name)) => assert_eq!(name, "Liu"),
            other => panic!("expected UnknownModel, got {:?}", other),
        }

        // a non-string selector is malformed JSON input, not a model name
        let result = RunConfig::from_json(r#"{"latitude": 35.0, "longitude": 139.0, "separation": 3}"#);
        assert!(matches!(result, Err(ClimateError::Json(_))));
    }

    #[test]
    fn test_elevations_from_points() {
        let mut config = RunConfig::new(35.658, 139.741);
        let corners = config.grid_cell().corners();
        for (i, (_, &(lat, lon))) in corners.iter().enumerate() {
            config.elevation_points.push(ElevationPoint {
                latitude: lat,
                longitude: lon,
                elevation: 10.0 * (i + 1) as f64,
            });
        }
        config.elevation_points.push(ElevationPoint {
            latitude: 35.658,
            longitude: 139.741,
            elevation: 17.0,
        });

        assert_eq!(config.grid_elevations().unwrap().into_array(), [10.0, 20.0, 30.0, 40.0]);
        assert_eq!(config.target_elevation().unwrap(), 17.0);
    }

    #[test]
    fn test_missing_elevations_are_errors() {
        let config = RunConfig::new(35.658, 139.741);
        assert!(matches!(
            config.target_elevation(),
            Err(ClimateError::MissingElevation { .. })
        ));
        assert!(matches!(
            config.grid_elevations(),
            Err(ClimateError::MissingElevation { .. })
        ));
    }

    #[test]
    fn test_open_year_range() {
        let mut config = RunConfig::new(35.0, 139.0);
        config.start_year = Some(2015);
        assert_eq!(config.year_range(), Some((2015, i32::MAX)));
    }
}
