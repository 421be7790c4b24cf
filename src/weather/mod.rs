//! Weather series data model.
//!
//! This module holds the hourly series that flow through the pipeline: the raw
//! per-grid-point series read from the mesoscale model and the interpolated,
//! elevation-corrected series at the site of interest.
//!
//! # Overview
//!
//! - [`GridSeries`]: one grid point's hourly series
//! - [`TargetSeries`]: the site series, extended in place by each pipeline stage
//! - [`Quadrant`]: a value per corner of the enclosing grid cell (SW, SE, NW, NE)
//! - [`grid`]: grid geometry, interpolation weights and elevation lookups
//!
//! # Units
//!
//! Temperature is °C, pressure hPa, mixing ratio g/kg(DA), wind components m/s,
//! precipitation mm/h and shortwave irradiance MJ/m² per hour. Longwave flux
//! arrives in W/m² and is converted to MJ/m² exactly once by
//! [`crate::sim::derived::derive`].

pub mod grid;
pub mod nullable;

use crate::error::{ClimateError, Result};
use crate::sim::separation::SeparationResult;
use crate::sim::solar::SolarPositionRecord;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Corner of the grid cell that encloses the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    SouthWest,
    SouthEast,
    NorthWest,
    NorthEast,
}

impl Corner {
    /// All corners in the canonical SW, SE, NW, NE order.
    pub const ALL: [Corner; 4] = [
        Corner::SouthWest,
        Corner::SouthEast,
        Corner::NorthWest,
        Corner::NorthEast,
    ];

    /// Short label used in log output.
    pub fn label(self) -> &'static str {
        match self {
            Corner::SouthWest => "SW",
            Corner::SouthEast => "SE",
            Corner::NorthWest => "NW",
            Corner::NorthEast => "NE",
        }
    }
}

/// One value per corner of the enclosing grid cell.
///
/// Used for interpolation weights, reference elevations, corner coordinates
/// and the four grid series themselves.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quadrant<T> {
    #[serde(rename = "sw")]
    pub south_west: T,
    #[serde(rename = "se")]
    pub south_east: T,
    #[serde(rename = "nw")]
    pub north_west: T,
    #[serde(rename = "ne")]
    pub north_east: T,
}

impl<T> Quadrant<T> {
    /// Creates a quadrant from values in SW, SE, NW, NE order.
    pub fn new(south_west: T, south_east: T, north_west: T, north_east: T) -> Self {
        Quadrant {
            south_west,
            south_east,
            north_west,
            north_east,
        }
    }

    /// Creates a quadrant from an array ordered SW, SE, NW, NE.
    pub fn from_array(values: [T; 4]) -> Self {
        let [south_west, south_east, north_west, north_east] = values;
        Quadrant::new(south_west, south_east, north_west, north_east)
    }

    pub fn into_array(self) -> [T; 4] {
        [
            self.south_west,
            self.south_east,
            self.north_west,
            self.north_east,
        ]
    }

    pub fn get(&self, corner: Corner) -> &T {
        match corner {
            Corner::SouthWest => &self.south_west,
            Corner::SouthEast => &self.south_east,
            Corner::NorthWest => &self.north_west,
            Corner::NorthEast => &self.north_east,
        }
    }

    pub fn get_mut(&mut self, corner: Corner) -> &mut T {
        match corner {
            Corner::SouthWest => &mut self.south_west,
            Corner::SouthEast => &mut self.south_east,
            Corner::NorthWest => &mut self.north_west,
            Corner::NorthEast => &mut self.north_east,
        }
    }

    /// Iterates over `(corner, value)` pairs in SW, SE, NW, NE order.
    pub fn iter(&self) -> impl Iterator<Item = (Corner, &T)> {
        Corner::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Applies `f` to every corner value.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Quadrant<U> {
        Quadrant::from_array(self.into_array().map(f))
    }

    /// Fallible version of [`Quadrant::map`] that stops at the first error.
    pub fn try_map<U, F: FnMut(Corner, T) -> Result<U>>(self, mut f: F) -> Result<Quadrant<U>> {
        let [sw, se, nw, ne] = self.into_array();
        Ok(Quadrant::new(
            f(Corner::SouthWest, sw)?,
            f(Corner::SouthEast, se)?,
            f(Corner::NorthWest, nw)?,
            f(Corner::NorthEast, ne)?,
        ))
    }
}

impl Quadrant<f64> {
    /// Weighted sum `Σ self[k] * values[k]` taken in SW, SE, NW, NE order.
    pub fn weighted_sum(&self, values: [f64; 4]) -> f64 {
        self.south_west * values[0]
            + self.south_east * values[1]
            + self.north_west * values[2]
            + self.north_east * values[3]
    }

    pub fn sum(&self) -> f64 {
        self.south_west + self.south_east + self.north_west + self.north_east
    }
}

/// Hourly series of one mesoscale grid point.
///
/// All per-field sequences share the length and alignment of `timestamps`.
/// Either shortwave variant may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSeries {
    /// Hourly timestamps in local standard time, ascending, without gaps.
    pub timestamps: Vec<NaiveDateTime>,
    /// Air temperature (°C)
    #[serde(deserialize_with = "nullable::vec")]
    pub temperature: Vec<f64>,
    /// Surface pressure (hPa)
    #[serde(deserialize_with = "nullable::vec")]
    pub pressure: Vec<f64>,
    /// Mixing ratio (g/kg dry air)
    #[serde(deserialize_with = "nullable::vec")]
    pub mixing_ratio: Vec<f64>,
    /// East-west wind component (m/s)
    #[serde(deserialize_with = "nullable::vec")]
    pub wind_u: Vec<f64>,
    /// North-south wind component (m/s)
    #[serde(deserialize_with = "nullable::vec")]
    pub wind_v: Vec<f64>,
    /// Precipitation (mm/h)
    #[serde(deserialize_with = "nullable::vec")]
    pub precipitation: Vec<f64>,
    /// Downward longwave flux (W/m²)
    #[serde(deserialize_with = "nullable::vec")]
    pub longwave: Vec<f64>,
    /// Estimated downward shortwave irradiance (MJ/m² per hour)
    #[serde(default, deserialize_with = "nullable::option_vec")]
    pub shortwave_estimated: Option<Vec<f64>>,
    /// Model-native downward shortwave irradiance (MJ/m² per hour)
    #[serde(default, deserialize_with = "nullable::option_vec")]
    pub shortwave_model: Option<Vec<f64>>,
}

impl GridSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Checks that every present field matches the timestamp sequence.
    ///
    /// # Errors
    ///
    /// * [`ClimateError::EmptySeries`] if there are no timestamps
    /// * [`ClimateError::LengthMismatch`] naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ClimateError::EmptySeries);
        }
        let expected = self.len();
        let mut fields: Vec<(&str, usize)> = vec![
            ("temperature", self.temperature.len()),
            ("pressure", self.pressure.len()),
            ("mixing_ratio", self.mixing_ratio.len()),
            ("wind_u", self.wind_u.len()),
            ("wind_v", self.wind_v.len()),
            ("precipitation", self.precipitation.len()),
            ("longwave", self.longwave.len()),
        ];
        if let Some(sw) = &self.shortwave_estimated {
            fields.push(("shortwave_estimated", sw.len()));
        }
        if let Some(sw) = &self.shortwave_model {
            fields.push(("shortwave_model", sw.len()));
        }

        for (field, found) in fields {
            if found != expected {
                return Err(ClimateError::LengthMismatch {
                    field: field.to_string(),
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

impl Quadrant<GridSeries> {
    /// Validates every member and checks that all four share one timeline.
    pub fn validate_aligned(&self) -> Result<()> {
        for (_, series) in self.iter() {
            series.validate()?;
        }

        let reference = &self.south_west;
        for (corner, series) in self.iter().skip(1) {
            if series.len() != reference.len() {
                return Err(ClimateError::LengthMismatch {
                    field: format!("{} timestamps", corner.label()),
                    expected: reference.len(),
                    found: series.len(),
                });
            }
            if let Some(index) = reference
                .timestamps
                .iter()
                .zip(&series.timestamps)
                .position(|(a, b)| a != b)
            {
                return Err(ClimateError::TimestampMismatch { index });
            }
        }
        Ok(())
    }
}

/// Unit the longwave flux of a [`TargetSeries`] is currently expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LongwaveUnit {
    /// As delivered by the grid (W/m²)
    #[default]
    WattsPerSquareMetre,
    /// Hourly integrated (MJ/m²)
    MegajoulesPerSquareMetre,
}

/// Interpolated, elevation-corrected series at the site.
///
/// Created by [`crate::sim::interpolation::interpolate`] and extended in place
/// by the later stages. A derived field that has not been computed yet is an
/// empty vector; once computed it has one entry per timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetSeries {
    pub timestamps: Vec<NaiveDateTime>,
    /// Air temperature (°C)
    #[serde(deserialize_with = "nullable::vec")]
    pub temperature: Vec<f64>,
    /// Surface pressure (hPa)
    #[serde(deserialize_with = "nullable::vec")]
    pub pressure: Vec<f64>,
    /// Mixing ratio (g/kg dry air)
    #[serde(deserialize_with = "nullable::vec")]
    pub mixing_ratio: Vec<f64>,
    #[serde(deserialize_with = "nullable::vec")]
    pub wind_u: Vec<f64>,
    #[serde(deserialize_with = "nullable::vec")]
    pub wind_v: Vec<f64>,
    /// Precipitation (mm/h)
    #[serde(deserialize_with = "nullable::vec")]
    pub precipitation: Vec<f64>,
    /// Downward longwave flux, in [`TargetSeries::longwave_unit`]
    #[serde(deserialize_with = "nullable::vec")]
    pub longwave: Vec<f64>,
    pub longwave_unit: LongwaveUnit,
    /// Estimated shortwave irradiance (MJ/m² per hour)
    #[serde(default, deserialize_with = "nullable::option_vec")]
    pub shortwave_estimated: Option<Vec<f64>>,
    /// Model-native shortwave irradiance (MJ/m² per hour)
    #[serde(default, deserialize_with = "nullable::option_vec")]
    pub shortwave_model: Option<Vec<f64>>,

    /// Relative humidity (%)
    #[serde(deserialize_with = "nullable::vec")]
    pub relative_humidity: Vec<f64>,
    /// Water vapour partial pressure (hPa)
    #[serde(deserialize_with = "nullable::vec")]
    pub vapor_pressure: Vec<f64>,
    /// Dew point (°C), NaN outside the fitted vapour-pressure ranges
    #[serde(deserialize_with = "nullable::vec")]
    pub dew_point: Vec<f64>,
    /// Net nocturnal (longwave) radiation (MJ/m²)
    #[serde(deserialize_with = "nullable::vec")]
    pub nocturnal_radiation: Vec<f64>,

    /// Hour-averaged solar position per timestamp
    pub solar: Vec<SolarPositionRecord>,
    /// Direct/diffuse split of `shortwave_estimated`
    pub separation_estimated: Option<Vec<SeparationResult>>,
    /// Direct/diffuse split of `shortwave_model`
    pub separation_model: Option<Vec<SeparationResult>>,

    /// Wind speed projected on the 16-point direction (m/s)
    #[serde(deserialize_with = "nullable::vec")]
    pub wind_speed: Vec<f64>,
    /// Wind direction snapped to 22.5° steps (degrees, direction blown from)
    #[serde(deserialize_with = "nullable::vec")]
    pub wind_direction: Vec<f64>,
}

impl TargetSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Keeps only the timestamps whose calendar year lies in `start..=end`.
    ///
    /// Every populated field is trimmed with the same mask, so the series stays
    /// aligned whatever stage it has reached.
    pub fn retain_years(&mut self, start: i32, end: i32) {
        let keep: Vec<bool> = self
            .timestamps
            .iter()
            .map(|t| (start..=end).contains(&t.year()))
            .collect();

        fn retain<T>(values: &mut Vec<T>, keep: &[bool]) {
            if values.len() != keep.len() {
                return;
            }
            let mut flags = keep.iter();
            values.retain(|_| *flags.next().unwrap_or(&false));
        }

        retain(&mut self.timestamps, &keep);
        retain(&mut self.temperature, &keep);
        retain(&mut self.pressure, &keep);
        retain(&mut self.mixing_ratio, &keep);
        retain(&mut self.wind_u, &keep);
        retain(&mut self.wind_v, &keep);
        retain(&mut self.precipitation, &keep);
        retain(&mut self.longwave, &keep);
        if let Some(values) = self.shortwave_estimated.as_mut() {
            retain(values, &keep);
        }
        if let Some(values) = self.shortwave_model.as_mut() {
            retain(values, &keep);
        }
        retain(&mut self.relative_humidity, &keep);
        retain(&mut self.vapor_pressure, &keep);
        retain(&mut self.dew_point, &keep);
        retain(&mut self.nocturnal_radiation, &keep);
        retain(&mut self.solar, &keep);
        if let Some(values) = self.separation_estimated.as_mut() {
            retain(values, &keep);
        }
        if let Some(values) = self.separation_model.as_mut() {
            retain(values, &keep);
        }
        retain(&mut self.wind_speed, &keep);
        retain(&mut self.wind_direction, &keep);
    }
}
