//! Solar position calculator for hourly weather series.
//!
//! Computes the extraterrestrial normal irradiance and the position of the sun
//! for each timestamp of a site series. Positions are not instantaneous: each
//! record is the mean over the hour that ends at the timestamp, sampled every
//! six minutes, which matches how hourly irradiance totals are accumulated.
//!
//! The astronomy is a low-order orbital approximation (perihelion passage,
//! mean and true anomaly, equation of time) good to a fraction of a degree,
//! which is well below the resolution of the separation models.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use siteclimate::sim::solar::SolarPositionCalculator;
//!
//! // Tokyo, summer solstice, the hour ending at noon
//! let noon = NaiveDate::from_ymd_opt(2020, 6, 21)
//!     .and_then(|d| d.and_hms_opt(12, 0, 0))
//!     .unwrap();
//! let record = SolarPositionCalculator::new(35.68, 139.77).position(&noon);
//!
//! println!("h = {:.1}°, A = {:.1}°", record.elevation, record.azimuth);
//! ```

use chrono::{Datelike, NaiveDateTime, Timelike};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Solar constant (MJ/m²h)
pub const SOLAR_CONSTANT: f64 = 4.921;

/// Declination at the winter solstice (degrees).
const WINTER_SOLSTICE_DECLINATION: f64 = -23.4393;

/// Reference year of the perihelion-passage approximation.
const EPOCH_YEAR: i32 = 1968;

/// Default meridian of local standard time (degrees east, JST).
pub const DEFAULT_STANDARD_MERIDIAN: f64 = 135.0;

/// Offsets (hours before the timestamp) at which the hour is sampled.
const HOUR_SAMPLES: [f64; 10] = [1.0, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1];

/// Hour-averaged position of the sun for one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarPositionRecord {
    /// Extraterrestrial normal irradiance IN0 (MJ/m²h)
    pub extraterrestrial: f64,
    /// Mean solar elevation over the hour (degrees, negative below the horizon)
    pub elevation: f64,
    /// Sine of the mean elevation
    pub sin_elevation: f64,
    /// Mean solar azimuth over the hour (degrees from north, clockwise)
    pub azimuth: f64,
}

impl SolarPositionRecord {
    /// Returns true if the mean sun position is above the horizon.
    pub fn is_above_horizon(&self) -> bool {
        self.sin_elevation > 0.0
    }
}

/// Per-day quantities shared by every sample of the day.
#[derive(Debug, Clone, Copy)]
struct DailyGeometry {
    sin_declination: f64,
    cos_declination: f64,
    /// Equation of time (degrees of hour angle)
    equation_of_time: f64,
    extraterrestrial: f64,
}

impl DailyGeometry {
    fn for_day(year: i32, day_of_year: u32) -> Self {
        let n = f64::from(year - EPOCH_YEAR);
        let nday = f64::from(day_of_year);

        // Perihelion passage day
        let d0 = 3.71 + 0.2596 * n - ((n + 3.0) / 4.0).floor();
        // Mean anomaly
        let m = 360.0 * (nday - d0) / 365.2596;
        // Angle between perihelion and winter solstice
        let eps = 12.3901 + 0.0172 * (n + m / 360.0);
        // True anomaly
        let v = m + 1.914 * m.to_radians().sin() + 0.02 * (2.0 * m).to_radians().sin();
        let veps = (v + eps).to_radians();

        let equation_of_time = (m - v)
            - (0.043 * (2.0 * veps).sin() / (1.0 - 0.043 * (2.0 * veps).cos()))
                .atan()
                .to_degrees();

        let sin_declination = veps.cos() * WINTER_SOLSTICE_DECLINATION.to_radians().sin();
        let cos_declination = (1.0 - sin_declination.powi(2)).abs().sqrt();

        DailyGeometry {
            sin_declination,
            cos_declination,
            equation_of_time,
            extraterrestrial: SOLAR_CONSTANT * (1.0 + 0.033 * v.to_radians().cos()),
        }
    }
}

/// Solar position calculator for one site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPositionCalculator {
    /// Site latitude (degrees north)
    pub latitude: f64,
    /// Site longitude (degrees east)
    pub longitude: f64,
    /// Meridian the timestamps' standard time refers to (degrees east)
    pub standard_meridian: f64,
}

impl SolarPositionCalculator {
    /// Creates a calculator for timestamps in Japan Standard Time.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        SolarPositionCalculator {
            latitude,
            longitude,
            standard_meridian: DEFAULT_STANDARD_MERIDIAN,
        }
    }

    pub fn with_standard_meridian(mut self, standard_meridian: f64) -> Self {
        self.standard_meridian = standard_meridian;
        self
    }

    /// Hour-averaged solar position for the hour ending at `timestamp`.
    ///
    /// Only the hour of the timestamp is used; minutes and seconds are ignored.
    ///
    /// # Arguments
    /// * `timestamp` - Local standard time at the end of the hour
    ///
    /// # Returns
    /// `SolarPositionRecord` with IN0, mean elevation, its sine and mean azimuth
    pub fn position(&self, timestamp: &NaiveDateTime) -> SolarPositionRecord {
        let day = DailyGeometry::for_day(timestamp.year(), timestamp.ordinal());
        let hour = f64::from(timestamp.hour());
        let lat = self.latitude.to_radians();

        let mut elevation_sum = 0.0;
        let mut azimuth_sum = 0.0;
        for offset in HOUR_SAMPLES {
            let clock = hour - offset;
            let hour_angle = (15.0 * (clock - 12.0)
                + (self.longitude - self.standard_meridian)
                + day.equation_of_time)
                .to_radians();

            let sin_h = lat.sin() * day.sin_declination
                + lat.cos() * day.cos_declination * hour_angle.cos();
            let cos_h = (1.0 - sin_h.powi(2)).sqrt();
            let sin_a = day.cos_declination * hour_angle.sin() / cos_h;
            let cos_a = (sin_h * lat.sin() - day.sin_declination) / (cos_h * lat.cos());

            elevation_sum += sin_h.asin().to_degrees();
            azimuth_sum += (sin_a.atan2(cos_a) + PI).to_degrees();
        }

        let samples = HOUR_SAMPLES.len() as f64;
        let elevation = elevation_sum / samples;
        SolarPositionRecord {
            extraterrestrial: day.extraterrestrial,
            elevation,
            sin_elevation: elevation.to_radians().sin(),
            azimuth: azimuth_sum / samples,
        }
    }

    /// One record per timestamp, in the same order.
    pub fn compute(&self, timestamps: &[NaiveDateTime]) -> Vec<SolarPositionRecord> {
        timestamps.par_iter().map(|t| self.position(t)).collect()
    }
}

/// Solar positions for a site whose timestamps are in Japan Standard Time.
pub fn compute(latitude: f64, longitude: f64, timestamps: &[NaiveDateTime]) -> Vec<SolarPositionRecord> {
    SolarPositionCalculator::new(latitude, longitude).compute(timestamps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const TOKYO: (f64, f64) = (35.68, 139.77);

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    fn tokyo() -> SolarPositionCalculator {
        SolarPositionCalculator::new(TOKYO.0, TOKYO.1)
    }

    #[test]
    fn test_summer_solstice_noon_tokyo() {
        let r = tokyo().position(&at(2020, 6, 21, 12));
        assert!((r.elevation - 76.80).abs() < 0.01, "elevation {}", r.elevation);
        assert!((r.azimuth - 164.52).abs() < 0.01, "azimuth {}", r.azimuth);
        assert!((r.extraterrestrial - 4.7629).abs() < 1e-3);
        assert!(r.is_above_horizon());
    }

    #[test]
    fn test_winter_solstice_noon_tokyo() {
        let r = tokyo().position(&at(2020, 12, 21, 12));
        assert!((r.elevation - 30.67).abs() < 0.01, "elevation {}", r.elevation);
        assert!((r.azimuth - 176.81).abs() < 0.01, "azimuth {}", r.azimuth);
    }

    #[test]
    fn test_night_is_below_horizon() {
        let r = tokyo().position(&at(2020, 6, 21, 1));
        assert!(r.elevation < -29.0, "elevation {}", r.elevation);
        assert!(r.sin_elevation < 0.0);
        assert!(!r.is_above_horizon());
    }

    #[test]
    fn test_sine_taken_from_mean_elevation() {
        let r = tokyo().position(&at(2021, 3, 20, 12));
        assert_eq!(r.sin_elevation, r.elevation.to_radians().sin());
    }

    #[test]
    fn test_extraterrestrial_peaks_near_perihelion() {
        let january = tokyo().position(&at(2020, 1, 3, 12)).extraterrestrial;
        let july = tokyo().position(&at(2020, 7, 4, 12)).extraterrestrial;
        assert!(january > july);
        assert!((january - SOLAR_CONSTANT * 1.033).abs() < 0.01);
        assert!((july - SOLAR_CONSTANT * 0.967).abs() < 0.01);
    }

    #[test]
    fn test_minutes_are_ignored() {
        let calc = tokyo();
        let on_hour = calc.position(&at(2020, 6, 21, 12));
        let past_hour = calc.position(&(at(2020, 6, 21, 12) + chrono::Duration::minutes(30)));
        assert_eq!(on_hour, past_hour);
    }

    #[test]
    fn test_standard_meridian_shifts_hour_angle() {
        // A site on its own standard meridian sees the same sun as Tokyo one
        // hour later when the meridian moves 15° west.
        let jst = SolarPositionCalculator::new(35.0, 135.0);
        let shifted = SolarPositionCalculator::new(35.0, 135.0).with_standard_meridian(150.0);
        let a = jst.position(&at(2020, 4, 1, 11));
        let b = shifted.position(&at(2020, 4, 1, 12));
        assert!((a.elevation - b.elevation).abs() < 1e-9);
        assert!((a.azimuth - b.azimuth).abs() < 1e-9);
    }

    #[test]
    fn test_compute_preserves_order() {
        let timestamps: Vec<NaiveDateTime> = (0..48)
            .map(|h| at(2020, 6, 20, 0) + chrono::Duration::hours(h))
            .collect();
        let records = compute(TOKYO.0, TOKYO.1, &timestamps);
        assert_eq!(records.len(), timestamps.len());
        for (t, r) in timestamps.iter().zip(&records) {
            assert_eq!(*r, tokyo().position(t));
        }
    }
}
