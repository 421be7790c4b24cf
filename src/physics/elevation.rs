//! Correction of grid-point values to the site elevation.
//!
//! Temperature follows a standard lapse rate, pressure the hypsometric
//! relation evaluated with the corrected temperature. The mixing ratio is kept
//! unless it would exceed saturation at the corrected state, in which case it
//! is capped at the saturation mixing ratio.

use super::psychrometrics::saturation_mixing_ratio;
use super::ZERO_CELSIUS_K;

/// Temperature lapse rate (K/m).
pub const LAPSE_RATE: f64 = 0.0065;

/// Exponent of the hypsometric pressure relation.
const PRESSURE_EXPONENT: f64 = 5.257;

/// Temperature (°C) after moving up by `elevation_gap` metres.
pub fn correct_temperature(temperature: f64, elevation_gap: f64) -> f64 {
    temperature - LAPSE_RATE * elevation_gap
}

/// Pressure (hPa) after moving up by `elevation_gap` metres, given the
/// already corrected temperature (°C).
pub fn correct_pressure(pressure: f64, elevation_gap: f64, corrected_temperature: f64) -> f64 {
    let drop = LAPSE_RATE * elevation_gap;
    pressure * (1.0 - drop / (corrected_temperature + drop + ZERO_CELSIUS_K)).powf(PRESSURE_EXPONENT)
}

/// Mixing ratio (g/kg) at the corrected temperature (°C) and pressure (hPa).
///
/// No lower bound is applied.
pub fn correct_mixing_ratio(
    mixing_ratio: f64,
    corrected_temperature: f64,
    corrected_pressure: f64,
) -> f64 {
    let saturated = saturation_mixing_ratio(corrected_temperature, corrected_pressure);
    if mixing_ratio > saturated {
        saturated
    } else {
        mixing_ratio
    }
}

/// Correction from one reference elevation to a target elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationCorrection {
    /// Target minus reference elevation (m)
    pub gap: f64,
}

impl ElevationCorrection {
    pub fn new(reference_elevation: f64, target_elevation: f64) -> Self {
        ElevationCorrection {
            gap: target_elevation - reference_elevation,
        }
    }

    /// Corrects one `(temperature, pressure, mixing_ratio)` sample.
    pub fn apply(&self, temperature: f64, pressure: f64, mixing_ratio: f64) -> (f64, f64, f64) {
        let t = correct_temperature(temperature, self.gap);
        let p = correct_pressure(pressure, self.gap, t);
        let mr = correct_mixing_ratio(mixing_ratio, t, p);
        (t, p, mr)
    }
}
