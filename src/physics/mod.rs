//! Physical relations shared by the pipeline stages.
//!
//! - [`psychrometrics`]: vapour pressure, relative humidity, dew point
//! - [`elevation`]: correcting grid-point values to the site elevation

pub mod elevation;
pub mod psychrometrics;

/// Stefan-Boltzmann constant (W/m²·K⁴)
pub const STEFAN_BOLTZMANN: f64 = 5.67e-8;

/// Offset between °C and K.
pub const ZERO_CELSIUS_K: f64 = 273.15;

/// Converts an hourly mean flux (W/m²) to hourly energy (MJ/m²).
pub fn watts_to_megajoules(w: f64) -> f64 {
    w * 3600.0 / 1_000_000.0
}

/// Converts hourly energy (MJ/m²) to an hourly mean flux (W/m²).
pub fn megajoules_to_watts(mj: f64) -> f64 {
    mj / 3600.0 * 1_000_000.0
}
