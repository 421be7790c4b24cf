//! Moist-air relations.
//!
//! Saturation vapour pressure follows Wexler-Hyland over liquid water. Dew
//! point uses two cubic fits in the logarithm of vapour pressure, one for the
//! 0 to 50 °C regime and one for -50 to 0 °C.

use super::ZERO_CELSIUS_K;
use std::ops::RangeInclusive;

/// Ratio of the molar masses of water and dry air, scaled to g/kg.
pub const WATER_AIR_RATIO_G_PER_KG: f64 = 621.98;

/// Vapour pressures (hPa) covered by the 0 to 50 °C dew point fit.
pub const DEW_POINT_WARM_RANGE: RangeInclusive<f64> = 6.112..=123.50;

/// Vapour pressures (hPa) covered by the -50 to 0 °C dew point fit.
pub const DEW_POINT_COLD_RANGE: RangeInclusive<f64> = 0.039..=6.112;

/// Humidity state of one hourly sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumidityState {
    /// Relative humidity (%)
    pub relative_humidity: f64,
    /// Water vapour partial pressure (hPa)
    pub vapor_pressure: f64,
    /// Saturation vapour pressure at the air temperature (hPa)
    pub saturation_vapor_pressure: f64,
}

/// Saturation vapour pressure over water (hPa) at `temperature` (°C).
pub fn saturation_vapor_pressure(temperature: f64) -> f64 {
    let t = temperature + ZERO_CELSIUS_K;
    let ln_pa = -5800.2206 / t + 1.3914993 - 0.048640239 * t + 4.1764768e-5 * t.powi(2)
        - 1.4452093e-8 * t.powi(3)
        + 6.5459673 * t.ln();
    ln_pa.exp() / 100.0
}

/// Water vapour partial pressure (hPa) from mixing ratio (g/kg) and pressure (hPa).
pub fn vapor_pressure(mixing_ratio: f64, pressure: f64) -> f64 {
    pressure * mixing_ratio / (mixing_ratio + WATER_AIR_RATIO_G_PER_KG)
}

/// Mixing ratio (g/kg) holding the given vapour pressure at `pressure` (hPa).
pub fn mixing_ratio_from_vapor_pressure(vapor_pressure: f64, pressure: f64) -> f64 {
    WATER_AIR_RATIO_G_PER_KG * vapor_pressure / (pressure - vapor_pressure)
}

/// Mixing ratio (g/kg) of saturated air.
pub fn saturation_mixing_ratio(temperature: f64, pressure: f64) -> f64 {
    mixing_ratio_from_vapor_pressure(saturation_vapor_pressure(temperature), pressure)
}

/// Relative humidity and vapour pressures for a mixing ratio (g/kg),
/// temperature (°C) and pressure (hPa).
pub fn humidity_state(mixing_ratio: f64, temperature: f64, pressure: f64) -> HumidityState {
    let saturation = saturation_vapor_pressure(temperature);
    let vapor = vapor_pressure(mixing_ratio, pressure);
    HumidityState {
        relative_humidity: vapor / saturation * 100.0,
        vapor_pressure: vapor,
        saturation_vapor_pressure: saturation,
    }
}

/// Mixing ratio (g/kg) for a relative humidity (%) at temperature (°C) and
/// pressure (hPa). Inverse of [`humidity_state`].
pub fn mixing_ratio_from_relative_humidity(
    relative_humidity: f64,
    temperature: f64,
    pressure: f64,
) -> f64 {
    let vapor = relative_humidity / 100.0 * saturation_vapor_pressure(temperature);
    mixing_ratio_from_vapor_pressure(vapor, pressure)
}

/// Dew point (°C) for a vapour pressure (hPa).
///
/// Returns NaN when the vapour pressure lies outside both fitted ranges. The
/// shared boundary at 6.112 hPa belongs to the warm fit.
pub fn dew_point(vapor_pressure: f64) -> f64 {
    if DEW_POINT_WARM_RANGE.contains(&vapor_pressure) {
        let y = (vapor_pressure * 100.0).ln();
        -77.199 + 13.198 * y - 0.63772 * y.powi(2) + 0.071098 * y.powi(3)
    } else if DEW_POINT_COLD_RANGE.contains(&vapor_pressure) {
        let y = (vapor_pressure * 100.0).ln();
        -60.662 + 7.4624 * y + 0.20594 * y.powi(2) + 0.016321 * y.powi(3)
    } else {
        f64::NAN
    }
}
