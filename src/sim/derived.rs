//! Derived-quantity calculator.
//!
//! Extends an interpolated [`TargetSeries`] in place with relative humidity,
//! vapour pressure, dew point and nocturnal radiation, and converts the
//! longwave flux to hourly energy.

use crate::physics::psychrometrics::{dew_point, humidity_state};
use crate::physics::{watts_to_megajoules, STEFAN_BOLTZMANN, ZERO_CELSIUS_K};
use crate::weather::{LongwaveUnit, TargetSeries};

/// Fills relative humidity, vapour pressure and dew point.
pub fn humidity(series: &mut TargetSeries) {
    let n = series.len();
    let mut relative_humidity = Vec::with_capacity(n);
    let mut vapor_pressure = Vec::with_capacity(n);
    let mut dew = Vec::with_capacity(n);

    for ((&mr, &t), &p) in series
        .mixing_ratio
        .iter()
        .zip(&series.temperature)
        .zip(&series.pressure)
    {
        let state = humidity_state(mr, t, p);
        relative_humidity.push(state.relative_humidity);
        vapor_pressure.push(state.vapor_pressure);
        dew.push(dew_point(state.vapor_pressure));
    }

    series.relative_humidity = relative_humidity;
    series.vapor_pressure = vapor_pressure;
    series.dew_point = dew;
}

/// Converts longwave flux from W/m² to MJ/m².
///
/// Does nothing if the series is already in MJ/m².
pub fn convert_longwave(series: &mut TargetSeries) {
    if series.longwave_unit == LongwaveUnit::MegajoulesPerSquareMetre {
        return;
    }
    for ld in series.longwave.iter_mut() {
        *ld = watts_to_megajoules(*ld);
    }
    series.longwave_unit = LongwaveUnit::MegajoulesPerSquareMetre;
}

/// Net nocturnal radiation (MJ/m²) for air temperature (°C) and downward
/// longwave energy (MJ/m²).
pub fn nocturnal_radiation(temperature: f64, longwave: f64) -> f64 {
    watts_to_megajoules(STEFAN_BOLTZMANN * (temperature + ZERO_CELSIUS_K).powi(4)) - longwave
}

/// Runs every derivation on `series`.
///
/// Humidity fields come from the interpolated state, the longwave flux is
/// converted once, and nocturnal radiation is computed from the converted
/// flux.
pub fn derive(series: &mut TargetSeries) {
    humidity(series);
    convert_longwave(series);
    series.nocturnal_radiation = series
        .temperature
        .iter()
        .zip(&series.longwave)
        .map(|(&t, &ld)| nocturnal_radiation(t, ld))
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::psychrometrics::mixing_ratio_from_relative_humidity;

    fn series(temperature: f64, mixing_ratio: f64, longwave: f64) -> TargetSeries {
        TargetSeries {
            timestamps: vec![chrono::NaiveDateTime::default(); 3],
            temperature: vec![temperature; 3],
            pressure: vec![1000.0; 3],
            mixing_ratio: vec![mixing_ratio; 3],
            longwave: vec![longwave; 3],
            ..Default::default()
        }
    }

    #[test]
    fn test_humidity_round_trips_mixing_ratio() {
        let mut s = series(20.0, 8.0, 350.0);
        derive(&mut s);
        let rh = s.relative_humidity[0];
        assert!(rh > 0.0 && rh < 100.0, "RH {}", rh);
        let mr = mixing_ratio_from_relative_humidity(rh, 20.0, 1000.0);
        assert!((mr - 8.0).abs() < 1e-9);
        assert!(!s.dew_point[0].is_nan());
        assert!(s.dew_point[0] < 20.0);
    }

    #[test]
    fn test_dew_point_undefined_for_dry_air() {
        // Pw far below 0.039 hPa
        let mut s = series(-40.0, 0.001, 150.0);
        derive(&mut s);
        assert!(s.vapor_pressure[0] < 0.039);
        assert!(s.dew_point[0].is_nan());
        assert!(!s.relative_humidity[0].is_nan());
    }

    #[test]
    fn test_longwave_converted_once() {
        let mut s = series(20.0, 8.0, 1000.0);
        derive(&mut s);
        assert!((s.longwave[0] - 3.6).abs() < 1e-12);
        assert_eq!(s.longwave_unit, LongwaveUnit::MegajoulesPerSquareMetre);

        convert_longwave(&mut s);
        assert!((s.longwave[0] - 3.6).abs() < 1e-12, "second conversion is a no-op");
    }

    #[test]
    fn test_nocturnal_radiation() {
        let mut s = series(20.0, 8.0, 300.0);
        derive(&mut s);
        // σT⁴ at 293.15 K is about 418.7 W/m², i.e. 1.507 MJ/m²; Ld is 1.08 MJ/m²
        let expected = 5.67e-8 * 293.15f64.powi(4) * 3600.0e-6 - 1.08;
        assert!((s.nocturnal_radiation[0] - expected).abs() < 1e-12);
        assert!((s.nocturnal_radiation[0] - 0.4273).abs() < 1e-3);
    }

    #[test]
    fn test_all_derived_fields_aligned() {
        let mut s = series(5.0, 3.0, 280.0);
        derive(&mut s);
        assert_eq!(s.relative_humidity.len(), 3);
        assert_eq!(s.vapor_pressure.len(), 3);
        assert_eq!(s.dew_point.len(), 3);
        assert_eq!(s.nocturnal_radiation.len(), 3);
    }
}
