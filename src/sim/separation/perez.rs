//! Perez direct-normal model.
//!
//! An upper bound on direct normal irradiance is derived from the clearness
//! index and air mass of the current hour, then scaled by a coefficient from
//! a 6×6×7×5 table selected by four bins:
//!
//! - clearness: modified clearness index KT′ of the current hour
//! - zenith: solar zenith angle of the current hour
//! - variability: hour-to-hour change of KT′ against the previous and next hour
//! - humidity: precipitable water estimated from dew point
//!
//! The model works in W/m²; inputs and output are hourly MJ/m².

use super::perez_table::{flat_index, COEFFICIENTS, VARIABILITY_BINS};
use crate::physics::{megajoules_to_watts, watts_to_megajoules};
use crate::sim::solar::SolarPositionRecord;

/// Thresholds of the clearness bins (KT′).
pub const CLEARNESS_THRESHOLDS: [f64; 5] = [0.24, 0.4, 0.56, 0.7, 0.8];

/// Thresholds of the zenith bins (degrees).
pub const ZENITH_THRESHOLDS: [f64; 5] = [25.0, 40.0, 55.0, 70.0, 80.0];

/// Thresholds of the variability bins (ΔKT′).
pub const VARIABILITY_THRESHOLDS: [f64; 5] = [0.015, 0.035, 0.07, 0.15, 0.3];

/// Thresholds of the humidity bins (precipitable water, cm).
pub const HUMIDITY_THRESHOLDS: [f64; 3] = [1.0, 2.0, 3.0];

/// Total horizontal irradiance below which DN is zero (W/m²).
const MIN_IRRADIANCE: f64 = 1.0;

/// Floor on the cosine of the zenith angle.
const MIN_COS_ZENITH: f64 = 0.065;

const MAX_AIR_MASS: f64 = 15.25;

/// Neighbour hours with a zenith at or beyond this angle are not trusted for
/// variability (degrees).
const LOW_SUN_ZENITH: f64 = 85.0;

/// Humidity bin used when the dew point is undefined.
const UNKNOWN_HUMIDITY_BIN: usize = 4;

/// Variability bin used when neither neighbour is usable.
const UNKNOWN_VARIABILITY_BIN: usize = VARIABILITY_BINS - 1;

/// Index of the first threshold strictly greater than `value`, or
/// `thresholds.len()` if there is none.
///
/// A value equal to a threshold therefore goes to the higher bin, and NaN
/// goes to the last bin.
pub fn bin_index(value: f64, thresholds: &[f64]) -> usize {
    thresholds
        .iter()
        .position(|&t| value < t)
        .unwrap_or(thresholds.len())
}

/// Per-hour quantities of the three-hour window.
#[derive(Debug, Clone, Copy)]
struct HourState {
    zenith: f64,
    air_mass: f64,
    clearness: f64,
    /// Clearness normalised for air mass (KT′); NaN when unusable
    modified_clearness: f64,
}

impl HourState {
    fn new(irradiance: f64, elevation: f64, extraterrestrial: f64, site_elevation: f64) -> Self {
        let zenith = 90.0 - elevation;
        let cos_zenith = zenith.to_radians().cos();
        // NaN passes through both caps
        let cz = if cos_zenith < MIN_COS_ZENITH {
            MIN_COS_ZENITH
        } else {
            cos_zenith
        };

        let clearness = irradiance / (extraterrestrial * cz);
        let air_mass = 1.0 / (cz + 0.15 * (93.9 - zenith).powf(-1.253));
        let air_mass = if air_mass > MAX_AIR_MASS { MAX_AIR_MASS } else { air_mass };
        let pressure_air_mass = air_mass * (-0.0001184 * site_elevation).exp();

        let modified_clearness = if cos_zenith < 0.0 {
            f64::NAN
        } else {
            clearness / (1.031 * (-1.4 / (0.9 + 9.4 / pressure_air_mass)).exp() + 0.1)
        };

        HourState {
            zenith,
            air_mass,
            clearness,
            modified_clearness,
        }
    }
}

/// Variability bin from the previous, current and next hour.
fn variability_bin(previous: &HourState, current: &HourState, next: &HourState) -> usize {
    let before = previous.modified_clearness;
    let now = current.modified_clearness;
    let after = next.modified_clearness;

    if before.is_nan() && after.is_nan() {
        return UNKNOWN_VARIABILITY_BIN;
    }
    let delta = if before.is_nan() || previous.zenith >= LOW_SUN_ZENITH {
        (after - now).abs()
    } else if after.is_nan() || next.zenith >= LOW_SUN_ZENITH {
        (now - before).abs()
    } else {
        0.5 * ((now - before).abs() + (after - now).abs())
    };
    bin_index(delta, &VARIABILITY_THRESHOLDS)
}

fn humidity_bin(dew_point: f64) -> usize {
    if dew_point.is_nan() {
        UNKNOWN_HUMIDITY_BIN
    } else {
        bin_index((-0.075 + 0.07 * dew_point).exp(), &HUMIDITY_THRESHOLDS)
    }
}

/// Direct normal irradiance for the middle hour of a three-hour window.
///
/// # Arguments
/// * `irradiance` - Total horizontal irradiance of the previous, current and
///   next hour (MJ/m²); NaN for a missing neighbour
/// * `elevation` - Mean solar elevation of the same hours (degrees)
/// * `dew_point` - Dew point of the current hour (°C), may be NaN
/// * `site_elevation` - Site elevation (m)
/// * `extraterrestrial` - IN0 of the current hour (MJ/m²h)
///
/// # Returns
/// Direct normal irradiance (MJ/m²), never negative
pub fn direct_normal(
    irradiance: [f64; 3],
    elevation: [f64; 3],
    dew_point: f64,
    site_elevation: f64,
    extraterrestrial: f64,
) -> f64 {
    let g = irradiance.map(megajoules_to_watts);
    if g[1].is_nan() || g[1] < MIN_IRRADIANCE || elevation[1] <= 0.0 {
        return 0.0;
    }

    // Neighbours below the horizon are unusable
    let elevation = elevation.map(|h| if h < 0.0 { f64::NAN } else { h });
    let io = megajoules_to_watts(extraterrestrial);

    let [mut previous, current, mut next] =
        [0, 1, 2].map(|i| HourState::new(g[i], elevation[i], io, site_elevation));
    if g[0].is_nan() || previous.zenith.is_nan() {
        previous.modified_clearness = f64::NAN;
    }
    if g[2].is_nan() || next.zenith.is_nan() {
        next.modified_clearness = f64::NAN;
    }

    let kt = current.clearness;
    let (a, b, c) = if kt <= 0.6 {
        (
            0.512 - 1.56 * kt + 2.286 * kt.powi(2) - 2.22 * kt.powi(3),
            0.37 + 0.962 * kt,
            -0.28 + 0.932 * kt - 2.048 * kt.powi(2),
        )
    } else {
        (
            -5.743 + 21.77 * kt - 27.49 * kt.powi(2) + 11.56 * kt.powi(3),
            41.40 - 118.5 * kt + 66.05 * kt.powi(2) + 31.9 * kt.powi(3),
            -47.01 + 184.2 * kt - 222.0 * kt.powi(2) + 73.81 * kt.powi(3),
        )
    };

    let am = current.air_mass;
    let knc = 0.866 - 0.122 * am + 0.0121 * am.powi(2) - 0.000653 * am.powi(3) + 0.000014 * am.powi(4);
    let bmax = io * (knc - (a + b * (c * am).exp()));

    let coefficient = COEFFICIENTS[flat_index(
        bin_index(current.modified_clearness, &CLEARNESS_THRESHOLDS),
        bin_index(current.zenith, &ZENITH_THRESHOLDS),
        variability_bin(&previous, &current, &next),
        humidity_bin(dew_point),
    )];

    let dirmax = bmax * coefficient;
    watts_to_megajoules(if dirmax < 0.0 { 0.0 } else { dirmax })
}

/// Value at `i` with its neighbours; NaN outside the slice.
fn window(values: &[f64], i: usize) -> [f64; 3] {
    let at = |j: Option<usize>| j.and_then(|j| values.get(j)).copied().unwrap_or(f64::NAN);
    [at(i.checked_sub(1)), at(Some(i)), at(Some(i + 1))]
}

/// Direct normal irradiance for every hour of a series.
///
/// An undefined total yields NaN for that hour only; its neighbours treat it
/// as a missing hour.
pub fn direct_normal_series(
    irradiance: &[f64],
    solar: &[SolarPositionRecord],
    dew_point: &[f64],
    site_elevation: f64,
) -> Vec<f64> {
    let elevations: Vec<f64> = solar.iter().map(|r| r.elevation).collect();
    (0..irradiance.len())
        .map(|i| {
            if irradiance[i].is_nan() {
                f64::NAN
            } else {
                direct_normal(
                    window(irradiance, i),
                    window(&elevations, i),
                    dew_point[i],
                    site_elevation,
                    solar[i].extraterrestrial,
                )
            }
        })
        .collect()
}
