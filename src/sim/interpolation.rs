//! Elevation-weighted interpolator.
//!
//! Builds the site series from the four grid points of the enclosing cell.
//! Each grid series is first corrected from its own reference elevation to
//! the site elevation (temperature, pressure and mixing ratio only), then the
//! four corrected series are blended field by field with the caller's weights.
//! Weights are used as given; they are not renormalised.

use crate::error::Result;
use crate::physics::elevation::ElevationCorrection;
use crate::weather::{GridSeries, Quadrant, TargetSeries};
use tracing::debug;

/// Corrects temperature, pressure and mixing ratio of `series` in place from
/// `reference_elevation` to `target_elevation` (m).
pub fn correct_to_elevation(series: &mut GridSeries, reference_elevation: f64, target_elevation: f64) {
    let correction = ElevationCorrection::new(reference_elevation, target_elevation);
    let samples = series
        .temperature
        .iter_mut()
        .zip(series.pressure.iter_mut())
        .zip(series.mixing_ratio.iter_mut());

    for ((t, p), mr) in samples {
        let (t_corr, p_corr, mr_corr) = correction.apply(*t, *p, *mr);
        *t = t_corr;
        *p = p_corr;
        *mr = mr_corr;
    }
}

/// Weighted per-timestamp sum of one field across the four corners.
fn blend(series: &Quadrant<GridSeries>, weights: &Quadrant<f64>, field: fn(&GridSeries) -> &[f64]) -> Vec<f64> {
    let [sw, se, nw, ne] = [
        field(&series.south_west),
        field(&series.south_east),
        field(&series.north_west),
        field(&series.north_east),
    ];
    (0..sw.len())
        .map(|i| weights.weighted_sum([sw[i], se[i], nw[i], ne[i]]))
        .collect()
}

/// Like [`blend`] for a field that may be absent; produced only when all four
/// corners carry it.
fn blend_optional(
    series: &Quadrant<GridSeries>,
    weights: &Quadrant<f64>,
    field: fn(&GridSeries) -> Option<&Vec<f64>>,
) -> Option<Vec<f64>> {
    let [sw, se, nw, ne] = [
        field(&series.south_west)?,
        field(&series.south_east)?,
        field(&series.north_west)?,
        field(&series.north_east)?,
    ];
    Some(
        (0..sw.len())
            .map(|i| weights.weighted_sum([sw[i], se[i], nw[i], ne[i]]))
            .collect(),
    )
}

/// Interpolates the site series from the four grid series of its cell.
///
/// The grid series are consumed: elevation correction is applied to them in
/// place before blending.
///
/// # Arguments
/// * `series` - Grid series ordered SW, SE, NW, NE, sharing one timeline
/// * `weights` - Interpolation weight per corner
/// * `elevations` - Reference elevation per corner (m)
/// * `target_elevation` - Site elevation (m)
///
/// # Errors
/// Fails with [`crate::ClimateError::LengthMismatch`],
/// [`crate::ClimateError::TimestampMismatch`] or
/// [`crate::ClimateError::EmptySeries`] when the four series do not line up.
pub fn interpolate(
    mut series: Quadrant<GridSeries>,
    weights: &Quadrant<f64>,
    elevations: &Quadrant<f64>,
    target_elevation: f64,
) -> Result<TargetSeries> {
    series.validate_aligned()?;

    for (corner, &elevation) in elevations.iter() {
        debug!(
            corner = corner.label(),
            weight = *weights.get(corner),
            elevation,
            gap = target_elevation - elevation,
            "correcting grid point"
        );
        correct_to_elevation(series.get_mut(corner), elevation, target_elevation);
    }

    Ok(TargetSeries {
        timestamps: series.south_west.timestamps.clone(),
        temperature: blend(&series, weights, |s| s.temperature.as_slice()),
        pressure: blend(&series, weights, |s| s.pressure.as_slice()),
        mixing_ratio: blend(&series, weights, |s| s.mixing_ratio.as_slice()),
        wind_u: blend(&series, weights, |s| s.wind_u.as_slice()),
        wind_v: blend(&series, weights, |s| s.wind_v.as_slice()),
        precipitation: blend(&series, weights, |s| s.precipitation.as_slice()),
        longwave: blend(&series, weights, |s| s.longwave.as_slice()),
        shortwave_estimated: blend_optional(&series, weights, |s| s.shortwave_estimated.as_ref()),
        shortwave_model: blend_optional(&series, weights, |s| s.shortwave_model.as_ref()),
        ..Default::default()
    })
}
