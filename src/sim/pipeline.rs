//! Composed estimation pipeline.
//!
//! `interpolate → derive → solar position → separate → wind`, producing one
//! fully populated [`TargetSeries`] for a site.

use crate::config::RunConfig;
use crate::error::Result;
use crate::sim::derived::derive;
use crate::sim::interpolation::interpolate;
use crate::sim::separation::{SeparationModel, SeparationResult, Separator};
use crate::sim::solar::{SolarPositionCalculator, SolarPositionRecord, DEFAULT_STANDARD_MERIDIAN};
use crate::sim::wind::resolve_series;
use crate::weather::{GridSeries, Quadrant, TargetSeries};
use tracing::{debug, info, warn};

/// Geographic position of the site and the meridian of its standard time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub standard_meridian: f64,
}

impl Location {
    /// Location whose timestamps are in Japan Standard Time.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Location {
            latitude,
            longitude,
            standard_meridian: DEFAULT_STANDARD_MERIDIAN,
        }
    }

    fn solar_calculator(&self) -> SolarPositionCalculator {
        SolarPositionCalculator::new(self.latitude, self.longitude)
            .with_standard_meridian(self.standard_meridian)
    }
}

/// Separates one irradiance variant and reports hours left undefined.
fn separate_variant(
    variant: &str,
    separator: &Separator<'_>,
    irradiance: &[f64],
    solar: &[SolarPositionRecord],
) -> Result<Vec<SeparationResult>> {
    info!(variant, model = %separator.model(), "separating irradiance");
    let results = separator.separate(irradiance, solar)?;

    let undefined = results
        .iter()
        .zip(irradiance)
        .filter(|(r, th)| !r.is_defined() && !th.is_nan())
        .count();
    if undefined > 0 {
        warn!(variant, undefined, "separation did not converge for some hours");
    }
    Ok(results)
}

/// Runs the whole pipeline for one site.
///
/// # Arguments
/// * `location` - Site position
/// * `series` - Grid series of the enclosing cell, SW, SE, NW, NE
/// * `weights` - Interpolation weight per corner
/// * `elevations` - Reference elevation per corner (m)
/// * `target_elevation` - Site elevation (m)
/// * `model` - Separation model applied to every shortwave variant present
///
/// # Errors
/// Any configuration error from the stages; nothing is returned partially.
pub fn run(
    location: &Location,
    series: Quadrant<GridSeries>,
    weights: &Quadrant<f64>,
    elevations: &Quadrant<f64>,
    target_elevation: f64,
    model: SeparationModel,
) -> Result<TargetSeries> {
    debug!(
        latitude = location.latitude,
        longitude = location.longitude,
        target_elevation,
        %model,
        "starting pipeline"
    );

    info!(hours = series.south_west.len(), "interpolating grid series");
    let mut target = interpolate(series, weights, elevations, target_elevation)?;

    info!("deriving humidity and radiation quantities");
    derive(&mut target);

    target.solar = location.solar_calculator().compute(&target.timestamps);

    let separator = Separator::new(model, &target.dew_point, target_elevation);
    let estimated = match &target.shortwave_estimated {
        Some(irradiance) => Some(separate_variant("estimated", &separator, irradiance, &target.solar)?),
        None => None,
    };
    let native = match &target.shortwave_model {
        Some(irradiance) => Some(separate_variant("model", &separator, irradiance, &target.solar)?),
        None => None,
    };
    target.separation_estimated = estimated;
    target.separation_model = native;

    resolve_series(&mut target);
    Ok(target)
}

/// Runs the pipeline with everything taken from a [`RunConfig`], then applies
/// its year window.
pub fn run_with_config(config: &RunConfig, series: Quadrant<GridSeries>) -> Result<TargetSeries> {
    let location = Location {
        latitude: config.latitude,
        longitude: config.longitude,
        standard_meridian: config.standard_meridian,
    };
    let weights = config.weights();
    let elevations = config.grid_elevations()?;
    let target_elevation = config.target_elevation()?;

    let mut target = run(&location, series, &weights, &elevations, target_elevation, config.separation)?;

    if let Some((start, end)) = config.year_range() {
        target.retain_years(start, end);
        debug!(start, end, hours = target.len(), "applied year window");
    }
    Ok(target)
}
