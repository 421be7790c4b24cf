//! Irradiance separation engine.
//!
//! Splits total horizontal irradiance (TH) into direct normal (DN) and diffuse
//! horizontal (SH) irradiance. Each model estimates one of the two; the other
//! always follows from the balance `TH = DN·sinh + SH`, floored at zero:
//!
//! | Model | Estimates | Module |
//! |---|---|---|
//! | Nagata | SH | [`transmissivity`] |
//! | Watanabe | SH | [`transmissivity`] |
//! | Erbs | SH | [`empirical`] |
//! | Udagawa | DN | [`empirical`] |
//! | Perez | DN | [`perez`] |
//!
//! All irradiances are hourly MJ/m². A timestamp whose TH is undefined yields
//! `(NaN, NaN)`; it never affects other timestamps except as a missing
//! neighbour for Perez.

pub mod empirical;
pub mod perez;
pub mod perez_table;
pub mod transmissivity;

use crate::error::{ClimateError, Result};
use crate::sim::solar::SolarPositionRecord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use transmissivity::TransmissivityModel;

/// Separation model selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SeparationModel {
    Nagata,
    Watanabe,
    Erbs,
    Udagawa,
    #[default]
    Perez,
}

impl SeparationModel {
    pub const ALL: [SeparationModel; 5] = [
        SeparationModel::Nagata,
        SeparationModel::Watanabe,
        SeparationModel::Erbs,
        SeparationModel::Udagawa,
        SeparationModel::Perez,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SeparationModel::Nagata => "Nagata",
            SeparationModel::Watanabe => "Watanabe",
            SeparationModel::Erbs => "Erbs",
            SeparationModel::Udagawa => "Udagawa",
            SeparationModel::Perez => "Perez",
        }
    }
}

impl fmt::Display for SeparationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SeparationModel {
    type Err = ClimateError;

    fn from_str(s: &str) -> Result<Self> {
        SeparationModel::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| ClimateError::UnknownModel(s.to_string()))
    }
}

impl TryFrom<String> for SeparationModel {
    type Error = ClimateError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

/// Direct/diffuse split of one hour (MJ/m²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeparationResult {
    /// Direct normal irradiance (DN)
    #[serde(deserialize_with = "crate::weather::nullable::value")]
    pub direct_normal: f64,
    /// Diffuse horizontal irradiance (SH)
    #[serde(deserialize_with = "crate::weather::nullable::value")]
    pub diffuse_horizontal: f64,
}

impl SeparationResult {
    pub const UNDEFINED: SeparationResult = SeparationResult {
        direct_normal: f64::NAN,
        diffuse_horizontal: f64::NAN,
    };

    pub fn is_defined(&self) -> bool {
        !self.direct_normal.is_nan() && !self.diffuse_horizontal.is_nan()
    }
}

/// A separation model together with the inputs only it needs.
#[derive(Debug, Clone, Copy)]
pub enum Separator<'a> {
    Nagata,
    Watanabe,
    Erbs,
    Udagawa,
    Perez {
        /// Dew point per timestamp (°C), NaN where undefined
        dew_point: &'a [f64],
        /// Site elevation (m)
        elevation: f64,
    },
}

impl<'a> Separator<'a> {
    /// Builds the separator for `model`. Dew point and elevation are only
    /// kept for Perez.
    pub fn new(model: SeparationModel, dew_point: &'a [f64], elevation: f64) -> Self {
        match model {
            SeparationModel::Nagata => Separator::Nagata,
            SeparationModel::Watanabe => Separator::Watanabe,
            SeparationModel::Erbs => Separator::Erbs,
            SeparationModel::Udagawa => Separator::Udagawa,
            SeparationModel::Perez => Separator::Perez { dew_point, elevation },
        }
    }

    pub fn model(&self) -> SeparationModel {
        match self {
            Separator::Nagata => SeparationModel::Nagata,
            Separator::Watanabe => SeparationModel::Watanabe,
            Separator::Erbs => SeparationModel::Erbs,
            Separator::Udagawa => SeparationModel::Udagawa,
            Separator::Perez { .. } => SeparationModel::Perez,
        }
    }

    /// Splits a series of total horizontal irradiance.
    ///
    /// # Arguments
    /// * `irradiance` - Total horizontal irradiance per timestamp (MJ/m²)
    /// * `solar` - Solar position per timestamp, same order
    ///
    /// # Errors
    /// [`ClimateError::LengthMismatch`] if the solar positions (or, for
    /// Perez, the dew points) do not match the irradiance series.
    pub fn separate(&self, irradiance: &[f64], solar: &[SolarPositionRecord]) -> Result<Vec<SeparationResult>> {
        check_length("solar positions", irradiance.len(), solar.len())?;

        let estimate = match *self {
            Separator::Nagata => Estimate::Diffuse(transmissivity_series(
                TransmissivityModel::Nagata,
                irradiance,
                solar,
            )),
            Separator::Watanabe => Estimate::Diffuse(transmissivity_series(
                TransmissivityModel::Watanabe,
                irradiance,
                solar,
            )),
            Separator::Erbs => Estimate::Diffuse(
                irradiance
                    .iter()
                    .zip(solar)
                    .map(|(&th, r)| empirical::erbs_diffuse(th, r.extraterrestrial, r.sin_elevation))
                    .collect(),
            ),
            Separator::Udagawa => Estimate::DirectNormal(
                irradiance
                    .iter()
                    .zip(solar)
                    .map(|(&th, r)| {
                        empirical::udagawa_direct_normal(th, r.extraterrestrial, r.sin_elevation)
                    })
                    .collect(),
            ),
            Separator::Perez { dew_point, elevation } => {
                check_length("dew point", irradiance.len(), dew_point.len())?;
                Estimate::DirectNormal(perez::direct_normal_series(
                    irradiance, solar, dew_point, elevation,
                ))
            }
        };

        Ok(estimate.complete(irradiance, solar))
    }
}

/// Separates `irradiance` with `model`; see [`Separator::separate`].
pub fn separate(
    irradiance: &[f64],
    solar: &[SolarPositionRecord],
    dew_point: &[f64],
    elevation: f64,
    model: SeparationModel,
) -> Result<Vec<SeparationResult>> {
    Separator::new(model, dew_point, elevation).separate(irradiance, solar)
}

fn check_length(field: &str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(ClimateError::LengthMismatch {
            field: field.to_string(),
            expected,
            found,
        })
    }
}

/// The quantity a model estimated directly.
enum Estimate {
    Diffuse(Vec<f64>),
    DirectNormal(Vec<f64>),
}

impl Estimate {
    /// Back-derives the complementary quantity for every hour.
    fn complete(self, irradiance: &[f64], solar: &[SolarPositionRecord]) -> Vec<SeparationResult> {
        let primary = match &self {
            Estimate::Diffuse(values) | Estimate::DirectNormal(values) => values,
        };
        irradiance
            .iter()
            .zip(solar)
            .zip(primary)
            .map(|((&th, r), &value)| {
                if th.is_nan() {
                    return SeparationResult::UNDEFINED;
                }
                match &self {
                    Estimate::Diffuse(_) => SeparationResult {
                        direct_normal: direct_from_diffuse(th, value, r.sin_elevation),
                        diffuse_horizontal: value,
                    },
                    Estimate::DirectNormal(_) => SeparationResult {
                        direct_normal: value,
                        diffuse_horizontal: diffuse_from_direct(th, value, r.sin_elevation),
                    },
                }
            })
            .collect()
    }
}

/// Bisection models are the expensive ones; hours are independent.
fn transmissivity_series(model: TransmissivityModel, irradiance: &[f64], solar: &[SolarPositionRecord]) -> Vec<f64> {
    irradiance
        .par_iter()
        .zip(solar.par_iter())
        .map(|(&th, r)| model.diffuse_horizontal(th, r.sin_elevation, r.extraterrestrial))
        .collect()
}

/// `DN = (TH − SH) / sinh`, floored at zero. NaN stays NaN.
pub fn direct_from_diffuse(total_horizontal: f64, diffuse: f64, sin_elevation: f64) -> f64 {
    floor_zero((total_horizontal - diffuse) / sin_elevation)
}

/// `SH = TH − DN·sinh`, floored at zero. NaN stays NaN.
pub fn diffuse_from_direct(total_horizontal: f64, direct_normal: f64, sin_elevation: f64) -> f64 {
    floor_zero(total_horizontal - direct_normal * sin_elevation)
}

fn floor_zero(value: f64) -> f64 {
    if value <= 0.0 {
        0.0
    } else {
        value
    }
}

/// Minimum that returns NaN if either side is NaN.
pub(crate) fn min_propagating(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}
