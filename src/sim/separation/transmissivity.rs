//! Transmissivity-based diffuse models (Nagata, Watanabe).
//!
//! Both models express diffuse horizontal irradiance as a function of the
//! atmospheric transmissivity `P`, which is not observed. `P` is found by
//! bisection so that the implied total horizontal irradiance
//! `TH0(P) = IN0·P^(1/sinh)·sinh + SH(P)` matches the observed total.
//!
//! The search is not a textbook bisection. Its termination rules, checked in
//! this order on every step, are:
//!
//! 1. `|TH0 − TH| ≤ 1e-5`: converged. A solution at or above the 0.85 cap is
//!    replaced by the value at the cap.
//! 2. Lower bound at or above 0.85: answer at the cap.
//! 3. Upper bound at or below 0: answer at `P = 0`.
//! 4. Midpoint at or below 1e-9: answer at `P = 0`.
//! 5. Interval narrower than 1e-10: no solution, NaN.
//!
//! Every answer is capped at `TH`.

use super::min_propagating;

/// Convergence tolerance on total horizontal irradiance (MJ/m²).
pub const TOLERANCE: f64 = 1e-5;

/// Interval width treated as collapsed.
pub const INTERVAL_FLOOR: f64 = 1e-10;

/// Lowest transmissivity returned.
pub const TRANSMISSIVITY_MIN: f64 = 0.0;

/// Highest transmissivity returned.
pub const TRANSMISSIVITY_MAX: f64 = 0.85;

/// Upper end of the initial search interval. Low sun can imply `P > 1`.
pub const SEARCH_UPPER: f64 = 1.2;

/// Diffuse model driven by atmospheric transmissivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmissivityModel {
    Nagata,
    Watanabe,
}

impl TransmissivityModel {
    /// Diffuse horizontal irradiance (MJ/m²) at transmissivity `p`.
    pub fn diffuse(self, p: f64, extraterrestrial: f64, sin_elevation: f64) -> f64 {
        match self {
            TransmissivityModel::Nagata => nagata_diffuse(p, extraterrestrial, sin_elevation),
            TransmissivityModel::Watanabe => watanabe_diffuse(p, extraterrestrial, sin_elevation),
        }
    }

    /// Runs the transmissivity search for an observed total.
    pub fn search(self, total_horizontal: f64, sin_elevation: f64, extraterrestrial: f64) -> SearchOutcome {
        search_transmissivity(
            &|p: f64| self.diffuse(p, extraterrestrial, sin_elevation),
            total_horizontal,
            sin_elevation,
            extraterrestrial,
        )
    }

    /// Diffuse horizontal irradiance for an observed total, or 0 with the sun
    /// at or below the horizon.
    ///
    /// Returns NaN when the search does not converge or `total_horizontal`
    /// is NaN.
    pub fn diffuse_horizontal(self, total_horizontal: f64, sin_elevation: f64, extraterrestrial: f64) -> f64 {
        if sin_elevation <= 0.0 {
            return 0.0;
        }
        let sh = solve_diffuse(
            |p| self.diffuse(p, extraterrestrial, sin_elevation),
            total_horizontal,
            sin_elevation,
            extraterrestrial,
        );
        if sh < 0.0 {
            0.0
        } else {
            sh
        }
    }
}

/// Nagata diffuse model.
pub fn nagata_diffuse(p: f64, extraterrestrial: f64, sin_elevation: f64) -> f64 {
    let s = sin_elevation;
    extraterrestrial * s * (1.0 - p.powf(1.0 / s)) * (0.66 - 0.32 * s) * (0.5 + (0.4 - 0.3 * p) * s)
}

/// Watanabe diffuse model. Transmissivity above 1 is evaluated at 1.
pub fn watanabe_diffuse(p: f64, extraterrestrial: f64, sin_elevation: f64) -> f64 {
    let s = sin_elevation;
    let p = if p >= 1.0 { 1.0 } else { p };
    let q = (0.8672 + 0.7505 * s) * p.powf(0.421 / s) * (1.0 - p.powf(1.0 / s)).powf(2.277);
    extraterrestrial * s * (q / (1.0 + q))
}

/// Total horizontal irradiance implied by transmissivity `p` and diffuse `sh`.
pub fn implied_total(p: f64, extraterrestrial: f64, sin_elevation: f64, sh: f64) -> f64 {
    extraterrestrial * p.powf(1.0 / sin_elevation) * sin_elevation + sh
}

/// Where the transmissivity search stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchOutcome {
    /// `TH0(P)` matched the observed total at this `P`.
    Converged(f64),
    /// The lower bound reached the transmissivity cap.
    AboveCap,
    /// The upper bound fell to the lower transmissivity limit.
    BelowMin,
    /// The midpoint shrank to zero transmissivity.
    Collapsed,
    /// The interval closed without meeting the tolerance.
    Diverged,
}

/// Bisection on transmissivity for an arbitrary diffuse model `diffuse(P)`.
///
/// Expects `sin_elevation > 0`. See the module documentation for the
/// termination rules; the outcome names the rule that fired.
pub fn search_transmissivity<F>(
    diffuse: &F,
    total_horizontal: f64,
    sin_elevation: f64,
    extraterrestrial: f64,
) -> SearchOutcome
where
    F: Fn(f64) -> f64,
{
    let th = total_horizontal;
    let mut lower = 0.0;
    let mut upper = SEARCH_UPPER;

    loop {
        let p = (lower + upper) / 2.0;
        let th0 = implied_total(p, extraterrestrial, sin_elevation, diffuse(p));

        if (th0 - th).abs() <= TOLERANCE {
            return SearchOutcome::Converged(p);
        } else if lower >= TRANSMISSIVITY_MAX {
            return SearchOutcome::AboveCap;
        } else if upper <= TRANSMISSIVITY_MIN {
            return SearchOutcome::BelowMin;
        } else if p <= INTERVAL_FLOOR * 10.0 {
            return SearchOutcome::Collapsed;
        } else if (lower - upper).abs() <= INTERVAL_FLOOR {
            return SearchOutcome::Diverged;
        } else if th0 < th {
            lower = p;
        } else {
            upper = p;
        }
    }
}

/// Diffuse horizontal irradiance for an observed total, capped at the total.
///
/// Returns NaN when the search diverges.
pub fn solve_diffuse<F>(diffuse: F, total_horizontal: f64, sin_elevation: f64, extraterrestrial: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    let sh = match search_transmissivity(&diffuse, total_horizontal, sin_elevation, extraterrestrial) {
        SearchOutcome::Converged(p) if p >= TRANSMISSIVITY_MAX => diffuse(TRANSMISSIVITY_MAX),
        SearchOutcome::Converged(p) => diffuse(p),
        SearchOutcome::AboveCap => diffuse(TRANSMISSIVITY_MAX),
        SearchOutcome::BelowMin => diffuse(TRANSMISSIVITY_MIN),
        SearchOutcome::Collapsed => diffuse(0.0),
        SearchOutcome::Diverged => return f64::NAN,
    };
    min_propagating(sh, total_horizontal)
}
