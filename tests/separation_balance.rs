//! Cross-model checks of the irradiance separation.
//!
//! Every model must return non-negative components that add back up to the
//! total whenever the split is defined, and agree on the edge cases shared by
//! all of them.

use siteclimate::physics::psychrometrics::{dew_point, DEW_POINT_COLD_RANGE, DEW_POINT_WARM_RANGE};
use siteclimate::sim::separation::perez::{bin_index, CLEARNESS_THRESHOLDS};
use siteclimate::sim::separation::transmissivity::{
    implied_total, SearchOutcome, TransmissivityModel, TOLERANCE, TRANSMISSIVITY_MAX,
};
use siteclimate::sim::separation::{separate, SeparationModel};
use siteclimate::SolarPositionRecord;

macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr, $message:expr) => {
        let actual_val = $actual as f64;
        let expected_val = $expected as f64;
        let tolerance_val = $tolerance as f64;
        let diff = (actual_val - expected_val).abs();
        assert!(
            diff < tolerance_val,
            "{}: expected {:.6}, got {:.6}, diff {:.6}",
            $message, expected_val, actual_val, diff
        );
    };
}

fn record(elevation_deg: f64, extraterrestrial: f64) -> SolarPositionRecord {
    SolarPositionRecord {
        extraterrestrial,
        elevation: elevation_deg,
        sin_elevation: elevation_deg.to_radians().sin(),
        azimuth: 180.0,
    }
}

/// A morning-to-noon ramp under a mostly clear sky.
fn clear_morning() -> (Vec<f64>, Vec<SolarPositionRecord>, Vec<f64>) {
    let elevations = [8.0, 20.0, 33.0, 46.0, 58.0, 68.0];
    let irradiance = vec![0.15, 0.9, 1.7, 2.4, 2.9, 3.2];
    let solar = elevations.iter().map(|&h| record(h, 4.75)).collect();
    (irradiance, solar, vec![14.0; 6])
}

#[test]
fn test_every_model_balances() {
    let (irradiance, solar, dew) = clear_morning();

    for model in SeparationModel::ALL {
        let results = separate(&irradiance, &solar, &dew, 30.0, model).unwrap();
        assert_eq!(results.len(), irradiance.len(), "{} length", model);

        assert!(results.iter().any(|r| r.is_defined()), "{} left every hour undefined", model);

        for ((r, &th), s) in results.iter().zip(&irradiance).zip(&solar) {
            if !r.is_defined() {
                continue;
            }
            assert!(r.direct_normal >= 0.0, "{}: negative DN {}", model, r.direct_normal);
            assert!(r.diffuse_horizontal >= 0.0, "{}: negative SH {}", model, r.diffuse_horizontal);
            let rebuilt = r.direct_normal * s.sin_elevation + r.diffuse_horizontal;
            if (rebuilt - th).abs() < 1e-9 {
                continue;
            }
            // an overshoot only comes from a component floored at zero
            assert!(
                rebuilt > th && (r.diffuse_horizontal == 0.0 || r.direct_normal == 0.0),
                "{}: DN·sinh + SH = {} for TH {} (DN {}, SH {})",
                model,
                rebuilt,
                th,
                r.direct_normal,
                r.diffuse_horizontal
            );
        }
    }
}

#[test]
fn test_missing_total_is_undefined_for_every_model() {
    let solar = vec![record(40.0, 4.8); 3];
    let irradiance = [1.2, f64::NAN, 1.4];
    let dew = [12.0; 3];

    for model in SeparationModel::ALL {
        let results = separate(&irradiance, &solar, &dew, 0.0, model).unwrap();
        assert!(!results[1].is_defined(), "{} should leave a missing hour undefined", model);
        assert!(results[1].direct_normal.is_nan());
        assert!(results[1].diffuse_horizontal.is_nan());
    }
}

#[test]
fn test_sun_below_horizon() {
    let solar = [record(-5.0, 4.8)];
    for model in [SeparationModel::Nagata, SeparationModel::Watanabe] {
        let results = separate(&[0.0], &solar, &[10.0], 0.0, model).unwrap();
        assert_eq!(results[0].diffuse_horizontal, 0.0, "{} night SH", model);
        assert_eq!(results[0].direct_normal, 0.0, "{} night DN", model);
    }
}

const TRANSMISSIVITY_MODELS: [TransmissivityModel; 2] =
    [TransmissivityModel::Nagata, TransmissivityModel::Watanabe];

#[test]
fn test_bisection_clamps_at_upper_transmissivity() {
    let s = 0.5;
    let in0 = 4.8;

    for model in TRANSMISSIVITY_MODELS {
        let cap = model.diffuse(TRANSMISSIVITY_MAX, in0, s);

        // totals beyond the clear-sky bound fall back to the bound's diffuse part
        assert_eq!(model.search(4.0, s, in0), SearchOutcome::AboveCap, "{:?}", model);
        let beyond = model.diffuse_horizontal(4.0, s, in0);
        assert_approx_eq!(beyond, cap, 1e-12, format!("{:?} clamped diffuse for an over-bright hour", model));

        let exact = implied_total(0.9, in0, s, model.diffuse(0.9, in0, s));
        let at_bound = model.diffuse_horizontal(exact, s, in0);
        assert_approx_eq!(at_bound, cap, 1e-12, format!("{:?} clamped diffuse just past the bound", model));
    }
}

#[test]
fn test_bisection_recovers_diffuse() {
    let s = 0.7;
    let in0 = 4.8;
    for model in TRANSMISSIVITY_MODELS {
        for p in [0.3, 0.55, 0.75] {
            let sh = model.diffuse(p, in0, s);
            let th = implied_total(p, in0, s, sh);

            let solution = match model.search(th, s, in0) {
                SearchOutcome::Converged(solution) => solution,
                other => panic!("{:?}: P {} ended as {:?}", model, p, other),
            };
            let th0 = implied_total(solution, in0, s, model.diffuse(solution, in0, s));
            assert!((th0 - th).abs() <= TOLERANCE, "{:?}: TH0 {} for TH {}", model, th0, th);

            let solved = model.diffuse_horizontal(th, s, in0);
            assert_approx_eq!(solved, sh, 1e-4, format!("{:?} recovered diffuse", model));
        }
    }
}

#[test]
fn test_perez_clearness_bins() {
    assert_eq!(bin_index(0.1, &CLEARNESS_THRESHOLDS), 0);
    // a value equal to a threshold belongs to the next bin
    assert_eq!(bin_index(0.24, &CLEARNESS_THRESHOLDS), 1);
    assert_eq!(bin_index(0.79, &CLEARNESS_THRESHOLDS), 4);
    assert_eq!(bin_index(0.95, &CLEARNESS_THRESHOLDS), 5);
}

#[test]
fn test_dew_point_range_boundaries() {
    // the shared boundary uses the warm fit
    assert_approx_eq!(dew_point(*DEW_POINT_WARM_RANGE.start()), -0.0023, 1e-3, "dew point at 6.112 hPa");
    assert_approx_eq!(dew_point(*DEW_POINT_WARM_RANGE.end()), 49.996, 1e-2, "dew point at 123.5 hPa");
    assert_approx_eq!(dew_point(*DEW_POINT_COLD_RANGE.start()), -50.08, 1e-2, "dew point at 0.039 hPa");

    assert!(dew_point(0.03).is_nan());
    assert!(dew_point(124.0).is_nan());
    assert!(dew_point(f64::NAN).is_nan());
}
