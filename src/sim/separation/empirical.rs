//! Clearness-index correlations (Erbs, Udagawa).
//!
//! Neither model checks the sun position: they are evaluated for any
//! positive total, with the clearness index capped at 1.

/// Clearness index `KT = TH / (IN0·sinh)`, uncapped.
pub fn clearness_index(total_horizontal: f64, extraterrestrial: f64, sin_elevation: f64) -> f64 {
    total_horizontal / (extraterrestrial * sin_elevation)
}

/// Clearness index capped at 1. NaN stays NaN.
fn capped_clearness(total_horizontal: f64, extraterrestrial: f64, sin_elevation: f64) -> f64 {
    let kt = clearness_index(total_horizontal, extraterrestrial, sin_elevation);
    if kt > 1.0 {
        1.0
    } else {
        kt
    }
}

/// Erbs diffuse fraction correlation.
///
/// # Returns
/// Diffuse horizontal irradiance (MJ/m²); 0 for a non-positive total
pub fn erbs_diffuse(total_horizontal: f64, extraterrestrial: f64, sin_elevation: f64) -> f64 {
    let th = total_horizontal;
    if th <= 0.0 {
        return 0.0;
    }
    let kt = capped_clearness(th, extraterrestrial, sin_elevation);

    if kt <= 0.22 {
        th * (1.0 - 0.09 * kt)
    } else if kt <= 0.80 {
        th * (0.9511 - 0.1604 * kt + 4.388 * kt.powi(2) - 16.638 * kt.powi(3) + 12.336 * kt.powi(4))
    } else {
        0.165 * th
    }
}

/// Udagawa direct-normal correlation.
///
/// The crossover between the cubic and the linear branch is compared against
/// the clearness index after scaling by `IN0·sinh`.
///
/// # Returns
/// Direct normal irradiance (MJ/m²), never negative; 0 for a non-positive total
pub fn udagawa_direct_normal(total_horizontal: f64, extraterrestrial: f64, sin_elevation: f64) -> f64 {
    let th = total_horizontal;
    if th <= 0.0 {
        return 0.0;
    }
    let s = sin_elevation;
    let crossover = (0.5163 + 0.333 * s + 0.00803 * s.powi(2)) * extraterrestrial * s;
    let kt = capped_clearness(th, extraterrestrial, s);

    let dn = if kt < crossover {
        extraterrestrial * (2.277 - 1.258 * s + 0.2396 * s.powi(2)) * kt.powi(3)
    } else {
        extraterrestrial * (-0.43 + 1.43 * kt)
    };
    if dn < 0.0 {
        0.0
    } else {
        dn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IN0: f64 = 4.9;

    #[test]
    fn test_erbs_branches() {
        let s = 0.5;
        // KT = 0.2, 0.5, 0.9
        for (kt, fraction) in [
            (0.2, 1.0 - 0.09 * 0.2),
            (0.5, 0.9511 - 0.1604 * 0.5 + 4.388 * 0.25 - 16.638 * 0.125 + 12.336 * 0.0625),
            (0.9, 0.165),
        ] {
            let th = kt * IN0 * s;
            let sh = erbs_diffuse(th, IN0, s);
            assert!((sh - th * fraction).abs() < 1e-12, "KT {}: SH {}", kt, sh);
        }
    }

    #[test]
    fn test_erbs_branch_boundaries_inclusive() {
        // IN0·sinh = 1 makes KT equal TH exactly
        let (in0, s) = (1.0, 1.0);

        let kt = clearness_index(0.22, in0, s);
        assert_eq!(kt, 0.22);
        assert_eq!(erbs_diffuse(0.22, in0, s), 0.22 * (1.0 - 0.09 * 0.22), "0.22 belongs to the linear branch");

        let kt = clearness_index(0.80, in0, s);
        assert_eq!(kt, 0.80);
        let quartic = 0.80 * (0.9511 - 0.1604 * kt + 4.388 * kt.powi(2) - 16.638 * kt.powi(3) + 12.336 * kt.powi(4));
        assert_eq!(erbs_diffuse(0.80, in0, s), quartic, "0.80 belongs to the quartic");
        assert!(quartic != 0.165 * 0.80);
    }

    #[test]
    fn test_erbs_caps_clearness() {
        // KT above 1 behaves like KT = 1
        let sh = erbs_diffuse(3.0, IN0, 0.1);
        assert!((sh - 0.165 * 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_erbs_non_positive_total() {
        assert_eq!(erbs_diffuse(0.0, IN0, 0.5), 0.0);
        assert_eq!(erbs_diffuse(-0.1, IN0, 0.5), 0.0);
        assert!(erbs_diffuse(f64::NAN, IN0, 0.5).is_nan());
    }

    #[test]
    fn test_udagawa_cubic_branch() {
        // Crossover at sinh = 0.5 is (0.5163 + 0.1665 + 0.0020075) * IN0 * 0.5,
        // far above any KT, so the cubic applies
        let s = 0.5;
        let th = 1.0;
        let kt = clearness_index(th, IN0, s);
        let expected = IN0 * (2.277 - 1.258 * s + 0.2396 * s * s) * kt.powi(3);
        assert!((udagawa_direct_normal(th, IN0, s) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_udagawa_linear_branch_at_low_sun() {
        // sinh = 0.05: crossover ≈ 0.131 < KT = 0.5
        let s = 0.05;
        let th = 0.5 * IN0 * s;
        let kt = clearness_index(th, IN0, s);
        let expected = IN0 * (-0.43 + 1.43 * kt);
        assert!((udagawa_direct_normal(th, IN0, s) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_udagawa_never_negative() {
        // Linear branch with KT below 0.43/1.43
        let s = 0.02;
        let th = 0.1 * IN0 * s;
        assert_eq!(udagawa_direct_normal(th, IN0, s), 0.0);
        assert_eq!(udagawa_direct_normal(0.0, IN0, s), 0.0);
    }
}
