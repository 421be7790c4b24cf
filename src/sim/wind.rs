//! Wind resolver.
//!
//! Converts the east-west (`u`) and north-south (`v`) wind components into a
//! speed and a 16-point compass direction. The reported speed is the
//! component of the wind vector along the snapped direction, so it never
//! exceeds the vector magnitude.

use crate::weather::TargetSeries;

/// Width of one 16-point compass sector (degrees).
pub const COMPASS_SECTOR: f64 = 22.5;

/// Resolves one wind vector.
///
/// # Arguments
/// * `u` - Eastward wind component (m/s)
/// * `v` - Northward wind component (m/s)
///
/// # Returns
/// `(speed16, direction16)`: the speed projected on the snapped direction
/// (m/s) and the direction the wind blows from, a multiple of 22.5° in
/// `[0, 360]`. Calm air (`u = v = 0`) resolves to `(0.0, 180.0)`.
pub fn resolve(u: f64, v: f64) -> (f64, f64) {
    let speed = (u.powi(2) + v.powi(2)).sqrt();
    let direction = (u.atan2(v) + std::f64::consts::PI).to_degrees();

    let direction16 = (direction / COMPASS_SECTOR).round() * COMPASS_SECTOR;
    let gap = (direction16 - direction).abs();
    (gap.to_radians().cos() * speed, direction16)
}

/// Fills `wind_speed` and `wind_direction` from the interpolated components.
pub fn resolve_series(series: &mut TargetSeries) {
    let (speed, direction): (Vec<f64>, Vec<f64>) = series
        .wind_u
        .iter()
        .zip(&series.wind_v)
        .map(|(&u, &v)| resolve(u, v))
        .unzip();
    series.wind_speed = speed;
    series.wind_direction = direction;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calm_air() {
        let (speed, direction) = resolve(0.0, 0.0);
        assert_eq!(speed, 0.0);
        assert_eq!(direction, 180.0);
    }

    #[test]
    fn test_cardinal_directions() {
        // Direction is where the wind blows from; north comes out as 360
        let cases = [
            (0.0, -3.0, 360.0), // northerly
            (-3.0, 0.0, 90.0),  // easterly
            (0.0, 3.0, 180.0),  // southerly
            (3.0, 0.0, 270.0),  // westerly
        ];
        for (u, v, expected) in cases {
            let (speed, direction) = resolve(u, v);
            assert!((direction - expected).abs() < 1e-9, "({}, {}) -> {}", u, v, direction);
            assert!((speed - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_speed_projected_on_snapped_direction() {
        // Blowing from 190°, 10° off the 180° sector
        let raw = 5.0;
        let angle = 10.0f64.to_radians();
        let (u, v) = (raw * angle.sin(), raw * angle.cos());
        let (speed, direction) = resolve(u, v);
        assert!((direction - 180.0).abs() < 1e-9, "direction {}", direction);
        assert!((speed - raw * 10.0f64.to_radians().cos()).abs() < 1e-9);
    }

    #[test]
    fn test_projection_bounds() {
        for i in -10..=10 {
            for j in -10..=10 {
                let (u, v) = (i as f64 * 0.7, j as f64 * 1.3);
                let raw = (u * u + v * v).sqrt();
                let (speed, direction) = resolve(u, v);
                assert!(speed <= raw + 1e-12, "speed {} > raw {}", speed, raw);
                assert!(speed >= 0.0);
                let sectors = direction / COMPASS_SECTOR;
                assert!((sectors - sectors.round()).abs() < 1e-12, "direction {}", direction);
                assert!((0.0..=360.0).contains(&direction));
            }
        }
    }

    #[test]
    fn test_resolve_series() {
        let mut series = TargetSeries {
            wind_u: vec![0.0, 3.0],
            wind_v: vec![0.0, 0.0],
            ..Default::default()
        };
        resolve_series(&mut series);
        assert_eq!(series.wind_direction, vec![180.0, 270.0]);
        assert_eq!(series.wind_speed.len(), 2);
    }
}
