//! Mesoscale grid geometry and reference elevations.
//!
//! The weather grid is regular in latitude and longitude. A site is served by
//! the four grid points of the cell that encloses it; their series are blended
//! with inverse-distance weights after each has been corrected to the site
//! elevation.

use crate::error::{ClimateError, Result};
use crate::weather::Quadrant;

/// Grid spacing in latitude (degrees).
pub const LATITUDE_STEP: f64 = 0.05;

/// Grid spacing in longitude (degrees).
pub const LONGITUDE_STEP: f64 = 0.0625;

/// Mean Earth radius (m).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Distance below which the site is considered to sit on a grid point (m).
const COINCIDENT_DISTANCE_M: f64 = 1e-3;

/// Guards `floor` against quotients such as 712.9999999 for a site on a grid line.
const INDEX_EPSILON: f64 = 1e-9;

/// Grid cell identified by the indices of its south-west corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub south_index: i64,
    pub west_index: i64,
}

impl GridCell {
    /// Returns the cell whose south-west corner is the nearest grid point at or
    /// below and at or left of the site.
    pub fn enclosing(latitude: f64, longitude: f64) -> Self {
        GridCell {
            south_index: (latitude / LATITUDE_STEP + INDEX_EPSILON).floor() as i64,
            west_index: (longitude / LONGITUDE_STEP + INDEX_EPSILON).floor() as i64,
        }
    }

    /// Corner coordinates as `(latitude, longitude)` pairs.
    pub fn corners(&self) -> Quadrant<(f64, f64)> {
        let south = self.south_index as f64 * LATITUDE_STEP;
        let north = (self.south_index + 1) as f64 * LATITUDE_STEP;
        let west = self.west_index as f64 * LONGITUDE_STEP;
        let east = (self.west_index + 1) as f64 * LONGITUDE_STEP;
        Quadrant::new((south, west), (south, east), (north, west), (north, east))
    }

    /// Inverse-distance interpolation weights for a site inside the cell.
    ///
    /// Weights are normalised to sum to one. A site that coincides with a grid
    /// point takes that point's series unchanged.
    pub fn weights(&self, latitude: f64, longitude: f64) -> Quadrant<f64> {
        let distances = self
            .corners()
            .map(|(lat, lon)| great_circle_distance(latitude, longitude, lat, lon));

        if let Some((corner, _)) = distances
            .iter()
            .find(|(_, d)| **d < COINCIDENT_DISTANCE_M)
        {
            let mut weights = Quadrant::default();
            *weights.get_mut(corner) = 1.0;
            return weights;
        }

        let inverse = distances.map(|d| 1.0 / d);
        let total = inverse.sum();
        inverse.map(|w| w / total)
    }

    /// Resolves the reference elevation of every corner.
    ///
    /// # Errors
    ///
    /// [`ClimateError::MissingElevation`] for the first corner the lookup
    /// cannot answer.
    pub fn corner_elevations<L: ElevationLookup + ?Sized>(
        &self,
        lookup: &L,
    ) -> Result<Quadrant<f64>> {
        self.corners()
            .try_map(|_, (lat, lon)| resolve_elevation(lookup, lat, lon))
    }
}

/// Great-circle distance between two points (haversine, metres).
pub fn great_circle_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

/// Source of terrain elevations.
///
/// Implemented by whatever reference dataset or service backs the run. A
/// `None` answer for a point the pipeline needs aborts the run.
pub trait ElevationLookup {
    /// Elevation above sea level (m) at the given point, if known.
    fn elevation(&self, latitude: f64, longitude: f64) -> Option<f64>;
}

/// Terrain at one constant elevation everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatTerrain(pub f64);

impl ElevationLookup for FlatTerrain {
    fn elevation(&self, _latitude: f64, _longitude: f64) -> Option<f64> {
        Some(self.0)
    }
}

/// Point elevations matched within a coordinate tolerance.
#[derive(Debug, Clone, Default)]
pub struct ElevationTable {
    points: Vec<(f64, f64, f64)>,
    tolerance_deg: f64,
}

impl ElevationTable {
    /// Creates an empty table matching points within `tolerance_deg` degrees.
    pub fn new(tolerance_deg: f64) -> Self {
        ElevationTable {
            points: Vec::new(),
            tolerance_deg,
        }
    }

    /// Adds a point and returns the table for chaining.
    pub fn with_point(mut self, latitude: f64, longitude: f64, elevation: f64) -> Self {
        self.insert(latitude, longitude, elevation);
        self
    }

    pub fn insert(&mut self, latitude: f64, longitude: f64, elevation: f64) {
        self.points.push((latitude, longitude, elevation));
    }
}

impl ElevationLookup for ElevationTable {
    fn elevation(&self, latitude: f64, longitude: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|(lat, lon, _)| {
                (lat - latitude).abs() <= self.tolerance_deg
                    && (lon - longitude).abs() <= self.tolerance_deg
            })
            .map(|&(_, _, elevation)| elevation)
    }
}

/// Looks up one elevation, turning an unknown point into an error.
pub fn resolve_elevation<L: ElevationLookup + ?Sized>(
    lookup: &L,
    latitude: f64,
    longitude: f64,
) -> Result<f64> {
    lookup
        .elevation(latitude, longitude)
        .filter(|e| e.is_finite())
        .ok_or(ClimateError::MissingElevation {
            latitude,
            longitude,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::Corner;

    #[test]
    fn test_enclosing_cell_contains_site() {
        let (lat, lon) = (35.658, 139.741);
        let cell = GridCell::enclosing(lat, lon);
        let corners = cell.corners();

        let (s, w) = corners.south_west;
        let (n, e) = corners.north_east;
        assert!(s <= lat && lat < n, "latitude {} outside [{}, {})", lat, s, n);
        assert!(w <= lon && lon < e, "longitude {} outside [{}, {})", lon, w, e);
        assert!((n - s - LATITUDE_STEP).abs() < 1e-12);
        assert!((e - w - LONGITUDE_STEP).abs() < 1e-12);
    }

    #[test]
    fn test_enclosing_cell_on_grid_line() {
        // 35.65 / 0.05 is not exactly 713 in binary floating point
        let cell = GridCell::enclosing(35.65, 139.75);
        assert_eq!(cell.south_index, 713);
        assert_eq!(cell.west_index, 2236);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let (lat, lon) = (35.658, 139.741);
        let weights = GridCell::enclosing(lat, lon).weights(lat, lon);
        assert!((weights.sum() - 1.0).abs() < 1e-12);
        for (_, w) in weights.iter() {
            assert!(*w > 0.0 && *w < 1.0);
        }
    }

    #[test]
    fn test_weights_favour_nearest_corner() {
        let cell = GridCell::enclosing(35.651, 139.7505);
        let weights = cell.weights(35.651, 139.7505);
        let (nearest, _) = weights
            .iter()
            .fold((Corner::NorthEast, f64::MIN), |acc, (c, w)| {
                if *w > acc.1 {
                    (c, *w)
                } else {
                    acc
                }
            });
        assert_eq!(nearest, Corner::SouthWest);
    }

    #[test]
    fn test_weights_centre_of_cell_are_balanced() {
        let cell = GridCell::enclosing(35.66, 139.76);
        let corners = cell.corners();
        let lat = (corners.south_west.0 + corners.north_west.0) / 2.0;
        let lon = (corners.south_west.1 + corners.south_east.1) / 2.0;
        let weights = cell.weights(lat, lon);
        for (_, w) in weights.iter() {
            assert!((w - 0.25).abs() < 1e-3, "weight {} far from 0.25", w);
        }
    }

    #[test]
    fn test_weights_on_grid_point() {
        let cell = GridCell::enclosing(35.65, 139.75);
        let (lat, lon) = cell.corners().south_west;
        let weights = cell.weights(lat, lon);
        assert_eq!(weights.into_array(), [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_great_circle_distance_one_degree_latitude() {
        let d = great_circle_distance(35.0, 139.0, 36.0, 139.0);
        assert!((d - 111_195.0).abs() < 50.0, "distance {} m", d);
    }

    #[test]
    fn test_corner_elevations_from_table() {
        let cell = GridCell::enclosing(35.658, 139.741);
        let mut table = ElevationTable::new(1e-6);
        for ((_, &(lat, lon)), elevation) in cell.corners().iter().zip([10.0, 20.0, 30.0, 40.0]) {
            table.insert(lat, lon, elevation);
        }
        let elevations = cell.corner_elevations(&table).unwrap();
        assert_eq!(elevations.into_array(), [10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_missing_elevation_is_error() {
        let cell = GridCell::enclosing(35.658, 139.741);
        let table = ElevationTable::new(1e-6).with_point(0.0, 0.0, 5.0);
        assert!(matches!(
            cell.corner_elevations(&table),
            Err(ClimateError::MissingElevation { .. })
        ));
    }

    #[test]
    fn test_flat_terrain() {
        assert_eq!(resolve_elevation(&FlatTerrain(42.0), 1.0, 2.0).unwrap(), 42.0);
        assert!(resolve_elevation(&FlatTerrain(f64::NAN), 1.0, 2.0).is_err());
    }
}
