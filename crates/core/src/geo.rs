//! Geo

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kilometres per degree, the flat approximation used for delivery distances.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Errors raised when constructing a [`GeoPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoPointError {
    /// Latitude is not a finite value within `-90..=90`.
    #[error("latitude {0} is out of range")]
    Latitude(f64),

    /// Longitude is not a finite value within `-180..=180`.
    #[error("longitude {0} is out of range")]
    Longitude(f64),
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting non-finite or out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns a [`GeoPointError`] naming the offending coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoPointError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoPointError::Latitude(latitude));
        }

        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoPointError::Longitude(longitude));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Planar distance in degrees scaled to kilometres.
    ///
    /// A degree of longitude counts the same as a degree of latitude.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = self.latitude - other.latitude;
        let d_lon = self.longitude - other.longitude;

        d_lat.hypot(d_lon) * KM_PER_DEGREE
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_rejects_out_of_range_latitude() {
        assert_eq!(GeoPoint::new(91.0, 0.0), Err(GeoPointError::Latitude(91.0)));
    }

    #[test]
    fn test_rejects_non_finite_longitude() {
        assert!(matches!(
            GeoPoint::new(0.0, f64::NAN),
            Err(GeoPointError::Longitude(_))
        ));
    }

    #[test]
    fn test_distance_uses_degree_approximation() -> TestResult {
        let a = GeoPoint::new(-26.0, 28.0)?;
        let b = GeoPoint::new(-26.0, 28.1)?;

        let distance = a.distance_km(&b);

        assert!((distance - 11.1).abs() < 1e-9, "got {distance}");

        Ok(())
    }

    #[test]
    fn test_distance_to_self_is_zero() -> TestResult {
        let a = GeoPoint::new(-33.9, 18.4)?;

        assert!(a.distance_km(&a).abs() < f64::EPSILON);

        Ok(())
    }
}
