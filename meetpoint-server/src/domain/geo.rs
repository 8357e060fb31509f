//! Coordinates and centroid aggregation.

use serde::{Deserialize, Serialize};

use super::error::InputError;

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Create a coordinate pair without validation.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a coordinate pair from nullable record columns.
    ///
    /// Returns `None` when either value is missing, zero, non-finite, or
    /// outside the valid latitude/longitude range. A zero component is how
    /// the record store encodes "location never entered", so it is treated
    /// the same as null.
    ///
    /// # Examples
    ///
    /// ```
    /// use meetpoint_server::domain::LatLng;
    ///
    /// assert!(LatLng::from_nullable(Some(35.68), Some(139.76)).is_some());
    /// assert!(LatLng::from_nullable(None, Some(139.76)).is_none());
    /// assert!(LatLng::from_nullable(Some(0.0), Some(139.76)).is_none());
    /// assert!(LatLng::from_nullable(Some(95.0), Some(139.76)).is_none());
    /// ```
    pub fn from_nullable(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        let (lat, lng) = (lat?, lng?);
        let usable = lat.is_finite()
            && lng.is_finite()
            && lat != 0.0
            && lng != 0.0
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        usable.then_some(Self { lat, lng })
    }
}

/// Compute the componentwise arithmetic mean of a set of points.
///
/// Fails with [`InputError::NoValidLocations`] for an empty slice.
pub fn centroid(points: &[LatLng]) -> Result<LatLng, InputError> {
    if points.is_empty() {
        return Err(InputError::NoValidLocations);
    }

    let n = points.len() as f64;
    let (lat_sum, lng_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));

    Ok(LatLng {
        lat: lat_sum / n,
        lng: lng_sum / n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_of_three_points() {
        let points = [
            LatLng::new(10.0, 10.0),
            LatLng::new(20.0, 20.0),
            LatLng::new(30.0, 30.0),
        ];
        let c = centroid(&points).unwrap();
        assert_eq!(c, LatLng::new(20.0, 20.0));
    }

    #[test]
    fn centroid_of_singleton_is_exact() {
        let p = LatLng::new(35.658_034, 139.701_636);
        assert_eq!(centroid(&[p]).unwrap(), p);
    }

    #[test]
    fn centroid_of_empty_fails() {
        assert_eq!(centroid(&[]), Err(InputError::NoValidLocations));
    }

    #[test]
    fn nullable_rejects_non_finite() {
        assert!(LatLng::from_nullable(Some(f64::NAN), Some(139.0)).is_none());
        assert!(LatLng::from_nullable(Some(35.0), Some(f64::INFINITY)).is_none());
    }

    #[test]
    fn nullable_rejects_zero_longitude() {
        assert!(LatLng::from_nullable(Some(35.0), Some(0.0)).is_none());
    }

    #[test]
    fn nullable_accepts_southern_and_western_hemispheres() {
        let p = LatLng::from_nullable(Some(-33.86), Some(-70.65)).unwrap();
        assert_eq!(p, LatLng::new(-33.86, -70.65));
    }
}
