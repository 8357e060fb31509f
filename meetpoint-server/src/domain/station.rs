//! Candidate transit hubs.

use serde::{Deserialize, Serialize};

use super::geo::LatLng;

/// Name given to the synthetic candidate placed at the centroid.
pub const MIDDLE_POINT_NAME: &str = "Middle Point";

/// A transit hub that could host the meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateStation {
    pub name: String,
    pub location: LatLng,
}

impl CandidateStation {
    pub fn new(name: impl Into<String>, location: LatLng) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }

    /// The synthetic candidate used when no real hub is known.
    pub fn middle_point(centroid: LatLng) -> Self {
        Self::new(MIDDLE_POINT_NAME, centroid)
    }
}

/// A non-empty, ordered list of candidate stations.
///
/// Order is meaningful: it is the provider's popularity ranking and the
/// tie-break order for station selection.
///
/// # Examples
///
/// ```
/// use meetpoint_server::domain::{CandidateStation, Candidates, LatLng};
///
/// assert!(Candidates::new(vec![]).is_none());
///
/// let only = CandidateStation::new("Shinagawa", LatLng::new(35.62, 139.74));
/// let set = Candidates::new(vec![only.clone()]).unwrap();
/// assert_eq!(set.first(), &only);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Candidates(Vec<CandidateStation>);

impl Candidates {
    /// Wrap a list of candidates, returning `None` if it is empty.
    pub fn new(stations: Vec<CandidateStation>) -> Option<Self> {
        (!stations.is_empty()).then_some(Self(stations))
    }

    /// A single synthetic candidate at the centroid.
    pub fn fallback(centroid: LatLng) -> Self {
        Self(vec![CandidateStation::middle_point(centroid)])
    }

    pub fn first(&self) -> &CandidateStation {
        // Non-empty by construction
        &self.0[0]
    }

    pub fn get(&self, index: usize) -> Option<&CandidateStation> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateStation> {
        self.0.iter()
    }

    /// Candidate coordinates in order, for use as matrix destinations.
    pub fn locations(&self) -> Vec<LatLng> {
        self.0.iter().map(|s| s.location).collect()
    }
}

impl<'a> IntoIterator for &'a Candidates {
    type Item = &'a CandidateStation;
    type IntoIter = std::slice::Iter<'a, CandidateStation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
