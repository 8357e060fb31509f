//! Sparse travel-duration matrix.

use std::collections::BTreeMap;

/// Travel durations from participant origins to candidate destinations.
///
/// Keyed by `(origin_index, destination_index)`. A missing key means the
/// provider could not route that pair; it never means zero seconds.
/// Matrices are built per request and never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TravelTimeMatrix {
    entries: BTreeMap<(usize, usize), u64>,
}

impl TravelTimeMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a duration. A later insert for the same pair replaces the earlier one.
    pub fn insert(&mut self, origin: usize, destination: usize, seconds: u64) {
        self.entries.insert((origin, destination), seconds);
    }

    pub fn get(&self, origin: usize, destination: usize) -> Option<u64> {
        self.entries.get(&(origin, destination)).copied()
    }

    /// All recorded durations to one destination, in origin order.
    pub fn durations_to(&self, destination: usize) -> impl Iterator<Item = u64> + '_ {
        self.entries
            .iter()
            .filter(move |((_, d), _)| *d == destination)
            .map(|(_, secs)| *secs)
    }

    /// Worst-case duration to a destination, or `None` if nothing was recorded.
    pub fn max_to(&self, destination: usize) -> Option<u64> {
        self.durations_to(destination).max()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(usize, usize, u64)> for TravelTimeMatrix {
    fn from_iter<I: IntoIterator<Item = (usize, usize, u64)>>(iter: I) -> Self {
        let mut matrix = Self::new();
        for (origin, destination, seconds) in iter {
            matrix.insert(origin, destination, seconds);
        }
        matrix
    }
}
