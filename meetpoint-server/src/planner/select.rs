//! Minimax station selection.
//!
//! Each candidate is scored by its worst recorded travel time, i.e. the
//! participant who has the longest trip to it. The candidate with the
//! smallest worst case wins. This favors the least-advantaged participant
//! over the group average.

use crate::domain::{CandidateStation, Candidates, TravelTimeMatrix};

/// The chosen station and why it was chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index of the chosen station in the candidate list.
    pub index: usize,
    pub station: CandidateStation,
    /// Longest recorded trip to the chosen station; `None` when no candidate
    /// had any matrix data and the first candidate was taken by default.
    pub worst_case_secs: Option<u64>,
}

/// Pick the candidate with the smallest worst-case travel time.
///
/// Candidates with no recorded duration are skipped. Ties go to the
/// earliest candidate in list order. If no candidate has any data, the
/// first candidate is returned. Always returns a member of `stations`.
pub fn select_station(stations: &Candidates, matrix: &TravelTimeMatrix) -> Selection {
    let mut best: Option<(usize, u64)> = None;

    for (index, _) in stations.iter().enumerate() {
        let Some(worst) = matrix.max_to(index) else {
            continue;
        };
        if best.is_none_or(|(_, best_worst)| worst < best_worst) {
            best = Some((index, worst));
        }
    }

    match best {
        Some((index, worst)) => Selection {
            index,
            station: stations.get(index).unwrap_or(stations.first()).clone(),
            worst_case_secs: Some(worst),
        },
        None => Selection {
            index: 0,
            station: stations.first().clone(),
            worst_case_secs: None,
        },
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::LatLng;
    use proptest::prelude::*;

    fn scenario() -> impl Strategy<Value = (Candidates, TravelTimeMatrix)> {
        (1usize..6, 1usize..5).prop_flat_map(|(n_stations, n_origins)| {
            let cells = prop::collection::vec(prop::option::of(1u64..10_000), n_stations * n_origins);
            cells.prop_map(move |cells| {
                let stations = Candidates::new(
                    (0..n_stations)
                        .map(|i| CandidateStation::new(format!("S{i}"), LatLng::new(35.0, 139.0 + i as f64)))
                        .collect(),
                )
                .unwrap();
                let matrix: TravelTimeMatrix = cells
                    .iter()
                    .enumerate()
                    .filter_map(|(k, secs)| secs.map(|s| (k % n_origins, k / n_origins, s)))
                    .collect();
                (stations, matrix)
            })
        })
    }

    proptest! {
        /// The selection is always drawn from the input candidates
        #[test]
        fn selection_is_member((stations, matrix) in scenario()) {
            let sel = select_station(&stations, &matrix);
            prop_assert_eq!(stations.get(sel.index), Some(&sel.station));
        }

        /// A data-less candidate is chosen only when every candidate lacks data
        #[test]
        fn dataless_only_when_all_dataless((stations, matrix) in scenario()) {
            let sel = select_station(&stations, &matrix);
            if matrix.max_to(sel.index).is_none() {
                prop_assert!((0..stations.len()).all(|i| matrix.max_to(i).is_none()));
                prop_assert_eq!(sel.index, 0);
            }
        }

        /// No candidate with data has a strictly smaller worst case
        #[test]
        fn selection_is_minimax((stations, matrix) in scenario()) {
            let sel = select_station(&stations, &matrix);
            if let Some(chosen) = sel.worst_case_secs {
                for i in 0..stations.len() {
                    if let Some(w) = matrix.max_to(i) {
                        prop_assert!(w >= chosen);
                        if w == chosen {
                            prop_assert!(i >= sel.index);
                        }
                    }
                }
            }
        }
    }
}
