//! Domain types for event finalization.
//!
//! These are request-scoped values: they are rebuilt from the record store
//! on every finalization run. Types that carry an invariant (a non-empty
//! candidate list, a usable coordinate pair) enforce it at construction.

mod error;
mod finalization;
mod geo;
mod instant;
mod matrix;
mod outcome;
mod participant;
mod station;
mod venue;

pub use error::InputError;
pub use finalization::FinalizationResult;
pub use geo::{LatLng, centroid};
pub use instant::{InstantError, normalize_instant};
pub use matrix::TravelTimeMatrix;
pub use outcome::Outcome;
pub use participant::{EventId, Participant, ParticipantId, valid_locations};
pub use station::{CandidateStation, Candidates, MIDDLE_POINT_NAME};
pub use venue::{Budget, PLACEHOLDER_HINT, PLACEHOLDER_NAME, Venue};
