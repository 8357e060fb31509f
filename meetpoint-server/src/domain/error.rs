//! Domain error types.
//!
//! These errors represent unusable caller input. They abort finalization
//! before any provider is contacted and are distinct from provider or
//! record-store failures.

/// Input that makes finalization impossible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The request did not name an event
    #[error("Event ID is required")]
    MissingEventId,

    /// The record store has no event with this identifier
    #[error("event {0} not found")]
    UnknownEvent(String),

    /// The event has no participants at all
    #[error("No users found")]
    NoParticipants,

    /// No participant supplied a usable coordinate pair
    #[error("No valid user locations")]
    NoValidLocations,
}
