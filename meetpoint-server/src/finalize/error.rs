//! Errors that abort finalization.

use crate::config::ConfigError;
use crate::domain::InputError;
use crate::store::StoreError;

/// A fatal finalization failure.
///
/// Provider failures never appear here: they are absorbed into each
/// stage's fallback. Every variant means nothing was committed.
#[derive(Debug, thiserror::Error)]
pub enum FinalizeError {
    /// Provider credentials are not configured
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The request or the event's data cannot be finalized
    #[error(transparent)]
    Input(#[from] InputError),

    /// Another finalization of the same event is in progress
    #[error("event {0} is already being finalized")]
    Conflict(String),

    /// Reading the event or its participants failed
    #[error("failed to read event records: {0}")]
    RecordStore(StoreError),

    /// Writing the result failed; the event keeps its previous state
    #[error("failed to save result: {0}")]
    Persistence(StoreError),
}

impl FinalizeError {
    /// Stable machine-readable category.
    pub fn kind(&self) -> &'static str {
        match self {
            FinalizeError::Configuration(_) => "configuration",
            FinalizeError::Input(_) => "input",
            FinalizeError::Conflict(_) => "conflict",
            FinalizeError::RecordStore(_) => "record_store",
            FinalizeError::Persistence(_) => "persistence",
        }
    }

    /// Map a failed status transition, keeping conflicts distinct.
    pub(crate) fn from_write(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(id) => FinalizeError::Conflict(id),
            other => FinalizeError::Persistence(other),
        }
    }
}
