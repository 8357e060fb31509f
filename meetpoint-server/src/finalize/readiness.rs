//! Whether an event has gathered enough responses to finalize.

use serde::{Deserialize, Serialize};

/// Response progress of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    /// Participants on record, organizer included
    pub responded: usize,
    /// Expected head count, if the organizer set one
    pub expected: Option<u32>,
    pub finalized: bool,
    /// Everyone expected has responded and nothing is confirmed yet
    pub ready: bool,
}

impl Readiness {
    pub fn new(responded: usize, expected: Option<u32>, finalized: bool) -> Self {
        let ready = !finalized && expected.is_some_and(|e| responded >= e as usize);
        Self {
            responded,
            expected,
            finalized,
            ready,
        }
    }
}
