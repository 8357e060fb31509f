//! Dining venue summaries.

use serde::{Deserialize, Serialize};

/// Name shown when no venue could be found.
pub const PLACEHOLDER_NAME: &str = "Restaurant not found";

/// Hint shown alongside the placeholder venue.
pub const PLACEHOLDER_HINT: &str = "Please search manually nearby.";

/// Price information as reported by the venue provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Human-readable price band, e.g. "3001～4000円"
    pub label: Option<String>,
    /// Provider's own average-spend text
    pub average: Option<String>,
}

/// A ranked venue near the chosen station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub address: String,
    pub genre: Option<String>,
    /// Provider detail page. HotPepper omits `urls.pc` for some shops, and
    /// the placeholder has none.
    pub link: Option<String>,
    pub photo: Option<String>,
    pub budget: Option<Budget>,
    /// Short promotional line
    pub tagline: Option<String>,
}

impl Venue {
    /// The "not found, search manually" entry.
    pub fn placeholder() -> Self {
        Self {
            name: PLACEHOLDER_NAME.to_string(),
            address: String::new(),
            genre: None,
            link: None,
            photo: None,
            budget: None,
            tagline: Some(PLACEHOLDER_HINT.to_string()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder()
    }
}
