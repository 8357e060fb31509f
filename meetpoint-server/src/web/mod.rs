//! Web layer for event finalization.
//!
//! Provides the finalize and readiness endpoints over any [`EventFinalizer`].

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, EventFinalizer};
