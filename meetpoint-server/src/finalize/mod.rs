//! Event finalization: the pipeline, its errors and readiness reporting.

mod error;
mod guard;
mod pipeline;
mod readiness;

pub use error::FinalizeError;
pub use pipeline::{FinalizeReport, Finalizer, FinalizerConfig, Stage};
pub use readiness::Readiness;
