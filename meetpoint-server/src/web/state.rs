//! Application state for the web layer.

use std::future::Future;
use std::sync::Arc;

use crate::finalize::{FinalizeError, FinalizeReport, Finalizer, Readiness};
use crate::providers::{PlaceSearch, RouteMatrix, VenueSearch};
use crate::store::EventStore;

/// The operations the HTTP surface exposes.
pub trait EventFinalizer: Send + Sync + 'static {
    fn finalize(
        &self,
        event_id: &str,
    ) -> impl Future<Output = Result<FinalizeReport, FinalizeError>> + Send;

    fn readiness(
        &self,
        event_id: &str,
    ) -> impl Future<Output = Result<Readiness, FinalizeError>> + Send;
}

impl<S, P, R, V> EventFinalizer for Finalizer<S, P, R, V>
where
    S: EventStore + 'static,
    P: PlaceSearch + 'static,
    R: RouteMatrix + 'static,
    V: VenueSearch + 'static,
{
    async fn finalize(&self, event_id: &str) -> Result<FinalizeReport, FinalizeError> {
        Finalizer::finalize(self, event_id).await
    }

    async fn readiness(&self, event_id: &str) -> Result<Readiness, FinalizeError> {
        Finalizer::readiness(self, event_id).await
    }
}

/// Shared application state.
pub struct AppState<F> {
    pub finalizer: Arc<F>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            finalizer: Arc::clone(&self.finalizer),
        }
    }
}

impl<F: EventFinalizer> AppState<F> {
    /// Create a new app state.
    pub fn new(finalizer: F) -> Self {
        Self {
            finalizer: Arc::new(finalizer),
        }
    }
}
