//! Ownership of a `finalizing` claim between claim and commit.

use std::sync::Arc;

use tracing::{error, warn};

use crate::store::{Claim, EventStore};

/// Holds a claim until it is committed or released.
///
/// Dropping an armed guard, as happens when the finalize future is
/// cancelled, releases the claim on a spawned task.
pub(crate) struct ClaimGuard<S: EventStore + 'static> {
    store: Arc<S>,
    claim: Claim,
    armed: bool,
}

impl<S: EventStore + 'static> ClaimGuard<S> {
    pub(crate) fn new(store: Arc<S>, claim: Claim) -> Self {
        Self {
            store,
            claim,
            armed: true,
        }
    }

    pub(crate) fn claim(&self) -> &Claim {
        &self.claim
    }

    /// The claim was committed; nothing to release.
    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }

    /// Release the claim now.
    pub(crate) async fn release(mut self) {
        if let Err(e) = self.store.release(&self.claim).await {
            error!(event_id = %self.claim.event, error = %e, "failed to release claim");
        }
        self.armed = false;
    }
}

impl<S: EventStore + 'static> Drop for ClaimGuard<S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!(event_id = %self.claim.event, "no runtime to release abandoned claim");
            return;
        };

        warn!(event_id = %self.claim.event, "finalization abandoned, releasing claim");
        let store = Arc::clone(&self.store);
        let claim = self.claim.clone();
        runtime.spawn(async move {
            if let Err(e) = store.release(&claim).await {
                error!(event_id = %claim.event, error = %e, "failed to release abandoned claim");
            }
        });
    }
}
