//! Acquisition Strategy Port - the Response-Acquisition Contract.
//!
//! Given a message, a strategy produces an [`Acquisition`]: an answer, a
//! designed "no answer in time" outcome, or a failure. Implementations never
//! return errors or panic across this boundary; [`AcquisitionStrategy::ask`]
//! flattens every outcome into the text relayed to the user.

use async_trait::async_trait;

use crate::domain::{Acquisition, BackendDescriptor};

#[async_trait]
pub trait AcquisitionStrategy: Send + Sync {
    /// The backend this strategy talks to.
    fn backend(&self) -> &BackendDescriptor;

    /// Asks the backend one question.
    async fn acquire(&self, message: &str) -> Acquisition;

    /// Asks and renders the outcome as user-facing text.
    async fn ask(&self, message: &str) -> String {
        let outcome = self.acquire(message).await;
        outcome.render(self.backend().label())
    }
}
