use crate::dispatcher::MarkerDispatcher;
use async_trait::async_trait;
pub use markjump_common::error::{BackendError, DispatchError};
use markjump_common::protocol::{DispatchOutcome, DispatchRequest};

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

/// A browser that can load pages and run marker dispatches against the
/// currently loaded page.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend (start browser, connect to a driver, etc.)
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the backend and cleanup resources.
    async fn close(&mut self) -> Result<(), BackendError>;

    async fn is_ready(&self) -> bool;

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    /// Resolve `request.key` in the current page and perform its activation.
    async fn dispatch(
        &mut self,
        dispatcher: &MarkerDispatcher,
        request: &DispatchRequest,
    ) -> Result<DispatchOutcome, DispatchError>;
}
