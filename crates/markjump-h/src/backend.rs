use crate::cdp::CdpClient;
use crate::dom::{CdpDocument, with_timeout};
use async_trait::async_trait;
use markjump_engine::backend::{Backend, BackendError, DispatchError, NavigationResult};
use markjump_engine::dispatcher::MarkerDispatcher;
use markjump_engine::protocol::{DispatchOutcome, DispatchRequest};
use tracing::info;

pub struct HeadlessBackend {
    client: Option<CdpClient>,
    visible: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::new_with_visibility(false)
    }

    pub fn new_with_visibility(visible: bool) -> Self {
        Self {
            client: None,
            visible,
        }
    }

    pub fn get_client(&self) -> Option<&CdpClient> {
        self.client.as_ref()
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for HeadlessBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Launching Headless Backend (Chromium)...");
        let client = CdpClient::launch(self.visible)
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        let client = self.client.as_ref().ok_or(BackendError::NotReady)?;

        info!("Navigating to: {}", url);
        with_timeout("navigate", async {
            client
                .page
                .goto(url)
                .await
                .map_err(|e| BackendError::Navigation(e.to_string()))
        })
        .await?;

        let title = client
            .page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = client
            .page
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult { url, title })
    }

    async fn dispatch(
        &mut self,
        dispatcher: &MarkerDispatcher,
        request: &DispatchRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        let client = self.client.as_ref().ok_or(BackendError::NotReady)?;
        let document = CdpDocument::new(client);
        dispatcher.dispatch(&document, &document, request).await
    }
}
