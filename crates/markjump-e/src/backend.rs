use crate::dom::WebDriverDocument;
use crate::webdriver::{WebDriverClient, headless_capabilities};
use async_trait::async_trait;
use markjump_engine::backend::{Backend, BackendError, DispatchError, NavigationResult};
use markjump_engine::dispatcher::MarkerDispatcher;
use markjump_engine::protocol::{DispatchOutcome, DispatchRequest};
use tracing::info;

/// Drives a browser through an already running WebDriver server
/// (chromedriver, geckodriver, WPEWebDriver, ...).
pub struct EmbeddedBackend {
    client: Option<WebDriverClient>,
    webdriver_url: String,
    headless: bool,
}

impl EmbeddedBackend {
    pub fn with_url(webdriver_url: impl Into<String>) -> Self {
        Self {
            client: None,
            webdriver_url: webdriver_url.into(),
            headless: false,
        }
    }

    /// Ask the driver for a headless session. Useful for CI.
    pub fn headless(mut self) -> Self {
        self.headless = true;
        self
    }

    pub fn get_client(&self) -> Option<&WebDriverClient> {
        self.client.as_ref()
    }
}

#[async_trait]
impl Backend for EmbeddedBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Connecting to WebDriver at {}...", self.webdriver_url);
        let capabilities = self.headless.then(headless_capabilities);
        let client = WebDriverClient::connect(&self.webdriver_url, capabilities)
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
        let client = &self.client.as_ref().ok_or(BackendError::NotReady)?.client;

        info!("Navigating to: {}", url);
        client
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;

        let title = client.title().await.unwrap_or_default();
        let url = client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_default();
        Ok(NavigationResult { url, title })
    }

    async fn dispatch(
        &mut self,
        dispatcher: &MarkerDispatcher,
        request: &DispatchRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        let client = &self.client.as_ref().ok_or(BackendError::NotReady)?.client;
        let document = WebDriverDocument::new(client);
        dispatcher.dispatch(&document, &document, request).await
    }
}
