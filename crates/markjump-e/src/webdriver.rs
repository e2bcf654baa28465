use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};

pub struct WebDriverClient {
    pub client: Client,
}

/// Capabilities asking Chrome and Firefox drivers for a headless session.
pub fn headless_capabilities() -> Map<String, Value> {
    let mut caps = Map::new();
    caps.insert(
        "goog:chromeOptions".into(),
        json!({ "args": ["--headless=new", "--no-sandbox"] }),
    );
    caps.insert("moz:firefoxOptions".into(), json!({ "args": ["-headless"] }));
    caps
}

impl WebDriverClient {
    pub async fn connect(
        url: &str,
        capabilities: Option<Map<String, Value>>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let client = ClientBuilder::native()
            .capabilities(capabilities.unwrap_or_default())
            .connect(url)
            .await
            .map_err(|e| format!("Failed to connect to WebDriver at {}: {}", url, e))?;

        Ok(Self { client })
    }

    pub async fn close(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.client
            .close()
            .await
            .map_err(|e| format!("Failed to close session: {}", e))?;
        Ok(())
    }
}
