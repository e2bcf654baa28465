use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkjumpConfig {
    #[serde(default)]
    pub markers: MarkerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

/// How the requested key is compared against a marker's stored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMatching {
    /// Uppercase both sides before comparing.
    #[default]
    CaseInsensitive,
    /// Uppercase only the requested key; the stored key is compared verbatim.
    /// Marker producers that always emit uppercase keys rely on this.
    Legacy,
}

impl KeyMatching {
    pub fn matches(self, stored: &str, requested: &str) -> bool {
        let requested = requested.to_uppercase();
        match self {
            KeyMatching::CaseInsensitive => stored.to_uppercase() == requested,
            KeyMatching::Legacy => stored == requested,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Selector that finds every marker element in the document.
    #[serde(default = "default_marker_selector")]
    pub selector: String,
    #[serde(default = "default_key_attribute")]
    pub key_attribute: String,
    /// Attribute holding the selector of the element a marker points at.
    #[serde(default = "default_pointer_attribute")]
    pub pointer_attribute: String,
    #[serde(default)]
    pub key_matching: KeyMatching,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            selector: default_marker_selector(),
            key_attribute: default_key_attribute(),
            pointer_attribute: default_pointer_attribute(),
            key_matching: KeyMatching::default(),
        }
    }
}

fn default_marker_selector() -> String {
    ".marker".to_string()
}

fn default_key_attribute() -> String {
    "key".to_string()
}

fn default_pointer_attribute() -> String {
    "pointed-link".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Run the headless backend with a visible window.
    #[serde(default)]
    pub visible: bool,
    /// WebDriver endpoint used by the embedded backend when none is given
    /// on the command line.
    #[serde(default)]
    pub webdriver_url: Option<String>,
}
