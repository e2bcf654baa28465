//! DOM capabilities over a W3C WebDriver session.

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, Locator};
use markjump_engine::dom::{BrowsingContext, Document, ElementHandle};
use markjump_engine::error::BackendError;
use serde_json::Value;

const SUBMIT_SCRIPT: &str = r#"
    const el = arguments[0];
    if (el.form) {
        el.form.requestSubmit(el);
    } else if (typeof el.submit === 'function') {
        el.submit();
    } else {
        throw new Error('element has no associated form');
    }
"#;

fn map_cmd_error(err: CmdError) -> BackendError {
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("stale element") || lower.contains("no such window") {
        BackendError::ElementStale
    } else if lower.contains("invalid session") {
        BackendError::ConnectionLost
    } else {
        BackendError::ScriptError(message)
    }
}

pub struct WebDriverDocument<'a> {
    client: &'a Client,
}

impl<'a> WebDriverDocument<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<'a> Document for WebDriverDocument<'a> {
    type Element = WebDriverElement;

    async fn query_all(&self, selector: &str) -> Result<Vec<WebDriverElement>, BackendError> {
        let elements = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| {
                if e.to_string().to_lowercase().contains("invalid selector") {
                    BackendError::SelectorInvalid {
                        selector: selector.to_string(),
                    }
                } else {
                    map_cmd_error(e)
                }
            })?;
        Ok(elements
            .into_iter()
            .map(|element| WebDriverElement {
                client: self.client.clone(),
                element,
            })
            .collect())
    }
}

#[async_trait]
impl<'a> BrowsingContext for WebDriverDocument<'a> {
    /// Opens a tab at `url`; the previously current window stays current.
    async fn open_in_new_context(&self, url: &str) -> Result<(), BackendError> {
        let original = self.client.window().await.map_err(map_cmd_error)?;
        let created = self
            .client
            .new_window(true)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;
        self.client
            .switch_to_window(created.handle)
            .await
            .map_err(map_cmd_error)?;
        let navigated = self
            .client
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()));
        self.client
            .switch_to_window(original)
            .await
            .map_err(map_cmd_error)?;
        navigated
    }

    async fn replace_location(&self, url: &str) -> Result<(), BackendError> {
        tracing::info!("Navigating to: {}", url);
        self.client
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))
    }
}

pub struct WebDriverElement {
    client: Client,
    element: Element,
}

impl WebDriverElement {
    /// Run `script` with the element bound to `arguments[0]` and any
    /// `extra` values following it.
    async fn run_with(&self, script: &str, extra: Vec<Value>) -> Result<Value, BackendError> {
        let mut args = vec![serde_json::to_value(&self.element)?];
        args.extend(extra);
        self.client
            .execute(script, args)
            .await
            .map_err(map_cmd_error)
    }

    async fn run(&self, script: &str) -> Result<Value, BackendError> {
        self.run_with(script, Vec::new()).await
    }
}

#[async_trait]
impl ElementHandle for WebDriverElement {
    async fn tag_name(&self) -> Result<String, BackendError> {
        let tag = self.element.tag_name().await.map_err(map_cmd_error)?;
        Ok(tag.to_ascii_lowercase())
    }

    /// Raw markup value, not the reflected property.
    async fn attribute(&self, name: &str) -> Result<Option<String>, BackendError> {
        let value = self
            .run_with(
                "return arguments[0].getAttribute(arguments[1]);",
                vec![Value::from(name)],
            )
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn href(&self) -> Result<Option<String>, BackendError> {
        let value = self
            .run("const h = arguments[0].href; return typeof h === 'string' ? h : null;")
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn click(&self) -> Result<(), BackendError> {
        self.run("arguments[0].click();").await.map(|_| ())
    }

    async fn focus(&self) -> Result<(), BackendError> {
        self.run("arguments[0].focus();").await.map(|_| ())
    }

    async fn select_all(&self) -> Result<(), BackendError> {
        self.run("arguments[0].select();").await.map(|_| ())
    }

    async fn submit(&self) -> Result<(), BackendError> {
        self.run(SUBMIT_SCRIPT).await.map(|_| ())
    }
}
