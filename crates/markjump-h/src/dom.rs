//! DOM capabilities over a live CDP page.
//!
//! Element inspection and native interactions run as functions bound to the
//! element's remote object (`Runtime.callFunctionOn`), so `click()`,
//! `focus()` and friends keep their in-page semantics.

use crate::cdp::CdpClient;
use async_trait::async_trait;
use chromiumoxide::Element;
use chromiumoxide::error::CdpError;
use markjump_engine::dom::{BrowsingContext, Document, ElementHandle};
use markjump_engine::error::BackendError;
use std::future::Future;
use std::time::Duration;

/// Bounds every round trip; a blocked JS thread would otherwise hang forever.
const CALL_TIMEOUT: Duration = Duration::from_secs(10);

const TAG_NAME_FN: &str = "function() { return this.nodeName.toLowerCase(); }";
const HREF_FN: &str = "function() { return typeof this.href === 'string' ? this.href : null; }";
const CLICK_FN: &str = "function() { this.click(); }";
const FOCUS_FN: &str = "function() { this.focus(); }";
const SELECT_FN: &str = "function() { this.select(); }";
const SUBMIT_FN: &str = r#"function() {
    if (this.form) {
        this.form.requestSubmit(this);
    } else if (typeof this.submit === 'function') {
        this.submit();
    } else {
        throw new Error('element has no associated form');
    }
}"#;

/// Check if an error indicates the node or its execution context is gone.
fn is_stale_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("Could not find node")
        || err.contains("No node with given id")
}

/// Chrome reports a bad `querySelectorAll` argument as a DOM error.
fn is_invalid_selector_error(err: &str) -> bool {
    err.contains("DOM Error while querying")
        || err.contains("is not a valid selector")
        || err.contains("SyntaxError")
}

fn map_cdp_error(err: CdpError) -> BackendError {
    match err {
        CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse => {
            BackendError::ConnectionLost
        }
        CdpError::Timeout => BackendError::Timeout {
            operation: "cdp".to_string(),
        },
        err => {
            let message = err.to_string();
            if is_stale_error(&message) {
                BackendError::ElementStale
            } else {
                BackendError::ScriptError(message)
            }
        }
    }
}

fn map_query_error(selector: &str, err: CdpError) -> BackendError {
    tracing::debug!("find_elements({}) failed: {}", selector, err);
    if is_invalid_selector_error(&err.to_string()) {
        BackendError::SelectorInvalid {
            selector: selector.to_string(),
        }
    } else {
        map_cdp_error(err)
    }
}

pub(crate) async fn with_timeout<T, F>(operation: &str, fut: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    tokio::time::timeout(CALL_TIMEOUT, fut)
        .await
        .map_err(|_| BackendError::Timeout {
            operation: operation.to_string(),
        })?
}

pub struct CdpDocument<'a> {
    client: &'a CdpClient,
}

impl<'a> CdpDocument<'a> {
    pub fn new(client: &'a CdpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<'a> Document for CdpDocument<'a> {
    type Element = CdpElement;

    async fn query_all(&self, selector: &str) -> Result<Vec<CdpElement>, BackendError> {
        let elements = with_timeout("query", async {
            self.client
                .page
                .find_elements(selector)
                .await
                .map_err(|e| map_query_error(selector, e))
        })
        .await?;
        Ok(elements.into_iter().map(CdpElement::new).collect())
    }
}

#[async_trait]
impl<'a> BrowsingContext for CdpDocument<'a> {
    async fn open_in_new_context(&self, url: &str) -> Result<(), BackendError> {
        tracing::info!("Opening new page: {}", url);
        with_timeout("navigate", async {
            self.client
                .browser
                .new_page(url)
                .await
                .map_err(|e| BackendError::Navigation(e.to_string()))
        })
        .await?;
        Ok(())
    }

    async fn replace_location(&self, url: &str) -> Result<(), BackendError> {
        tracing::info!("Navigating to: {}", url);
        with_timeout("navigate", async {
            self.client
                .page
                .goto(url)
                .await
                .map_err(|e| BackendError::Navigation(e.to_string()))
        })
        .await?;
        Ok(())
    }
}

pub struct CdpElement {
    element: Element,
}

impl CdpElement {
    fn new(element: Element) -> Self {
        Self { element }
    }

    /// Call `function` with `this` bound to the element and return its
    /// primitive result.
    async fn call(&self, function: &str) -> Result<Option<serde_json::Value>, BackendError> {
        with_timeout("callFunctionOn", async {
            let returns = self
                .element
                .call_js_fn(function, false)
                .await
                .map_err(map_cdp_error)?;
            if let Some(details) = returns.exception_details {
                let message = details
                    .exception
                    .and_then(|e| e.description)
                    .unwrap_or(details.text);
                return Err(BackendError::ScriptError(message));
            }
            Ok(returns.result.value)
        })
        .await
    }

    async fn call_string(&self, function: &str) -> Result<Option<String>, BackendError> {
        Ok(self
            .call(function)
            .await?
            .and_then(|v| v.as_str().map(str::to_string)))
    }
}

#[async_trait]
impl ElementHandle for CdpElement {
    async fn tag_name(&self) -> Result<String, BackendError> {
        Ok(self.call_string(TAG_NAME_FN).await?.unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, BackendError> {
        with_timeout("attribute", async {
            self.element.attribute(name).await.map_err(map_cdp_error)
        })
        .await
    }

    async fn href(&self) -> Result<Option<String>, BackendError> {
        self.call_string(HREF_FN).await
    }

    async fn click(&self) -> Result<(), BackendError> {
        self.call(CLICK_FN).await.map(|_| ())
    }

    async fn focus(&self) -> Result<(), BackendError> {
        self.call(FOCUS_FN).await.map(|_| ())
    }

    async fn select_all(&self) -> Result<(), BackendError> {
        self.call(SELECT_FN).await.map(|_| ())
    }

    async fn submit(&self) -> Result<(), BackendError> {
        self.call(SUBMIT_FN).await.map(|_| ())
    }
}
