//! Capabilities the dispatcher needs from a page.
//!
//! A `Document` finds elements, an `ElementHandle` inspects one element and
//! invokes its native interaction methods, and a `BrowsingContext` performs
//! navigations. Backends implement these against a live browser; the
//! in-memory document in [`crate::memory`] implements them for tests.

use async_trait::async_trait;
use markjump_common::error::BackendError;

#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Lower-case tag name, e.g. `"button"`.
    async fn tag_name(&self) -> Result<String, BackendError>;

    async fn attribute(&self, name: &str) -> Result<Option<String>, BackendError>;

    async fn has_attribute(&self, name: &str) -> Result<bool, BackendError> {
        Ok(self.attribute(name).await?.is_some())
    }

    /// The resolved `href` property. `None` for elements that do not expose
    /// one at all, which is different from an empty destination.
    async fn href(&self) -> Result<Option<String>, BackendError>;

    async fn click(&self) -> Result<(), BackendError>;

    async fn focus(&self) -> Result<(), BackendError>;

    /// Select the element's entire current text.
    async fn select_all(&self) -> Result<(), BackendError>;

    /// Submit the form this element belongs to.
    async fn submit(&self) -> Result<(), BackendError>;
}

#[async_trait]
pub trait Document: Send + Sync {
    type Element: ElementHandle;

    /// All matches in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>, BackendError>;

    async fn query_one(&self, selector: &str) -> Result<Option<Self::Element>, BackendError> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }
}

#[async_trait]
pub trait BrowsingContext: Send + Sync {
    async fn open_in_new_context(&self, url: &str) -> Result<(), BackendError>;

    /// Navigate the current context, like `window.open(url, '_self')`.
    async fn replace_location(&self, url: &str) -> Result<(), BackendError>;
}
