//! Resolve a marker key to its target and perform the one activation the
//! target's category calls for.

use crate::classifier::classify;
use crate::config::schema::MarkerConfig;
use crate::dom::{BrowsingContext, Document, ElementHandle};
use crate::resolver::{find_marker, resolve_target};
use markjump_common::error::{BackendError, DispatchError};
use markjump_common::protocol::{Activation, Category, DispatchOutcome, DispatchRequest};
use tracing::{debug, info, warn};

pub struct MarkerDispatcher {
    config: MarkerConfig,
}

impl Default for MarkerDispatcher {
    fn default() -> Self {
        Self::new(MarkerConfig::default())
    }
}

impl MarkerDispatcher {
    pub fn new(config: MarkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    /// Run one resolve, classify, activate pass.
    ///
    /// An unknown key and an unclassifiable target both return `Ok` with no
    /// side effect. A marker whose pointer matches nothing is an error.
    pub async fn dispatch<D, C>(
        &self,
        document: &D,
        context: &C,
        request: &DispatchRequest,
    ) -> Result<DispatchOutcome, DispatchError>
    where
        D: Document,
        C: BrowsingContext + ?Sized,
    {
        if request.key.trim().is_empty() {
            return Err(DispatchError::EmptyKey);
        }

        let Some(marker) = find_marker(document, &request.key, &self.config).await? else {
            debug!("No marker for key {:?}", request.key);
            return Ok(DispatchOutcome::NoMarker {
                key: request.key.clone(),
            });
        };

        let target = match resolve_target(document, &marker, &request.key, &self.config).await {
            Ok(target) => target,
            Err(e) => {
                warn!("{}", e);
                return Err(e);
            }
        };

        let category = classify(&target.element).await?;
        debug!(
            "Marker {:?} -> {} classified as {}",
            request.key,
            target.selector,
            category.label()
        );

        let activation =
            activate(&target.element, context, &category, request.new_context).await?;
        info!(
            "Dispatched {:?} on {} ({})",
            activation, target.selector, request.key
        );

        Ok(DispatchOutcome::Activated {
            key: request.key.clone(),
            selector: target.selector,
            category,
            activation,
        })
    }
}

/// Perform exactly the action `category` implies, or nothing.
pub async fn activate<E, C>(
    element: &E,
    context: &C,
    category: &Category,
    new_context: bool,
) -> Result<Activation, BackendError>
where
    E: ElementHandle + ?Sized,
    C: BrowsingContext + ?Sized,
{
    let activation = match category {
        Category::ButtonLike => {
            element.click().await?;
            Activation::Click
        }
        Category::NavigableLink { url } if new_context => {
            context.open_in_new_context(url).await?;
            Activation::OpenNewContext { url: url.clone() }
        }
        Category::NavigableLink { url } => {
            context.replace_location(url).await?;
            Activation::ReplaceLocation { url: url.clone() }
        }
        Category::TextInput => {
            element.focus().await?;
            element.select_all().await?;
            Activation::FocusSelect
        }
        Category::SubmitInput => {
            element.submit().await?;
            Activation::Submit
        }
        Category::CheckboxInput => {
            element.click().await?;
            Activation::Toggle
        }
        Category::Unclassified => Activation::Skipped,
    };
    Ok(activation)
}
