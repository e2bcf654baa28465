//! Marker lookup and pointer resolution.

use crate::config::schema::MarkerConfig;
use crate::dom::{Document, ElementHandle};
use markjump_common::error::{BackendError, DispatchError};
use tracing::debug;

/// Find the first marker, in document order, whose stored key matches
/// `key` under the configured matching policy.
pub async fn find_marker<D: Document>(
    document: &D,
    key: &str,
    config: &MarkerConfig,
) -> Result<Option<D::Element>, BackendError> {
    let markers = document.query_all(&config.selector).await?;
    debug!("Scanning {} marker(s) for key {:?}", markers.len(), key);

    for marker in markers {
        let Some(stored) = marker.attribute(&config.key_attribute).await? else {
            continue;
        };
        if config.key_matching.matches(&stored, key) {
            return Ok(Some(marker));
        }
    }
    Ok(None)
}

/// A marker's target together with the selector that located it.
pub struct ResolvedTarget<E> {
    pub selector: String,
    pub element: E,
}

/// Follow the marker's pointer attribute to the element it designates.
///
/// A missing pointer attribute and a selector that matches nothing are the
/// same failure: the marker does not lead anywhere.
pub async fn resolve_target<D: Document>(
    document: &D,
    marker: &D::Element,
    key: &str,
    config: &MarkerConfig,
) -> Result<ResolvedTarget<D::Element>, DispatchError> {
    let selector = marker
        .attribute(&config.pointer_attribute)
        .await?
        .unwrap_or_default();

    if selector.trim().is_empty() {
        return Err(DispatchError::TargetNotFound {
            key: key.to_string(),
            selector,
        });
    }

    match document.query_one(&selector).await? {
        Some(element) => Ok(ResolvedTarget { selector, element }),
        None => Err(DispatchError::TargetNotFound {
            key: key.to_string(),
            selector,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::KeyMatching;
    use crate::memory::{MemoryDocument, MemoryNode};

    fn doc() -> MemoryDocument {
        MemoryDocument::builder("http://example.test/")
            .unwrap()
            .marker("AA", "#first")
            .marker("aa", "#second")
            .marker("BB", "#nowhere")
            .element(MemoryNode::new("span").attr("class", "marker"))
            .element(MemoryNode::new("button").attr("id", "first"))
            .element(MemoryNode::new("button").attr("id", "second"))
            .build()
    }

    #[tokio::test]
    async fn test_first_match_in_document_order_wins() {
        let doc = doc();
        let config = MarkerConfig::default();
        let marker = find_marker(&doc, "aa", &config).await.unwrap().unwrap();
        assert_eq!(
            marker.attribute("pointed-link").await.unwrap().as_deref(),
            Some("#first")
        );
    }

    #[tokio::test]
    async fn test_legacy_matching_skips_lowercase_markers() {
        let doc = MemoryDocument::builder("http://example.test/")
            .unwrap()
            .marker("aa", "#first")
            .marker("AA", "#second")
            .build();
        let config = MarkerConfig {
            key_matching: KeyMatching::Legacy,
            ..MarkerConfig::default()
        };
        let marker = find_marker(&doc, "aa", &config).await.unwrap().unwrap();
        assert_eq!(
            marker.attribute("pointed-link").await.unwrap().as_deref(),
            Some("#second")
        );
    }

    #[tokio::test]
    async fn test_unknown_key_is_none() {
        let doc = doc();
        let found = find_marker(&doc, "ZZ", &MarkerConfig::default())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_dangling_pointer_is_reported() {
        let doc = doc();
        let config = MarkerConfig::default();
        let marker = find_marker(&doc, "BB", &config).await.unwrap().unwrap();
        let err = resolve_target(&doc, &marker, "BB", &config)
            .await
            .err()
            .unwrap();
        assert_eq!(
            err,
            DispatchError::TargetNotFound {
                key: "BB".into(),
                selector: "#nowhere".into()
            }
        );
    }
}
