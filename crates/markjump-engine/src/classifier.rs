//! Decides which kind of interaction a target element calls for.

use crate::dom::ElementHandle;
use markjump_common::error::BackendError;
use markjump_common::protocol::Category;

/// The facts about an element that classification depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSnapshot {
    pub tag: String,
    pub has_popup: bool,
    pub role: Option<String>,
    /// Raw `href` attribute.
    pub href_attribute: Option<String>,
    /// Resolved `href` property.
    pub href: Option<String>,
    pub input_type: Option<String>,
}

impl TargetSnapshot {
    pub async fn capture<E: ElementHandle + ?Sized>(element: &E) -> Result<Self, BackendError> {
        Ok(Self {
            tag: element.tag_name().await?.to_ascii_lowercase(),
            has_popup: element.has_attribute("aria-haspopup").await?,
            role: element.attribute("role").await?,
            href_attribute: element.attribute("href").await?,
            href: element.href().await?,
            input_type: element.attribute("type").await?,
        })
    }

    fn is_button_like(&self) -> bool {
        self.tag == "button"
            || self.has_popup
            || self.role.as_deref() == Some("button")
            // an empty href is a script-driven pseudo button
            || self.href_attribute.as_deref() == Some("")
    }

    fn input_type_is(&self, expected: &str) -> bool {
        self.tag == "input" && self.input_type.as_deref() == Some(expected)
    }
}

/// First matching rule wins; the order below is significant.
pub fn classify_snapshot(snapshot: &TargetSnapshot) -> Category {
    if snapshot.is_button_like() {
        return Category::ButtonLike;
    }
    if let Some(url) = snapshot.href.as_deref().filter(|u| !u.is_empty()) {
        return Category::NavigableLink {
            url: url.to_string(),
        };
    }
    if snapshot.input_type_is("text") {
        Category::TextInput
    } else if snapshot.input_type_is("submit") {
        Category::SubmitInput
    } else if snapshot.input_type_is("checkbox") {
        Category::CheckboxInput
    } else {
        Category::Unclassified
    }
}

pub async fn classify<E: ElementHandle + ?Sized>(element: &E) -> Result<Category, BackendError> {
    let snapshot = TargetSnapshot::capture(element).await?;
    Ok(classify_snapshot(&snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> TargetSnapshot {
        TargetSnapshot {
            tag: name.into(),
            ..Default::default()
        }
    }

    fn input(kind: &str) -> TargetSnapshot {
        TargetSnapshot {
            tag: "input".into(),
            input_type: Some(kind.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_button_variants() {
        assert_eq!(classify_snapshot(&tag("button")), Category::ButtonLike);

        let menu = TargetSnapshot {
            has_popup: true,
            href: Some("http://x/menu".into()),
            ..tag("a")
        };
        assert_eq!(classify_snapshot(&menu), Category::ButtonLike);

        let role = TargetSnapshot {
            role: Some("button".into()),
            ..tag("div")
        };
        assert_eq!(classify_snapshot(&role), Category::ButtonLike);
    }

    #[test]
    fn test_empty_href_beats_link() {
        let anchor = TargetSnapshot {
            href_attribute: Some(String::new()),
            href: Some("http://example.test/page".into()),
            ..tag("a")
        };
        assert_eq!(classify_snapshot(&anchor), Category::ButtonLike);
    }

    #[test]
    fn test_link_with_destination() {
        let anchor = TargetSnapshot {
            href_attribute: Some("/next".into()),
            href: Some("http://example.test/next".into()),
            ..tag("a")
        };
        assert_eq!(
            classify_snapshot(&anchor),
            Category::NavigableLink {
                url: "http://example.test/next".into()
            }
        );
    }

    #[test]
    fn test_anchor_without_destination_is_unclassified() {
        let anchor = TargetSnapshot {
            href: Some(String::new()),
            ..tag("a")
        };
        assert_eq!(classify_snapshot(&anchor), Category::Unclassified);
    }

    #[test]
    fn test_inputs() {
        assert_eq!(classify_snapshot(&input("text")), Category::TextInput);
        assert_eq!(classify_snapshot(&input("submit")), Category::SubmitInput);
        assert_eq!(classify_snapshot(&input("checkbox")), Category::CheckboxInput);
        assert_eq!(classify_snapshot(&input("radio")), Category::Unclassified);
        assert_eq!(classify_snapshot(&tag("input")), Category::Unclassified);
    }

    #[test]
    fn test_type_attribute_outside_input_is_ignored() {
        let not_input = TargetSnapshot {
            input_type: Some("text".into()),
            ..tag("textarea")
        };
        assert_eq!(classify_snapshot(&not_input), Category::Unclassified);
    }

    #[test]
    fn test_button_typed_submit_is_button() {
        let button = TargetSnapshot {
            input_type: Some("submit".into()),
            ..tag("button")
        };
        assert_eq!(classify_snapshot(&button), Category::ButtonLike);
    }
}
