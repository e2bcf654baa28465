use crate::error::DispatchError;
use serde::{Deserialize, Serialize};

/// Typed invocation record: which marker to activate and whether a link
/// should open in a fresh browsing context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub key: String,
    #[serde(default, alias = "newBuffer")]
    pub new_context: bool,
}

impl DispatchRequest {
    pub fn new(key: impl Into<String>, new_context: bool) -> Result<Self, DispatchError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(DispatchError::EmptyKey);
        }
        Ok(Self { key, new_context })
    }
}

/// Interaction category of a resolved target. Evaluated in declaration
/// order; the first matching category wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Category {
    ButtonLike,
    NavigableLink { url: String },
    TextInput,
    SubmitInput,
    CheckboxInput,
    Unclassified,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::ButtonLike => "button",
            Category::NavigableLink { .. } => "link",
            Category::TextInput => "text-input",
            Category::SubmitInput => "submit",
            Category::CheckboxInput => "checkbox",
            Category::Unclassified => "unclassified",
        }
    }
}

/// The single side effect a dispatch performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Activation {
    Click,
    OpenNewContext { url: String },
    ReplaceLocation { url: String },
    FocusSelect,
    Submit,
    Toggle,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// No marker carries the requested key. Silent no-op.
    NoMarker { key: String },
    Activated {
        key: String,
        selector: String,
        category: Category,
        activation: Activation,
    },
}

impl DispatchOutcome {
    /// Whether anything observable happened in the page.
    pub fn had_effect(&self) -> bool {
        match self {
            DispatchOutcome::NoMarker { .. } => false,
            DispatchOutcome::Activated { activation, .. } => *activation != Activation::Skipped,
        }
    }
}
