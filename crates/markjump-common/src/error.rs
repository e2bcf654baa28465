//! Error taxonomy shared by the dispatcher and every browser backend.

/// Failures of the capability provider itself (CDP session, WebDriver
/// session, in-memory document). These are transport problems, not
/// dispatch outcomes.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Invalid selector: {selector}")]
    SelectorInvalid { selector: String },

    #[error("Element is stale (removed from DOM)")]
    ElementStale,

    #[error("Script execution error: {0}")]
    ScriptError(String),

    #[error("Timeout: {operation}")]
    Timeout { operation: String },

    #[error("Connection lost")]
    ConnectionLost,

    #[error("Not ready")]
    NotReady,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Other: {0}")]
    Other(String),
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Serialization(err.to_string())
    }
}

impl BackendError {
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::Navigation(_) => "NAVIGATION_ERROR",
            BackendError::SelectorInvalid { .. } => "SELECTOR_INVALID",
            BackendError::ElementStale => "ELEMENT_STALE",
            BackendError::ScriptError(_) => "SCRIPT_ERROR",
            BackendError::Timeout { .. } => "TIMEOUT",
            BackendError::ConnectionLost => "CONNECTION_LOST",
            BackendError::NotReady => "NOT_READY",
            BackendError::Serialization(_) => "SERIALIZATION_ERROR",
            BackendError::Other(_) => "INTERNAL_ERROR",
        }
    }
}

/// Errors reported by a single dispatch. "Key not found" and "unclassified
/// target" are not errors; they come back as ordinary outcomes.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Marker key must not be empty")]
    EmptyKey,

    #[error("Marker '{key}' points at '{selector}', which matches no element")]
    TargetNotFound { key: String, selector: String },

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::EmptyKey => "EMPTY_KEY",
            DispatchError::TargetNotFound { .. } => "TARGET_NOT_FOUND",
            DispatchError::Backend(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_codes() {
        let err = DispatchError::TargetNotFound {
            key: "AB".into(),
            selector: "#missing".into(),
        };
        assert_eq!(err.code(), "TARGET_NOT_FOUND");
        assert_eq!(
            err.to_string(),
            "Marker 'AB' points at '#missing', which matches no element"
        );

        let wrapped: DispatchError = BackendError::SelectorInvalid {
            selector: "a >> b".into(),
        }
        .into();
        assert_eq!(wrapped.code(), "SELECTOR_INVALID");
    }
}
