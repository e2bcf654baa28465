use crate::error::DispatchError;
use crate::protocol::{Activation, DispatchOutcome};
use serde_json::{Value, json};

pub fn format_outcome(outcome: &DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::NoMarker { key } => format!("no marker {:?}", key),
        DispatchOutcome::Activated {
            key,
            selector,
            category,
            activation,
        } => format!(
            "ok [{}] {} {} -> {}",
            key,
            category.label(),
            selector,
            format_activation(activation)
        ),
    }
}

fn format_activation(activation: &Activation) -> String {
    match activation {
        Activation::Click => "click".to_string(),
        Activation::OpenNewContext { url } => format!("open {} (new context)", url),
        Activation::ReplaceLocation { url } => format!("goto {}", url),
        Activation::FocusSelect => "focus + select".to_string(),
        Activation::Submit => "submit".to_string(),
        Activation::Toggle => "toggle".to_string(),
        Activation::Skipped => "no action".to_string(),
    }
}

pub fn format_error(err: &DispatchError) -> String {
    format!("Error [{}]: {}", err.code(), err)
}

pub fn format_result(result: &Result<DispatchOutcome, DispatchError>) -> String {
    match result {
        Ok(outcome) => format_outcome(outcome),
        Err(err) => format_error(err),
    }
}

/// Machine-readable rendering used by `--json`.
pub fn result_to_json(result: &Result<DispatchOutcome, DispatchError>) -> Value {
    match result {
        Ok(outcome) => serde_json::to_value(outcome).unwrap_or_else(|e| {
            json!({
                "status": "error",
                "code": "SERIALIZATION_ERROR",
                "message": e.to_string(),
            })
        }),
        Err(err) => json!({
            "status": "error",
            "code": err.code(),
            "message": err.to_string(),
        }),
    }
}
