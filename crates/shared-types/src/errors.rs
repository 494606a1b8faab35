//! Common error types used across all chart interaction crates
//! Provides consistent error handling and reporting

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base error type for all chart interaction operations
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum InteractionError {
    // Input errors
    #[error("Missing input: {what}")]
    MissingInput { what: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    // DOM errors
    #[error("DOM node not found: {selector}")]
    NodeNotFound { selector: String },

    #[error("DOM operation failed: {message}")]
    Dom { message: String },

    // Lifecycle errors
    #[error("Cleanup callback failed: {message}")]
    CleanupFailed { message: String },

    #[error("Timer scheduling failed: {message}")]
    Timer { message: String },

    #[error("Listener registration failed for {event}: {message}")]
    Listener { event: String, message: String },

    // WASM-specific errors
    #[error("JavaScript interop error: {message}")]
    JsInterop { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Result type alias for chart interaction operations
pub type InteractionResult<T> = Result<T, InteractionError>;

impl InteractionError {
    pub fn dom(message: impl Into<String>) -> Self {
        InteractionError::Dom {
            message: message.into(),
        }
    }

    pub fn cleanup(message: impl Into<String>) -> Self {
        InteractionError::CleanupFailed {
            message: message.into(),
        }
    }

    pub fn missing(what: impl Into<String>) -> Self {
        InteractionError::MissingInput { what: what.into() }
    }
}

/// What JavaScript receives when a bridge call fails
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: InteractionError,
    /// Epoch milliseconds
    pub timestamp: u64,
}

impl ErrorResponse {
    pub fn new(error: InteractionError) -> Self {
        Self {
            success: false,
            error,
            timestamp: chrono::Utc::now().timestamp_millis() as u64,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"type":"Internal","details":{"message":"Failed to serialize error"}}}"#.to_string()
        })
    }
}

impl From<serde_json::Error> for InteractionError {
    fn from(err: serde_json::Error) -> Self {
        InteractionError::InvalidValue {
            field: "json".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "wasm")]
impl From<wasm_bindgen::JsValue> for InteractionError {
    fn from(err: wasm_bindgen::JsValue) -> Self {
        InteractionError::JsInterop {
            message: format!("{err:?}"),
        }
    }
}

#[cfg(feature = "wasm")]
impl From<InteractionError> for wasm_bindgen::JsValue {
    fn from(err: InteractionError) -> Self {
        wasm_bindgen::JsValue::from_str(&ErrorResponse::new(err).to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = InteractionError::NodeNotFound {
            selector: ".viz-container".to_string(),
        };

        let json = ErrorResponse::new(error).to_json();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["success"], false);
        assert_eq!(parsed["error"]["type"], "NodeNotFound");
        assert_eq!(parsed["error"]["details"]["selector"], ".viz-container");
        assert!(parsed["timestamp"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_error_display() {
        let err = InteractionError::cleanup("observer already gone");
        assert_eq!(
            err.to_string(),
            "Cleanup callback failed: observer already gone"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        match InteractionError::from(parse_err) {
            InteractionError::InvalidValue { field, .. } => assert_eq!(field, "json"),
            other => panic!("Wrong error variant: {other:?}"),
        }
    }
}
