//! Common error types used across all metrics view crates
//! Provides consistent error handling and reporting

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bound of a custom time range, named after its form field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RangeBound {
    #[serde(rename = "fromTime")]
    From,
    #[serde(rename = "toTime")]
    To,
}

impl RangeBound {
    /// Id of the date picker holding this bound
    pub fn field_id(&self) -> &'static str {
        match self {
            RangeBound::From => "fromTime",
            RangeBound::To => "toTime",
        }
    }
}

impl std::fmt::Display for RangeBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_id())
    }
}

/// Base error type for all metrics view operations
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum MetricsViewError {
    // Validation errors, surfaced as field highlights
    #[error("Custom range is missing {missing:?}")]
    MissingRangeBound { missing: Vec<RangeBound> },

    #[error("Invalid time range preset: {value:?}")]
    InvalidFromPreset { value: String },

    // Data-related errors, surfaced as "no data"
    #[error("Data fetch failed: {message}")]
    DataFetch { message: String },

    #[error("Data parse error: {message}")]
    DataParse { message: String },

    #[error("No data endpoint configured")]
    EndpointNotConfigured,

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
        field: Option<String>,
    },

    // Chart state errors
    #[error("No chart session for {chart}")]
    SessionNotFound { chart: String },

    #[error("Renderer error: {message}")]
    Renderer { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    // WASM-specific errors
    #[error("JavaScript interop error: {message}")]
    JsInterop { message: String },
}

impl MetricsViewError {
    /// Validation errors are shown as field highlights, never as "no data"
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MetricsViewError::MissingRangeBound { .. } | MetricsViewError::InvalidFromPreset { .. }
        )
    }
}

/// Result type alias for metrics view operations
pub type MetricsViewResult<T> = Result<T, MetricsViewError>;

/// Error response structure for JavaScript interop
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: MetricsViewError,
    pub timestamp: i64,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: MetricsViewError) -> Self {
        Self {
            success: false,
            error,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Convert to JSON string for JavaScript
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"type":"JsInterop","details":{"message":"Failed to serialize error"}}}"#.to_string()
        })
    }
}

impl From<serde_json::Error> for MetricsViewError {
    fn from(err: serde_json::Error) -> Self {
        MetricsViewError::DataParse {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "wasm")]
impl From<wasm_bindgen::JsValue> for MetricsViewError {
    fn from(err: wasm_bindgen::JsValue) -> Self {
        MetricsViewError::JsInterop {
            message: format!("{err:?}"),
        }
    }
}

#[cfg(feature = "wasm")]
impl From<MetricsViewError> for wasm_bindgen::JsValue {
    fn from(err: MetricsViewError) -> Self {
        wasm_bindgen::JsValue::from_str(&ErrorResponse::new(err).to_json())
    }
}
