//! Qdrest Core - Point identity and request construction
//!
//! This crate holds everything about talking to a Qdrant REST endpoint that
//! does not need a network:
//! - Point identifier resolution (absent / integer / string to wire id)
//! - Data model for points, filters and per-operation options
//! - Request construction (method, path and JSON body per operation)
//! - Client configuration
//! - Common error types

pub mod config;
pub mod id;
pub mod model;
pub mod request;

pub use config::{ClientConfig, ConfigError};
pub use id::{resolve, resolve_all, PointId, RawPointId};
pub use model::{
    JsonMap, NewPoint, Point, PointVectors, RecommendOptions, RetrieveOptions, ScrollOptions,
    SearchOptions,
};
pub use request::{ApiRequest, Method};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by client operations
///
/// `Transport`, `Timeout` and `Status` come from the HTTP layer and are passed
/// through untouched. `Decode` means the server answered 2xx with a body that
/// is not JSON.
#[derive(Error, Debug)]
pub enum QdrantError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode {operation} response: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl QdrantError {
    /// True for failures raised by the HTTP layer (network, timeout, non-2xx)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout(_) | Self::Status { .. }
        )
    }

    /// HTTP status code, when the server answered with a non-2xx response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, QdrantError>;

/// Decode a raw response body into a JSON value
///
/// The body must be a JSON document; an empty body is a decode error.
pub fn decode_body(operation: &str, body: &[u8]) -> Result<serde_json::Value> {
    serde_json::from_slice(body).map_err(|source| QdrantError::Decode {
        operation: operation.to_string(),
        source,
    })
}
