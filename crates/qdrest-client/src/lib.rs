//! Qdrest Client - Qdrant REST API access
//!
//! [`QdrantClient`] turns each operation into a request (see
//! [`qdrest_core::request`]), hands it to an [`HttpTransport`] and decodes
//! the JSON answer. The default transport is reqwest; tests and embedders
//! can plug in their own.

use async_trait::async_trait;
use qdrest_core::{ApiRequest, Result};

pub use qdrest_core::{
    ClientConfig, ConfigError, JsonMap, NewPoint, PointId, PointVectors, QdrantError, RawPointId,
    RecommendOptions, RetrieveOptions, ScrollOptions, SearchOptions,
};

/// Sends fully formed requests to the server
///
/// Implementations return the raw body of a 2xx response. Network failures,
/// timeouts and non-2xx statuses come back as transport-class
/// [`QdrantError`]s; decoding is the caller's job.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>>;
}

pub mod provider;
pub mod service;
pub mod transport;

pub use provider::{ClientRegistry, SERVICE_KEY};
pub use service::QdrantClient;
pub use transport::ReqwestTransport;
