//! Qdrant REST operations
//!
//! Every operation has the same shape: build the request, send it through
//! the transport, decode the JSON body. Errors propagate unchanged.

use crate::transport::ReqwestTransport;
use crate::HttpTransport;
use qdrest_core::{
    decode_body, request, ApiRequest, ClientConfig, JsonMap, NewPoint, PointId, PointVectors,
    RawPointId, RecommendOptions, Result, RetrieveOptions, ScrollOptions, SearchOptions,
};
use serde_json::Value;
use std::sync::Arc;

/// Client for one Qdrant endpoint
///
/// Holds no per-call state; clones share the same transport and can be used
/// from many tasks at once.
#[derive(Clone)]
pub struct QdrantClient {
    transport: Arc<dyn HttpTransport>,
    config: ClientConfig,
}

impl std::fmt::Debug for QdrantClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QdrantClient {
    /// Create a client backed by reqwest
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client from `QDRANT_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client over a caller-supplied transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn execute(&self, operation: &str, request: ApiRequest) -> Result<Value> {
        tracing::debug!("{}: {} {}", operation, request.method, request.path);

        let body = self.transport.send(request).await.map_err(|e| {
            tracing::warn!("{} failed: {}", operation, e);
            e
        })?;

        decode_body(operation, &body)
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Create a collection
    ///
    /// `options` is merged over `{name, vectors: {size: 1536, distance: "Cosine"}}`;
    /// `size` and `distance` in `options` also feed the computed `vectors`.
    pub async fn create_collection(&self, collection: &str, options: JsonMap) -> Result<Value> {
        self.execute(
            "create_collection",
            request::create_collection(collection, &options),
        )
        .await
    }

    pub async fn get_collection(&self, collection: &str) -> Result<Value> {
        self.execute("get_collection", request::get_collection(collection))
            .await
    }

    pub async fn list_collections(&self) -> Result<Value> {
        self.execute("list_collections", request::list_collections())
            .await
    }

    pub async fn delete_collection(&self, collection: &str) -> Result<Value> {
        self.execute("delete_collection", request::delete_collection(collection))
            .await
    }

    // ========================================================================
    // Points
    // ========================================================================

    /// Insert one point
    ///
    /// The id is resolved first: missing or non-UUID strings get a fresh
    /// UUID. An empty payload is not sent.
    pub async fn insert(
        &self,
        collection: &str,
        id: impl Into<RawPointId>,
        vector: Vec<f32>,
        payload: JsonMap,
    ) -> Result<Value> {
        self.execute(
            "insert",
            request::insert(collection, id, vector, payload),
        )
        .await
    }

    /// Insert several points in one request, resolving each id independently
    pub async fn batch_insert(&self, collection: &str, points: Vec<NewPoint>) -> Result<Value> {
        self.execute("batch_insert", request::batch_insert(collection, points))
            .await
    }

    /// Replace vectors of existing points
    pub async fn update_vectors(&self, collection: &str, points: &[PointVectors]) -> Result<Value> {
        self.execute(
            "update_vectors",
            request::update_vectors(collection, points),
        )
        .await
    }

    pub async fn delete_points(&self, collection: &str, ids: &[PointId]) -> Result<Value> {
        self.execute("delete_points", request::delete_points(collection, ids))
            .await
    }

    pub async fn get_points(
        &self,
        collection: &str,
        ids: &[PointId],
        options: RetrieveOptions,
    ) -> Result<Value> {
        self.execute(
            "get_points",
            request::get_points(collection, ids, options),
        )
        .await
    }

    // ========================================================================
    // Search
    // ========================================================================

    pub async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        options: &SearchOptions,
    ) -> Result<Value> {
        self.execute("search", request::search(collection, vector, options))
            .await
    }

    pub async fn recommend(
        &self,
        collection: &str,
        positive: &[PointId],
        options: &RecommendOptions,
    ) -> Result<Value> {
        self.execute(
            "recommend",
            request::recommend(collection, positive, options),
        )
        .await
    }

    pub async fn scroll(&self, collection: &str, options: &ScrollOptions) -> Result<Value> {
        self.execute("scroll", request::scroll(collection, options))
            .await
    }

    pub async fn count(&self, collection: &str, filter: &JsonMap) -> Result<Value> {
        self.execute("count", request::count(collection, filter))
            .await
    }

    // ========================================================================
    // Payload indexes
    // ========================================================================

    /// Create a payload index, e.g. `create_field_index("docs", "city", "keyword")`
    pub async fn create_field_index(
        &self,
        collection: &str,
        field_name: &str,
        field_schema: impl Into<Value>,
    ) -> Result<Value> {
        self.execute(
            "create_field_index",
            request::create_field_index(collection, field_name, field_schema.into()),
        )
        .await
    }

    pub async fn delete_field_index(&self, collection: &str, field_name: &str) -> Result<Value> {
        self.execute(
            "delete_field_index",
            request::delete_field_index(collection, field_name),
        )
        .await
    }
}
