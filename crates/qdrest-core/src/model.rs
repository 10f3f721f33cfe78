//! Points, vectors and per-operation options
//!
//! Payloads, filters, search params and collection options are opaque JSON
//! objects: the client never looks inside them, it only merges them with
//! the operation defaults.

use crate::id::{PointId, RawPointId};
use serde::{Deserialize, Serialize};

/// Opaque JSON object (payload, filter, params, collection options)
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Vector size used when a collection is created without one
pub const DEFAULT_VECTOR_SIZE: u64 = 1536;

/// Distance metric used when a collection is created without one
pub const DEFAULT_DISTANCE: &str = "Cosine";

/// Result count for search and recommend
pub const DEFAULT_SEARCH_LIMIT: u64 = 5;

/// Page size for scroll
pub const DEFAULT_SCROLL_LIMIT: u64 = 10;

/// A point to insert, with an identifier that has not been resolved yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPoint {
    pub id: RawPointId,
    pub vector: Vec<f32>,
    pub payload: Option<JsonMap>,
}

impl NewPoint {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            id: RawPointId::Missing,
            vector,
            payload: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<RawPointId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_payload(mut self, payload: JsonMap) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// A point in wire shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub vector: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<JsonMap>,
}

impl Point {
    /// Build a wire point, dropping an empty payload
    pub fn new(id: PointId, vector: Vec<f32>, payload: Option<JsonMap>) -> Self {
        Self {
            id,
            vector,
            payload: payload.filter(|p| !p.is_empty()),
        }
    }
}

/// New vector for an existing point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointVectors {
    pub id: PointId,
    pub vector: Vec<f32>,
}

impl PointVectors {
    pub fn new(id: impl Into<PointId>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector,
        }
    }
}

/// Options for similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub limit: u64,
    /// Omitted from the request when empty
    pub filter: JsonMap,
    /// Extra top-level fields, merged over `vector` and `limit`
    pub params: JsonMap,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            filter: JsonMap::new(),
            params: JsonMap::new(),
        }
    }
}

impl SearchOptions {
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_filter(mut self, filter: JsonMap) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_params(mut self, params: JsonMap) -> Self {
        self.params = params;
        self
    }
}

/// Options for recommendation search
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendOptions {
    /// Omitted from the request when empty
    pub negative: Vec<PointId>,
    pub limit: u64,
    /// Omitted from the request when empty
    pub filter: JsonMap,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            negative: Vec::new(),
            limit: DEFAULT_SEARCH_LIMIT,
            filter: JsonMap::new(),
        }
    }
}

impl RecommendOptions {
    pub fn with_negative(mut self, negative: Vec<PointId>) -> Self {
        self.negative = negative;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_filter(mut self, filter: JsonMap) -> Self {
        self.filter = filter;
        self
    }
}

/// What to return when fetching points by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrieveOptions {
    pub with_payload: bool,
    pub with_vector: bool,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            with_payload: true,
            with_vector: true,
        }
    }
}

/// Options for paging through a collection
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollOptions {
    pub limit: u64,
    /// Point id to start from; omitted when `None`
    pub offset: Option<PointId>,
    /// Omitted from the request when empty
    pub filter: JsonMap,
    pub with_payload: bool,
    pub with_vector: bool,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SCROLL_LIMIT,
            offset: None,
            filter: JsonMap::new(),
            with_payload: true,
            with_vector: false,
        }
    }
}

impl ScrollOptions {
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: impl Into<PointId>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn with_filter(mut self, filter: JsonMap) -> Self {
        self.filter = filter;
        self
    }
}
