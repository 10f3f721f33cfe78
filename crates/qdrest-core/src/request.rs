//! Request construction for every Qdrant REST operation
//!
//! Each function here is pure apart from UUID generation: it takes caller
//! arguments and returns the method, path and JSON body to send. Transport
//! lives elsewhere.
//!
//! Omission rules: an empty payload, filter or negative list and an absent
//! scroll offset are left out of the body entirely, never sent empty.

use crate::id::{resolve, resolve_all, PointId, RawPointId};
use crate::model::{
    JsonMap, NewPoint, Point, PointVectors, RecommendOptions, RetrieveOptions, ScrollOptions,
    SearchOptions, DEFAULT_DISTANCE, DEFAULT_VECTOR_SIZE,
};
use serde_json::{json, Value};
use std::fmt;

/// HTTP methods used by the Qdrant REST API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully formed request, ready for the HTTP layer
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured host, always starting with `/`
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Body as a JSON object, if it is one
    pub fn body_object(&self) -> Option<&JsonMap> {
        self.body.as_ref().and_then(Value::as_object)
    }
}

/// Shallow merge, `overrides` wins on key collision
fn merge_over(mut base: JsonMap, overrides: &JsonMap) -> JsonMap {
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
    base
}

fn collection_path(collection: &str) -> String {
    format!("/collections/{collection}")
}

fn points_path(collection: &str, suffix: &str) -> String {
    format!("/collections/{collection}/points{suffix}")
}

// ============================================================================
// Collections
// ============================================================================

/// `PUT /collections/{name}`
///
/// `vectors.size`/`vectors.distance` come from `options` when present and
/// default to 1536 / "Cosine". The whole `options` map is then merged over
/// the top level, so a caller `vectors` object replaces the computed one.
pub fn create_collection(collection: &str, options: &JsonMap) -> ApiRequest {
    let size = options
        .get("size")
        .cloned()
        .unwrap_or_else(|| json!(DEFAULT_VECTOR_SIZE));
    let distance = options
        .get("distance")
        .cloned()
        .unwrap_or_else(|| json!(DEFAULT_DISTANCE));

    let mut defaults = JsonMap::new();
    defaults.insert("name".to_string(), json!(collection));
    defaults.insert(
        "vectors".to_string(),
        json!({ "size": size, "distance": distance }),
    );

    ApiRequest::new(Method::Put, collection_path(collection))
        .with_body(Value::Object(merge_over(defaults, options)))
}

/// `GET /collections/{name}`
pub fn get_collection(collection: &str) -> ApiRequest {
    ApiRequest::new(Method::Get, collection_path(collection))
}

/// `GET /collections`
pub fn list_collections() -> ApiRequest {
    ApiRequest::new(Method::Get, "/collections")
}

/// `DELETE /collections/{name}`
pub fn delete_collection(collection: &str) -> ApiRequest {
    ApiRequest::new(Method::Delete, collection_path(collection))
}

// ============================================================================
// Points
// ============================================================================

/// `PUT /collections/{name}/points` with a single point
pub fn insert(
    collection: &str,
    id: impl Into<RawPointId>,
    vector: Vec<f32>,
    payload: JsonMap,
) -> ApiRequest {
    let point = Point::new(resolve(id), vector, Some(payload));

    ApiRequest::new(Method::Put, points_path(collection, ""))
        .with_body(json!({ "points": [point] }))
}

/// `PUT /collections/{name}/points` with every point resolved independently
pub fn batch_insert(collection: &str, points: Vec<NewPoint>) -> ApiRequest {
    let (raw_ids, contents): (Vec<_>, Vec<_>) = points
        .into_iter()
        .map(|p| (p.id, (p.vector, p.payload)))
        .unzip();
    let points: Vec<Point> = resolve_all(raw_ids)
        .into_iter()
        .zip(contents)
        .map(|(id, (vector, payload))| Point::new(id, vector, payload))
        .collect();

    ApiRequest::new(Method::Put, points_path(collection, ""))
        .with_body(json!({ "points": points }))
}

/// `PUT /collections/{name}/points/vectors`
///
/// Ids are sent as given; this never creates points.
pub fn update_vectors(collection: &str, points: &[PointVectors]) -> ApiRequest {
    ApiRequest::new(Method::Put, points_path(collection, "/vectors"))
        .with_body(json!({ "points": points }))
}

/// `POST /collections/{name}/points/delete`
pub fn delete_points(collection: &str, ids: &[PointId]) -> ApiRequest {
    ApiRequest::new(Method::Post, points_path(collection, "/delete"))
        .with_body(json!({ "points": ids }))
}

/// `POST /collections/{name}/points`
pub fn get_points(collection: &str, ids: &[PointId], options: RetrieveOptions) -> ApiRequest {
    ApiRequest::new(Method::Post, points_path(collection, "")).with_body(json!({
        "ids": ids,
        "with_payload": options.with_payload,
        "with_vector": options.with_vector,
    }))
}

// ============================================================================
// Search
// ============================================================================

/// `POST /collections/{name}/points/search`
///
/// `params` is merged over `{vector, limit}`; a non-empty filter is set last.
pub fn search(collection: &str, vector: &[f32], options: &SearchOptions) -> ApiRequest {
    let mut defaults = JsonMap::new();
    defaults.insert("vector".to_string(), json!(vector));
    defaults.insert("limit".to_string(), json!(options.limit));

    let mut body = merge_over(defaults, &options.params);
    if !options.filter.is_empty() {
        body.insert("filter".to_string(), Value::Object(options.filter.clone()));
    }

    ApiRequest::new(Method::Post, points_path(collection, "/search"))
        .with_body(Value::Object(body))
}

/// `POST /collections/{name}/points/recommend`
pub fn recommend(collection: &str, positive: &[PointId], options: &RecommendOptions) -> ApiRequest {
    let mut body = JsonMap::new();
    body.insert("positive".to_string(), json!(positive));
    body.insert("limit".to_string(), json!(options.limit));

    if !options.negative.is_empty() {
        body.insert("negative".to_string(), json!(options.negative));
    }
    if !options.filter.is_empty() {
        body.insert("filter".to_string(), Value::Object(options.filter.clone()));
    }

    ApiRequest::new(Method::Post, points_path(collection, "/recommend"))
        .with_body(Value::Object(body))
}

/// `POST /collections/{name}/points/scroll`
pub fn scroll(collection: &str, options: &ScrollOptions) -> ApiRequest {
    let mut body = JsonMap::new();
    body.insert("limit".to_string(), json!(options.limit));
    body.insert("with_payload".to_string(), json!(options.with_payload));
    body.insert("with_vector".to_string(), json!(options.with_vector));

    if let Some(offset) = &options.offset {
        body.insert("offset".to_string(), json!(offset));
    }
    if !options.filter.is_empty() {
        body.insert("filter".to_string(), Value::Object(options.filter.clone()));
    }

    ApiRequest::new(Method::Post, points_path(collection, "/scroll"))
        .with_body(Value::Object(body))
}

/// `POST /collections/{name}/points/count`
pub fn count(collection: &str, filter: &JsonMap) -> ApiRequest {
    let mut body = JsonMap::new();
    if !filter.is_empty() {
        body.insert("filter".to_string(), Value::Object(filter.clone()));
    }

    ApiRequest::new(Method::Post, points_path(collection, "/count")).with_body(Value::Object(body))
}

// ============================================================================
// Payload indexes
// ============================================================================

/// `PUT /collections/{name}/index`
///
/// `field_schema` is passed through: a type name such as `"keyword"` or a
/// full schema object.
pub fn create_field_index(collection: &str, field_name: &str, field_schema: Value) -> ApiRequest {
    ApiRequest::new(Method::Put, format!("/collections/{collection}/index")).with_body(json!({
        "field_name": field_name,
        "field_schema": field_schema,
    }))
}

/// `DELETE /collections/{name}/index/{field}`
pub fn delete_field_index(collection: &str, field_name: &str) -> ApiRequest {
    ApiRequest::new(
        Method::Delete,
        format!("/collections/{collection}/index/{field_name}"),
    )
}
