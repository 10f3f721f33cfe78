//! Client integration tests against a recording transport
//!
//! Note: Tests marked with #[ignore] require a running Qdrant instance.
//! Set QDRANT_HOST (and QDRANT_API_KEY if needed) and run: cargo test -- --ignored

use async_trait::async_trait;
use qdrest_client::{
    ClientConfig, HttpTransport, JsonMap, NewPoint, PointId, PointVectors, QdrantClient,
    QdrantError, RawPointId, RecommendOptions, RetrieveOptions, ScrollOptions, SearchOptions,
};
use qdrest_core::id::is_canonical_uuid;
use qdrest_core::{ApiRequest, Method, Result};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Records every request and answers from a queue (`{"status":"ok"}` when empty)
#[derive(Default)]
struct MockTransport {
    responses: Mutex<VecDeque<Result<Vec<u8>>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    fn respond(&self, response: Result<Vec<u8>>) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn last(&self) -> ApiRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(br#"{"status":"ok"}"#.to_vec()))
    }
}

fn setup() -> (QdrantClient, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::default());
    let config = ClientConfig::new("http://test-host:6333").with_api_key("test-api-key");
    (
        QdrantClient::with_transport(config, transport.clone()),
        transport,
    )
}

fn map(value: Value) -> JsonMap {
    value.as_object().cloned().unwrap_or_default()
}

// =============================================================================
// Collection Tests
// =============================================================================

#[tokio::test]
async fn test_create_collection_sends_correct_payload() {
    let (client, transport) = setup();
    transport.respond(Ok(br#"{"status":"ok","result":true}"#.to_vec()));

    let response = client
        .create_collection(
            "test_collection",
            map(json!({"size": 256, "distance": "Euclid"})),
        )
        .await
        .unwrap();
    assert_eq!(response["result"], true);

    let request = transport.last();
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.path, "/collections/test_collection");
    let body = request.body.unwrap();
    assert_eq!(body["name"], "test_collection");
    assert_eq!(body["vectors"]["size"], 256);
    assert_eq!(body["vectors"]["distance"], "Euclid");
}

#[tokio::test]
async fn test_create_collection_defaults() {
    let (client, transport) = setup();
    client.create_collection("c", JsonMap::new()).await.unwrap();

    let body = transport.last().body.unwrap();
    assert_eq!(body["vectors"], json!({"size": 1536, "distance": "Cosine"}));
}

#[tokio::test]
async fn test_collection_lifecycle_requests() {
    let (client, transport) = setup();

    client.list_collections().await.unwrap();
    assert_eq!(transport.last(), ApiRequest::new(Method::Get, "/collections"));

    client.get_collection("docs").await.unwrap();
    assert_eq!(transport.last(), ApiRequest::new(Method::Get, "/collections/docs"));

    client.delete_collection("docs").await.unwrap();
    assert_eq!(
        transport.last(),
        ApiRequest::new(Method::Delete, "/collections/docs")
    );
}

// =============================================================================
// Insert Tests
// =============================================================================

#[tokio::test]
async fn test_insert_generates_uuid_if_id_is_null() {
    let (client, transport) = setup();
    client
        .insert(
            "test_collection",
            RawPointId::Missing,
            vec![1.0, 2.0],
            map(json!({"field": "value"})),
        )
        .await
        .unwrap();

    let request = transport.last();
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.path, "/collections/test_collection/points");
    let body = request.body.unwrap();
    let points = body["points"].as_array().unwrap();
    assert_eq!(points.len(), 1);
    assert!(is_canonical_uuid(points[0]["id"].as_str().unwrap()));
    assert_eq!(points[0]["payload"], json!({"field": "value"}));
}

#[tokio::test]
async fn test_insert_uses_integer_id_if_provided() {
    let (client, transport) = setup();
    client
        .insert("test_collection", 123u64, vec![1.0, 2.0], JsonMap::new())
        .await
        .unwrap();

    let body = transport.last().body.unwrap();
    assert_eq!(body["points"][0]["id"], 123);
    assert!(body["points"][0].get("payload").is_none());
}

#[tokio::test]
async fn test_insert_uses_valid_uuid_string_id_if_provided() {
    let (client, transport) = setup();
    let uuid = uuid::Uuid::new_v4().hyphenated().to_string();
    client
        .insert("test_collection", uuid.as_str(), vec![1.0, 2.0], JsonMap::new())
        .await
        .unwrap();

    assert_eq!(transport.last().body.unwrap()["points"][0]["id"], json!(uuid));
}

#[tokio::test]
async fn test_insert_generates_new_uuid_for_invalid_string_id() {
    let (client, transport) = setup();
    client
        .insert("test_collection", "not-a-uuid", vec![1.0, 2.0], JsonMap::new())
        .await
        .unwrap();

    let body = transport.last().body.unwrap();
    let id = body["points"][0]["id"].as_str().unwrap();
    assert_ne!(id, "not-a-uuid");
    assert!(is_canonical_uuid(id));
}

#[tokio::test]
async fn test_batch_insert_single_request() {
    let (client, transport) = setup();
    client
        .batch_insert(
            "c",
            vec![
                NewPoint::new(vec![0.1]).with_id(1u64),
                NewPoint::new(vec![0.2]).with_id("external-key"),
                NewPoint::new(vec![0.3]).with_payload(map(json!({"k": 1}))),
            ],
        )
        .await
        .unwrap();

    assert_eq!(transport.count(), 1);
    let body = transport.last().body.unwrap();
    let points = body["points"].as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0]["id"], 1);
    assert!(is_canonical_uuid(points[1]["id"].as_str().unwrap()));
    assert_eq!(points[2]["payload"], json!({"k": 1}));
}

// =============================================================================
// Point Tests
// =============================================================================

#[tokio::test]
async fn test_point_operations_requests() {
    let (client, transport) = setup();
    let ids = [PointId::Num(1), PointId::Num(2)];

    client
        .update_vectors("c", &[PointVectors::new(1u64, vec![0.0, 1.0])])
        .await
        .unwrap();
    let request = transport.last();
    assert_eq!(request.path, "/collections/c/points/vectors");
    assert_eq!(
        request.body,
        Some(json!({"points": [{"id": 1, "vector": [0.0, 1.0]}]}))
    );

    client.delete_points("c", &ids).await.unwrap();
    let request = transport.last();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "/collections/c/points/delete");
    assert_eq!(request.body, Some(json!({"points": [1, 2]})));

    client
        .get_points(
            "c",
            &ids,
            RetrieveOptions {
                with_payload: false,
                with_vector: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(
        transport.last().body,
        Some(json!({"ids": [1, 2], "with_payload": false, "with_vector": true}))
    );
}

#[tokio::test]
async fn test_search_filter_omitted_when_empty() {
    let (client, transport) = setup();

    client
        .search("c", &[0.1, 0.2], &SearchOptions::default())
        .await
        .unwrap();
    let request = transport.last();
    assert_eq!(request.path, "/collections/c/points/search");
    assert!(!request.body_object().unwrap().contains_key("filter"));

    let filter = map(json!({"must": [{"key": "lang", "match": {"value": "en"}}]}));
    client
        .search(
            "c",
            &[0.1, 0.2],
            &SearchOptions::default().with_filter(filter.clone()),
        )
        .await
        .unwrap();
    assert_eq!(transport.last().body.unwrap()["filter"], Value::Object(filter));
}

#[tokio::test]
async fn test_recommend_scroll_count() {
    let (client, transport) = setup();

    client
        .recommend("c", &[PointId::Num(7)], &RecommendOptions::default())
        .await
        .unwrap();
    assert_eq!(
        transport.last().body,
        Some(json!({"positive": [7], "limit": 5}))
    );

    client
        .scroll("c", &ScrollOptions::default().with_offset(100u64))
        .await
        .unwrap();
    let request = transport.last();
    assert_eq!(request.path, "/collections/c/points/scroll");
    assert_eq!(
        request.body,
        Some(json!({"limit": 10, "with_payload": true, "with_vector": false, "offset": 100}))
    );

    client.count("c", &JsonMap::new()).await.unwrap();
    let request = transport.last();
    assert_eq!(request.path, "/collections/c/points/count");
    assert_eq!(request.body, Some(json!({})));
}

#[tokio::test]
async fn test_field_index_requests() {
    let (client, transport) = setup();

    client
        .create_field_index("c", "tags", json!({"type": "keyword", "is_tenant": true}))
        .await
        .unwrap();
    let request = transport.last();
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.path, "/collections/c/index");
    assert_eq!(request.body.unwrap()["field_schema"]["type"], "keyword");

    client.delete_field_index("c", "tags").await.unwrap();
    assert_eq!(
        transport.last(),
        ApiRequest::new(Method::Delete, "/collections/c/index/tags")
    );
}

// =============================================================================
// Error Propagation Tests
// =============================================================================

#[tokio::test]
async fn test_status_error_propagates_unchanged() {
    let (client, transport) = setup();
    transport.respond(Err(QdrantError::Status {
        status: 404,
        body: r#"{"status":{"error":"Not found: Collection `missing` doesn't exist!"}}"#
            .to_string(),
    }));

    let err = client.get_collection("missing").await.unwrap_err();
    match err {
        QdrantError::Status { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("doesn't exist"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_every_operation_propagates_transport_failure() {
    let (client, transport) = setup();
    for _ in 0..15 {
        transport.respond(Err(QdrantError::Transport("connection refused".to_string())));
    }

    let ids = [PointId::Num(1)];
    let results = vec![
        client.create_collection("c", JsonMap::new()).await,
        client.get_collection("c").await,
        client.list_collections().await,
        client.delete_collection("c").await,
        client.insert("c", None::<u64>, vec![0.1], JsonMap::new()).await,
        client.batch_insert("c", vec![NewPoint::new(vec![0.1])]).await,
        client
            .update_vectors("c", &[PointVectors::new(1u64, vec![0.1])])
            .await,
        client.delete_points("c", &ids).await,
        client.search("c", &[0.1], &SearchOptions::default()).await,
        client.recommend("c", &ids, &RecommendOptions::default()).await,
        client.get_points("c", &ids, RetrieveOptions::default()).await,
        client.scroll("c", &ScrollOptions::default()).await,
        client.count("c", &JsonMap::new()).await,
        client.create_field_index("c", "f", "keyword").await,
        client.delete_field_index("c", "f").await,
    ];

    assert_eq!(transport.count(), 15);
    for result in results {
        let err = result.unwrap_err();
        assert!(err.is_transport());
        assert!(matches!(err, QdrantError::Transport(ref m) if m == "connection refused"));
    }
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let (client, transport) = setup();
    transport.respond(Ok(b"<html>502 Bad Gateway</html>".to_vec()));

    let err = client.list_collections().await.unwrap_err();
    assert!(matches!(err, QdrantError::Decode { .. }));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test_concurrent_use_of_one_client() {
    let (client, transport) = setup();

    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move { client.insert("c", i, vec![0.5], JsonMap::new()).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(transport.count(), 8);
}

// =============================================================================
// Live Server Tests
// =============================================================================

#[tokio::test]
#[ignore = "requires a running Qdrant instance"]
async fn test_live_collection_roundtrip() {
    let client = QdrantClient::from_env().unwrap();
    let collection = format!("qdrest_test_{}", uuid::Uuid::new_v4().simple());

    client.list_collections().await.unwrap();
    client
        .create_collection(&collection, map(json!({"size": 4, "distance": "Cosine"})))
        .await
        .unwrap();

    let id = uuid::Uuid::new_v4().hyphenated().to_string();
    client
        .insert(
            &collection,
            id.as_str(),
            vec![0.1, 0.2, 0.3, 0.4],
            map(json!({"source": "qdrest"})),
        )
        .await
        .unwrap();

    let points = client
        .get_points(
            &collection,
            &[PointId::Uuid(id.clone())],
            RetrieveOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(points["result"][0]["payload"]["source"], "qdrest");

    client.delete_collection(&collection).await.unwrap();
}
