//! End-to-end pipeline tests against a mock Elasticsearch

use async_trait::async_trait;
use bson::{doc, DateTime, Document};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sluice::schema::observe_documents;
use sluice::{DocumentStore, ElasticClient, FieldObservation, SyncOptions, SyncRunner};

struct MemoryStore {
    collections: Vec<(String, Vec<Document>)>,
}

impl MemoryStore {
    fn new(collections: Vec<(&str, Vec<Document>)>) -> Self {
        Self {
            collections: collections
                .into_iter()
                .map(|(name, docs)| (name.to_string(), docs))
                .collect(),
        }
    }

    fn docs(&self, collection: &str) -> &[Document] {
        self.collections
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, docs)| docs.as_slice())
            .unwrap_or(&[])
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn collection_names(&self) -> sluice::Result<Vec<String>> {
        Ok(self.collections.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn probe(&self, collection: &str) -> sluice::Result<Vec<FieldObservation>> {
        Ok(observe_documents(self.docs(collection)))
    }

    async fn fetch_all(&self, collection: &str) -> sluice::Result<Vec<Document>> {
        Ok(self.docs(collection).to_vec())
    }

    async fn estimated_count(&self, collection: &str) -> sluice::Result<u64> {
        Ok(self.docs(collection).len() as u64)
    }
}

fn users_store() -> MemoryStore {
    MemoryStore::new(vec![(
        "users",
        vec![doc! {
            "_id": "1",
            "name": "Ann",
            "age": 30,
            "signup": DateTime::from_millis(1_700_000_000_000),
        }],
    )])
}

fn bulk_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "took": 1,
        "errors": false,
        "items": []
    }))
}

#[tokio::test]
async fn test_fresh_index_sync_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/users/_mapping"))
        .and(body_partial_json(json!({
            "properties": {
                "name": { "type": "text" },
                "age": { "type": "double" },
                "signup": { "type": "date" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(query_param("refresh", "true"))
        .and(body_string_contains("\"_id\":\"1\""))
        .and(body_string_contains("\"name\":\"Ann\""))
        .and(body_string_contains("2023-11-14T22:13:20.000Z"))
        .respond_with(bulk_ok())
        .expect(1)
        .mount(&server)
        .await;

    let store = users_store();
    let search = ElasticClient::new(&server.uri()).unwrap();
    let runner = SyncRunner::new(
        &store,
        &search,
        SyncOptions {
            singularize: false,
            quiet: true,
        },
    );

    let report = runner.run().await.unwrap();

    assert_eq!(report.collections.len(), 1);
    assert_eq!(report.collections[0].collection, "users");
    assert_eq!(report.collections[0].index, "users");
    assert_eq!(report.collections[0].documents, 1);

    // The bulk payload line must not carry the stripped identity field
    let requests = server.received_requests().await.unwrap();
    let bulk = requests
        .iter()
        .find(|r| r.url.path() == "/_bulk")
        .expect("bulk request sent");
    let body = String::from_utf8(bulk.body.clone()).unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    let payload: Value = serde_json::from_str(lines[1]).unwrap();
    assert!(payload.get("_id").is_none());
    assert_eq!(payload["age"], 30);
}

#[tokio::test]
async fn test_singularized_sync_resets_existing_index_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/user/_mapping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(body_string_contains("\"_index\":\"user\""))
        .respond_with(bulk_ok())
        .expect(1)
        .mount(&server)
        .await;

    let store = users_store();
    let search = ElasticClient::new(&server.uri()).unwrap();
    let runner = SyncRunner::new(
        &store,
        &search,
        SyncOptions {
            singularize: true,
            quiet: true,
        },
    );

    let report = runner.run().await.unwrap();
    assert_eq!(report.collections[0].index, "user");
    assert_eq!(report.collections[0].documents, 1);

    // Deletion strictly precedes recreation, mapping precedes the write
    let requests = server.received_requests().await.unwrap();
    let sequence: Vec<(String, String)> = requests
        .iter()
        .map(|r| (r.method.to_string(), r.url.path().to_string()))
        .collect();
    assert_eq!(
        sequence,
        vec![
            ("HEAD".to_string(), "/user".to_string()),
            ("DELETE".to_string(), "/user".to_string()),
            ("PUT".to_string(), "/user".to_string()),
            ("PUT".to_string(), "/user/_mapping".to_string()),
            ("POST".to_string(), "/_bulk".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_bulk_error_halts_remaining_collections() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/users/_mapping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 1,
            "errors": true,
            "items": [{
                "index": {
                    "_id": "1",
                    "status": 400,
                    "error": {
                        "type": "mapper_parsing_exception",
                        "reason": "failed to parse"
                    }
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    // The second collection must never be touched
    Mock::given(method("HEAD"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryStore::new(vec![
        ("users", vec![doc! { "_id": "1", "name": "Ann" }]),
        ("posts", vec![doc! { "_id": "2", "title": "Hi" }]),
    ]);
    let search = ElasticClient::new(&server.uri()).unwrap();
    let runner = SyncRunner::new(
        &store,
        &search,
        SyncOptions {
            singularize: false,
            quiet: true,
        },
    );

    let err = runner.run().await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("users"), "unexpected error: {}", message);
    assert!(message.contains("failed to parse"), "unexpected error: {}", message);
}

#[tokio::test]
async fn test_empty_collection_skips_bulk_write() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/empty/_mapping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(bulk_ok())
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryStore::new(vec![("empty", vec![])]);
    let search = ElasticClient::new(&server.uri()).unwrap();
    let runner = SyncRunner::new(
        &store,
        &search,
        SyncOptions {
            singularize: false,
            quiet: true,
        },
    );

    let report = runner.run().await.unwrap();
    assert_eq!(report.collections[0].documents, 0);
}
