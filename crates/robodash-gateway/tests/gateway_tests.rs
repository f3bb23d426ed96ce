//! Gateway routes served on an ephemeral port against mocked upstreams.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use robodash_client::{ClientConfig, DashboardClient};
use robodash_core::User;
use robodash_gateway::api::{router, AppState};
use robodash_gateway::store::MemoryStore;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn spawn_gateway(upstream: &MockServer, users: Option<Vec<User>>) -> String {
    let mut cfg = ClientConfig::default();
    cfg.endpoints.retrieve_url = format!("{}/retrieve", upstream.uri());
    cfg.endpoints.classify_url = format!("{}/classify", upstream.uri());
    cfg.endpoints.classify_timeout_secs = 1;

    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        DashboardClient::new(&cfg),
        users,
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

async fn get(url: String) -> (u16, Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

async fn post(url: String, body: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn test_fetch_tasks_validation() {
    let upstream = MockServer::start().await;
    let base = spawn_gateway(&upstream, None).await;

    let (status, body) = get(format!("{base}/api/fetchTasks?message=SendQueue")).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "userId is required"}));

    let (status, body) = get(format!("{base}/api/fetchTasks?userId=alice&message=TaskQueue")).await;
    assert_eq!(status, 400);
    assert_eq!(
        body,
        json!({"error": "Invalid message parameter. Use SendQueue or ReceiveQueue."})
    );
}

#[tokio::test]
async fn test_fetch_tasks_proxies_queue() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/retrieve"))
        .and(query_param("message", "ReceiveQueue"))
        .and(query_param("userId", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"taskID": 5, "sender": "bob", "receiver": "alice", "status": "WaitingCollection",
             "slot": 2.0, "loadCompartment": 3}
        ])))
        .expect(2)
        .mount(&upstream)
        .await;
    let base = spawn_gateway(&upstream, None).await;

    let (status, body) = get(format!("{base}/api/fetchTasks?userId=alice&message=ReceiveQueue")).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!([{"taskID": 5, "sender": "bob", "receiver": "alice", "status": "WaitingCollection",
                "slot": 2.0, "loadCompartment": 3}])
    );

    let (status, body) = get(format!("{base}/api/fetchCollection?userId=alice")).await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_upstream_failure_is_generic_500() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&upstream)
        .await;
    let base = spawn_gateway(&upstream, None).await;

    let (status, body) = get(format!("{base}/api/fetchCollection?userId=alice")).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Failed to retrieve tasks"}));
}

#[tokio::test]
async fn test_priority_validation_and_fallback() {
    let upstream = MockServer::start().await;
    let base = spawn_gateway(&upstream, None).await;

    let (status, body) = post(format!("{base}/api/priority"), json!({"description": "   "})).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Invalid or missing description"}));

    let (status, _) = post(format!("{base}/api/priority"), json!({"description": 12})).await;
    assert_eq!(status, 400);

    // No classify mock mounted: the upstream 404s and keywords decide.
    let (status, body) = post(
        format!("{base}/api/priority"),
        json!({"description": "blood specimen"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"category": "Blood Samples", "priority": 2}));
}

#[tokio::test]
async fn test_status_accepts_both_field_names() {
    let upstream = MockServer::start().await;
    let base = spawn_gateway(&upstream, None).await;

    let (_, body) = get(format!("{base}/api/status")).await;
    assert_eq!(body["status"], json!("Waiting"));

    let (status, body) = post(format!("{base}/api/status"), json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "No message provided"}));

    let (status, body) = post(format!("{base}/api/status"), json!({"message": "Pickup"})).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"message": "Message updated successfully"}));
    let (_, body) = get(format!("{base}/api/status")).await;
    assert_eq!(body["status"], json!("Pickup"));

    post(format!("{base}/api/status"), json!({"status": "Done"})).await;
    let (_, body) = get(format!("{base}/api/status")).await;
    assert_eq!(body["status"], json!("Done"));
    assert!(body["timestamp"].is_i64());
}

#[tokio::test]
async fn test_acks_accumulate_per_user() {
    let upstream = MockServer::start().await;
    let base = spawn_gateway(&upstream, None).await;

    let (status, body) = post(format!("{base}/api/acks/alice"), json!({"task_ids": ["1", 2]})).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"user": "alice", "task_ids": ["1", 2]}));

    post(format!("{base}/api/acks/alice"), json!({"task_ids": ["1"]})).await;
    let (_, body) = get(format!("{base}/api/acks/alice")).await;
    assert_eq!(body["task_ids"], json!(["1", 2]));

    let (_, body) = get(format!("{base}/api/acks/bob")).await;
    assert_eq!(body["task_ids"], json!([]));
}

#[tokio::test]
async fn test_users_listing() {
    let upstream = MockServer::start().await;
    let base = spawn_gateway(&upstream, None).await;
    let (status, body) = get(format!("{base}/api/getUsers")).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Failed to fetch users"}));

    let users = vec![User {
        username: "alice".into(),
        email: "alice@hospital.test".into(),
    }];
    let base = spawn_gateway(&upstream, Some(users)).await;
    let (status, body) = get(format!("{base}/api/getUsers")).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!([{"username": "alice", "email": "alice@hospital.test"}]));
}
