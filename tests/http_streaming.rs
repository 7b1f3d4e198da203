/// HTTP Event Stream Integration Tests
///
/// These tests start the API on an ephemeral port and verify:
/// - Token authentication
/// - Live delivery over server-sent events
/// - Manual publishing and the status endpoint
/// - Unsubscribe on client disconnect
use std::time::Duration;

use futures_util::StreamExt;
use reviewhub::api::events::{PublishResponse, StatusResponse};
use reviewhub::config::Settings;
use reviewhub::hub::{Hub, ImportEvent, ReviewEvent};
use reviewhub::AppState;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};

const TOKEN: &str = "test-token";

struct TestServer {
    base_url: String,
    reviews: Hub<ReviewEvent>,
    imports: Hub<ImportEvent>,
}

/// Test helper: Start the API with fresh hubs
async fn start_server() -> TestServer {
    let settings = Settings {
        user_token: TOKEN.to_string(),
        keep_alive_secs: 1,
        ..Settings::default()
    };
    let reviews: Hub<ReviewEvent> = Hub::for_kind();
    let imports: Hub<ImportEvent> = Hub::for_kind();
    let state = AppState::with_hubs(settings, reviews.clone(), imports.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(reviewhub::serve(listener, state));

    TestServer {
        base_url,
        reviews,
        imports,
    }
}

/// Test helper: Read SSE chunks until a `data:` line for `kind` shows up
async fn next_event(
    stream: &mut (impl futures_util::Stream<Item = reqwest::Result<bytes::Bytes>> + Unpin),
    buffer: &mut String,
    kind: &str,
) -> serde_json::Value {
    let marker = format!("event: {kind}\ndata: ");
    loop {
        if let Some(start) = buffer.find(&marker) {
            let rest = &buffer[start + marker.len()..];
            if let Some(end) = rest.find('\n') {
                let value = serde_json::from_str(&rest[..end]).unwrap();
                let consumed = start + marker.len() + end + 1;
                buffer.drain(..consumed);
                return value;
            }
        }
        let chunk = stream.next().await.expect("stream ended").unwrap();
        buffer.push_str(&String::from_utf8_lossy(&chunk));
    }
}

#[tokio::test]
async fn test_health_check() {
    let server = start_server().await;
    let body: serde_json::Value = reqwest::get(format!("{}/api", server.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_stream_requires_token() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/events/reviews", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");

    let response = client
        .get(format!("{}/api/events/imports?token=wrong", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(server.imports.client_count(), 0);
}

#[tokio::test]
async fn test_review_stream_delivers_live_events() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/events/reviews?token={}", server.base_url, TOKEN))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(server.reviews.client_count(), 1);

    let mut stream = Box::pin(response.bytes_stream());
    let mut buffer = String::new();

    server
        .reviews
        .publish(ReviewEvent::completed(1, 2, "abc123", 85.0));

    let event = timeout(
        Duration::from_secs(5),
        next_event(&mut stream, &mut buffer, "review"),
    )
    .await
    .unwrap();

    assert_eq!(event["status"], "completed");
    assert_eq!(event["score"], 85.0);
    assert_eq!(event["commit_hash"], "abc123");
}

#[tokio::test]
async fn test_publish_endpoint_feeds_import_stream() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/events/imports", server.base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    let mut stream = Box::pin(response.bytes_stream());
    let mut buffer = String::new();

    let published: PublishResponse = client
        .post(format!("{}/api/events/imports", server.base_url))
        .bearer_auth(TOKEN)
        .json(&json!({
            "project_id": 5,
            "project_name": "backend",
            "imported": 31,
            "skipped": 4,
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(published.clients, 1);

    let event = timeout(
        Duration::from_secs(5),
        next_event(&mut stream, &mut buffer, "import"),
    )
    .await
    .unwrap();

    assert_eq!(event["project_name"], "backend");
    assert_eq!(event["imported"], 31);
    assert_eq!(event["skipped"], 4);
    assert!(event.get("error").is_none());
}

#[tokio::test]
async fn test_publish_review_rejects_empty_commit() {
    let server = start_server().await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/events/reviews", server.base_url))
        .bearer_auth(TOKEN)
        .json(&json!({
            "review_id": 1,
            "project_id": 1,
            "commit_hash": "  ",
            "status": "pending",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_reports_hub_counters() {
    let server = start_server().await;
    let _idle = server.imports.subscribe("idle-reader");
    for i in 0..12 {
        server
            .imports
            .publish(ImportEvent::new(1, "backend", i, 0, None));
    }

    let status: StatusResponse = reqwest::Client::new()
        .get(format!("{}/api/events/status", server.base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status.reviews.clients, 0);
    assert_eq!(status.reviews.capacity, 100);
    assert_eq!(status.imports.clients, 1);
    assert_eq!(status.imports.capacity, 10);
    assert_eq!(status.imports.dropped, 2);
}

#[tokio::test]
async fn test_disconnect_unsubscribes() {
    let server = start_server().await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/events/reviews?token={}", server.base_url, TOKEN))
        .send()
        .await
        .unwrap();
    assert_eq!(server.reviews.client_count(), 1);

    drop(response);

    // The server notices on its next write (a keep-alive at the latest).
    let released = timeout(Duration::from_secs(10), async {
        while server.reviews.client_count() != 0 {
            sleep(Duration::from_millis(100)).await;
        }
    })
    .await;
    assert!(released.is_ok(), "subscription was not released");
}
