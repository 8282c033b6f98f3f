//! End-to-end tests for the HTTP API
//!
//! Each test builds a media root in a temporary directory and drives the
//! full router, middleware included, with `oneshot`.

use std::fs::{create_dir_all, write};
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use racc::{Catalog, RaccError, RequestCounter};
use serde_json::Value;
use server::{build_router, ServerConfig, ServerState};
use tempfile::TempDir;
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;

const IMAGE_SIZES: [(u32, u32); 5] = [(8, 6), (4, 4), (10, 2), (3, 7), (5, 5)];

/// Five images, one transparent image and two videos (`.mp4` and `.mov`)
fn media_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    create_dir_all(root.join("transparent")).unwrap();
    create_dir_all(root.join("videos")).unwrap();

    for (i, (w, h)) in IMAGE_SIZES.iter().enumerate() {
        image::RgbImage::new(*w, *h)
            .save(root.join(format!("racc{}.jpg", i + 1)))
            .unwrap();
    }
    image::RgbaImage::new(3, 2)
        .save(root.join("transparent/racc1.png"))
        .unwrap();
    write(root.join("videos/racc1.mp4"), b"mp4 bytes").unwrap();
    write(root.join("videos/racc2.mov"), b"mov bytes").unwrap();
    write(
        root.join("alt.json"),
        r#"{"1": "raccoon in a bin", "2": "raccoon on a fence"}"#,
    )
    .unwrap();
    dir
}

fn config_for(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        media_root: dir.path().to_path_buf(),
        alt_text_path: dir.path().join("alt.json"),
        rate_limit_max: 1000,
        ..Default::default()
    }
}

fn app(config: ServerConfig) -> Router {
    let state = ServerState::new(config).expect("state");
    build_router(Arc::new(state))
}

async fn get(app: &Router, uri: &str, json: bool) -> (StatusCode, HeaderMap, Bytes) {
    let mut builder = Request::builder().uri(uri).header("host", "racc.test");
    if json {
        builder = builder.header("accept", "application/json");
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
    let (status, headers, body) = get(app, uri, true).await;
    let value = serde_json::from_slice(&body).unwrap();
    (status, headers, value)
}

/// Collects formatted log lines for assertions
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// JSON subscriber scoped to the current thread
fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::INFO)
        .with_writer(capture.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}

/// Store that is always unreachable
struct FailingCounter;

#[async_trait]
impl RequestCounter for FailingCounter {
    async fn increment(&self) -> racc::Result<u64> {
        Err(RaccError::Storage("connection refused by store-01".into()))
    }

    async fn read(&self) -> racc::Result<u64> {
        Err(RaccError::Storage("connection refused by store-01".into()))
    }
}

fn index_header(headers: &HeaderMap, name: &str) -> u32 {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap()
}

#[tokio::test]
async fn test_greetings() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, _, body) = get_json(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "trash panda discovered! you've found the api."
    );

    let (_, _, body) = get_json(&app, "/v1").await;
    assert_eq!(
        body["message"],
        "trash pandas favourite v1, welcome to the trash can."
    );
}

#[tokio::test]
async fn test_listing_returns_requested_range_in_order() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, _, body) = get_json(&app, "/v1/raccoons?from=1&take=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = body["data"].as_array().unwrap();
    let indices: Vec<u64> = data.iter().map(|m| m["index"].as_u64().unwrap()).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);

    assert_eq!(data[0]["url"], "http://racc.test/v1/raccoon/1");
    assert_eq!(data[0]["width"], 8);
    assert_eq!(data[0]["height"], 6);
    assert_eq!(data[0]["alt"], "raccoon in a bin");
    assert_eq!(data[2]["width"], 10);
    assert_eq!(data[2]["alt"], "a raccoon");
}

#[tokio::test]
async fn test_random_listing_stays_in_bounds() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, _, body) = get_json(&app, "/v1/raccoons?take=20&random=true").await;
    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert!(!data.is_empty());
    for meta in data {
        let index = meta["index"].as_u64().unwrap();
        assert!((1..=5).contains(&index), "index {index} out of range");
    }
}

#[tokio::test]
async fn test_listing_rejects_malformed_query() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, _, body) = get_json(&app, "/v1/raccoons?take=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_every_listed_index_resolves() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (_, _, body) = get_json(&app, "/v1/raccoons").await;
    let data = body["data"].as_array().unwrap().clone();
    assert_eq!(data.len(), 5);

    for meta in data {
        let url = meta["url"].as_str().unwrap();
        let path = url.trim_start_matches("http://racc.test");
        let (status, _, single) = get_json(&app, path).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(single["data"], meta);
    }
}

#[tokio::test]
async fn test_random_image_binary() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, headers, body) = get(&app, "/v1/raccoon", false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "image/jpeg");
    assert!(!body.is_empty());

    let index = index_header(&headers, "x-raccoon-index");
    assert!((1..=5).contains(&index));
}

#[tokio::test]
async fn test_random_transparent_image() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, headers, _) = get(&app, "/v1/raccoon?transparent=true", false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "image/png");
    assert_eq!(index_header(&headers, "x-raccoon-index"), 1);

    let (status, _, body) = get_json(&app, "/v1/raccoon/transparent/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["url"],
        "http://racc.test/v1/raccoon/transparent/1"
    );
    assert_eq!(body["data"]["width"], 3);
    assert_eq!(body["data"]["height"], 2);
}

#[tokio::test]
async fn test_json_query_flag_negotiates() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, headers, body) = get(&app, "/v1/raccoon/2?json=true", false).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["index"], 2);
    assert_eq!(body["data"]["alt"], "raccoon on a fence");
}

#[tokio::test]
async fn test_missing_file_binary_is_bare_500() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, headers, body) = get(&app, "/v1/raccoon/9999", false).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
    assert_eq!(index_header(&headers, "x-raccoon-index"), 9999);
}

#[tokio::test]
async fn test_missing_file_json_is_failure_envelope() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, _, body) = get_json(&app, "/v1/raccoon/9999").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "An error occurred whilst fetching file");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_strict_policy_rejects_out_of_range() {
    let dir = media_root();
    let config = ServerConfig {
        strict_index: true,
        ..config_for(&dir)
    };
    let app = app(config);

    let (status, _, body) = get_json(&app, "/v1/raccoon/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _, _) = get(&app, "/v1/raccoon/0", false).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = get(&app, "/v1/raccoon/5", false).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_non_numeric_index_is_bad_request() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, _, body) = get(&app, "/v1/raccoon/abc", false).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());

    let (status, _, body) = get_json(&app, "/v1/video/-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_video_extension_fallback() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, headers, body) = get(&app, "/v1/video/1", false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "video/mp4");
    assert_eq!(&body[..], b"mp4 bytes");
    assert_eq!(index_header(&headers, "x-raccoon-video-index"), 1);

    let (status, headers, body) = get(&app, "/v1/video/2", false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "video/quicktime");
    assert_eq!(&body[..], b"mov bytes");

    let (status, _, body) = get_json(&app, "/v1/video/3").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "An error occurred whilst fetching video file");
}

#[tokio::test]
async fn test_video_json_metadata() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, headers, body) = get_json(&app, "/v1/video").await;
    assert_eq!(status, StatusCode::OK);
    let index = index_header(&headers, "x-raccoon-video-index");
    assert!((1..=2).contains(&index));
    assert_eq!(body["data"]["index"], index);
    assert_eq!(
        body["data"]["url"],
        format!("http://racc.test/v1/video/{index}")
    );
    assert!(body["data"].get("width").is_none());
}

#[tokio::test]
async fn test_time_bucketed_images() {
    let dir = media_root();
    let app = app(config_for(&dir));

    for uri in ["/v1/raccoftheday", "/v1/racchour", "/v1/raccofthehour"] {
        let (status, headers, _) = get(&app, uri, false).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(headers["content-type"], "image/jpeg");
        let index = index_header(&headers, "x-raccoon-index");
        assert!((1..=5).contains(&index));
    }
}

#[tokio::test]
async fn test_facts() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, _, body) = get_json(&app, "/v1/fact").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["fact"].as_str().is_some_and(|f| !f.is_empty()));

    let (_, _, body) = get_json(&app, "/v1/facts?from=0&take=5").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["data"][0], racc::FACTS[0]);

    let (_, _, body) = get_json(&app, "/v1/facts?from=1000").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_stats_placeholder_without_store() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, _, body) = get_json(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let placeholder = body["Requests"].as_str().unwrap();
    assert!(racc::PLACEHOLDERS.contains(&placeholder));
    assert_eq!(body["Images"], 6);
    assert_eq!(body["TransparentImages"], 2);
    assert_eq!(body["Videos"], 3);
}

#[tokio::test]
async fn test_counter_counts_requests_except_favicon() {
    let dir = media_root();
    let config = ServerConfig {
        store_url: Some("memory://".to_string()),
        ..config_for(&dir)
    };
    let app = app(config);

    get(&app, "/", false).await;
    get(&app, "/favicon.ico", false).await;
    get(&app, "/v1/raccoon/1", false).await;

    let (_, _, body) = get_json(&app, "/stats").await;
    assert_eq!(body["Requests"], 3);
}

#[tokio::test]
async fn test_rate_limit_per_client() {
    let dir = media_root();
    let config = ServerConfig {
        rate_limit_max: 2,
        ..config_for(&dir)
    };
    let app = app(config);

    let request = |ip: &str| {
        Request::builder()
            .uri("/v1")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    let before = chrono::Utc::now().timestamp_millis();
    for remaining in ["1", "0"] {
        let response = app.clone().oneshot(request("198.51.100.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-limit"], "2");
        assert_eq!(response.headers()["x-ratelimit-remaining"], remaining);
        assert!(response.headers().get("retry-after").is_none());
    }

    let response = app.clone().oneshot(request("198.51.100.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let headers = response.headers();
    assert_eq!(headers["x-ratelimit-limit"], "2");
    assert_eq!(headers["x-ratelimit-remaining"], "0");
    let retry_after: u64 = headers["retry-after"].to_str().unwrap().parse().unwrap();
    assert!((1..=30).contains(&retry_after));
    let reset: i64 = headers["x-ratelimit-reset"].to_str().unwrap().parse().unwrap();
    assert!(reset > before && reset <= chrono::Utc::now().timestamp_millis() + 30_000);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["message"], "You are being rate limited");

    let response = app.clone().oneshot(request("198.51.100.2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let (status, _, body) = get_json(&app, "/v2/raccoon").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Endpoint not found");
}

#[tokio::test]
async fn test_request_id_and_cors_headers() {
    let dir = media_root();
    let app = app(config_for(&dir));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "https://example.org")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "abc-123");
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_logs_carry_request_id() {
    let (logs, _guard) = capture_logs();
    let dir = media_root();
    let app = app(config_for(&dir));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let output = logs.contents();
    let lines: Vec<&str> = output
        .lines()
        .filter(|line| line.contains("Request started") || line.contains("Request completed"))
        .collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        assert!(line.contains(r#""request_id":"abc-123""#), "{line}");
    }
}

#[tokio::test]
async fn test_missing_store_is_logged_after_subscriber_starts() {
    let (logs, _guard) = capture_logs();
    let dir = media_root();
    let state = ServerState::new(config_for(&dir)).unwrap();

    assert!(!state.counting_enabled());
    assert!(logs.contents().contains("No store configured"));
}

#[tokio::test]
async fn test_failing_counter_negotiates_500() {
    let dir = media_root();
    let config = config_for(&dir);
    let catalog = Catalog::open(&config.catalog_options());
    let state = ServerState::with_parts(config, catalog, Some(Arc::new(FailingCounter)));
    let app = build_router(Arc::new(state));

    let (status, headers, body) = get(&app, "/v1/raccoon/1", false).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
    assert!(headers.get("content-type").is_none());

    let (status, _, body) = get_json(&app, "/v1/raccoon/1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "An error occurred whilst counting the request");
    assert!(!body.to_string().contains("store-01"));

    let (status, _, body) = get(&app, "/v1/raccoon/1?json=true", false).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_media_bodies_are_not_compressed() {
    let dir = media_root();
    write(dir.path().join("videos/racc1.mp4"), vec![7u8; 4096]).unwrap();
    let app = app(config_for(&dir));

    let fetch = |uri: &str, accept: &str| {
        Request::builder()
            .uri(uri)
            .header("accept", accept)
            .header("accept-encoding", "gzip")
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(fetch("/v1/video/1", "*/*")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "video/mp4");
    assert!(response.headers().get("content-encoding").is_none());
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.len(), 4096);

    let response = app.clone().oneshot(fetch("/v1/raccoon/1", "*/*")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("content-encoding").is_none());

    let response = app
        .clone()
        .oneshot(fetch("/v1/raccoons?from=1&take=5", "application/json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-encoding"], "gzip");
}
