use crate::{config::Config, create_router, state::AppState};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use registration_core::{Registration, RegistrationError, RegistrationState, Result};
use registration_oauth::OAuthError;
use registration_storage::{RocksDbStorage, StorageError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

/// Registration double: "alice" is known, "bob" never initiated, "down" hits a dead store
#[derive(Default)]
struct MockRegistration {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl Registration for MockRegistration {
    async fn initiate_registration(&self, screen_name: &str) -> Result<String> {
        self.calls.lock().unwrap().push(format!("initiate:{}", screen_name));
        match screen_name.trim() {
            "" => Err(RegistrationError::InvalidScreenName(screen_name.to_string())),
            "down" => Err(RegistrationError::StoreUnavailable(StorageError::Database(
                "closed".to_string(),
            ))),
            "slow" => Err(RegistrationError::UpstreamAuth(OAuthError::Timeout(
                Duration::from_secs(10),
            ))),
            _ => Ok("https://provider.test/oauth/authorize?oauth_token=rtk-1".to_string()),
        }
    }

    async fn finalize_registration(&self, screen_name: &str, verification_token: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("finalize:{}:{}", screen_name, verification_token));
        match (screen_name, verification_token) {
            ("bob", _) => Err(RegistrationError::NotFound("bob".to_string())),
            ("alice", "123456") => Ok(()),
            _ => Err(RegistrationError::UpstreamAuth(OAuthError::Rejected {
                status: 401,
                body: "Invalid oauth_verifier".to_string(),
            })),
        }
    }

    async fn registration_state(&self, screen_name: &str) -> Result<RegistrationState> {
        Ok(match screen_name {
            "alice" => RegistrationState::Verified,
            "carol" => RegistrationState::Pending,
            _ => RegistrationState::Absent,
        })
    }
}

struct TestApp {
    router: Router,
    registration: Arc<MockRegistration>,
    _temp_dir: TempDir,
}

fn test_app() -> TestApp {
    let (storage, temp_dir) = RocksDbStorage::open_temp().unwrap();
    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_path: temp_dir.path().to_path_buf(),
        consumer_key: "ck".to_string(),
        consumer_secret: "cs".to_string(),
        oauth_callback: "oob".to_string(),
        oauth_timeout: Duration::from_secs(1),
        store_timeout: Duration::from_secs(1),
    };
    let registration = Arc::new(MockRegistration::default());
    let state = AppState {
        config,
        storage: Arc::new(storage),
        registration: registration.clone(),
    };

    TestApp {
        router: create_router(Arc::new(state)),
        registration,
        _temp_dir: temp_dir,
    }
}

async fn send(app: &TestApp, method: &str, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

fn error_code(body: &str) -> String {
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    json["error"]["code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_returns_plain_text_url() {
    let app = test_app();

    let (status, headers, body) = send(&app, "GET", "/register?screenname=alice").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(body, "https://provider.test/oauth/authorize?oauth_token=rtk-1");
    assert_eq!(
        app.registration.calls.lock().unwrap().as_slice(),
        ["initiate:alice".to_string()]
    );
}

#[tokio::test]
async fn test_register_without_screen_name_is_bad_request() {
    let app = test_app();

    for uri in ["/register", "/register?screenname=", "/register?screenname=%20%20"] {
        let (status, _, body) = send(&app, "GET", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(error_code(&body), "INVALID_REQUEST");
    }
    assert!(app.registration.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_store_and_upstream_failures() {
    let app = test_app();

    let (status, _, body) = send(&app, "GET", "/register?screenname=down").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&body), "STORE_UNAVAILABLE");

    let (status, _, body) = send(&app, "GET", "/register?screenname=slow").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&body), "UPSTREAM_AUTH_FAILED");
}

#[tokio::test]
async fn test_settoken_created_with_location() {
    let app = test_app();

    let (status, headers, _) = send(
        &app,
        "POST",
        "/register/settoken?screenname=alice&token=123456",
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[header::LOCATION], "/register/settoken");
    assert_eq!(
        app.registration.calls.lock().unwrap().as_slice(),
        ["finalize:alice:123456".to_string()]
    );
}

#[tokio::test]
async fn test_settoken_unknown_screen_name_is_not_found() {
    let app = test_app();

    let (status, _, body) = send(&app, "POST", "/register/settoken?screenname=bob&token=xyz").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_settoken_rejected_verifier_is_unauthorized() {
    let app = test_app();

    let (status, _, body) = send(
        &app,
        "POST",
        "/register/settoken?screenname=alice&token=wrong",
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UPSTREAM_AUTH_REJECTED");
}

#[tokio::test]
async fn test_settoken_missing_token_is_bad_request() {
    let app = test_app();

    let (status, _, body) = send(&app, "POST", "/register/settoken?screenname=alice").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_REQUEST");
    assert!(app.registration.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_status_reports_state() {
    let app = test_app();

    let (status, _, body) = send(&app, "GET", "/register/status?screenname=carol").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["screen_name"], "carol");
    assert_eq!(json["state"], "pending");

    let (_, _, body) = send(&app, "GET", "/register/status?screenname=dave").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["state"], "absent");
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = test_app();

    let (status, _, body) = send(&app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"ok\""));

    let (status, _, body) = send(&app, "GET", "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("connected"));
}
