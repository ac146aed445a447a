//! Common test utilities for E2E tests

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::{Duration, Utc};
use flowdev::{AppState, auth, config};
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const TEST_SESSION_SECRET: &str = "test-secret-key-32-bytes-long!!!";
pub const TEST_USER_ID: &str = "11111111-2222-3333-4444-555555555555";
pub const TEST_ACCESS_TOKEN: &str = "stub-access-token";
pub const GOOD_OAUTH_CODE: &str = "good-oauth-code";

// =============================================================================
// Stub auth provider
// =============================================================================

/// Mutable state behind the stub provider
#[derive(Default)]
pub struct StubProviderState {
    /// (email, password) pairs accepted for password sign-in
    pub users: Vec<(String, String)>,
    /// Whether the stub user currently has a GitHub identity
    pub github_linked: bool,
    /// Email reported for the stub user
    pub email: Option<String>,
    /// Call counters, for asserting the provider was (not) reached
    pub signup_calls: usize,
    pub token_calls: usize,
}

/// In-process stand-in for the hosted auth provider
///
/// Serves the handful of GoTrue-style endpoints the app client calls.
#[derive(Clone, Default)]
pub struct StubProvider {
    pub state: Arc<Mutex<StubProviderState>>,
}

impl StubProvider {
    fn user_json(state: &StubProviderState) -> serde_json::Value {
        let mut identities = vec![json!({
            "identity_id": "identity-email",
            "provider": "email",
        })];
        if state.github_linked {
            identities.push(json!({
                "identity_id": "identity-github",
                "provider": "github",
            }));
        }

        json!({
            "id": TEST_USER_ID,
            "email": state.email.as_deref().unwrap_or("user@example.com"),
            "confirmed_at": "2026-01-01T00:00:00Z",
            "identities": identities,
        })
    }

    fn session_json(state: &StubProviderState) -> serde_json::Value {
        json!({
            "access_token": TEST_ACCESS_TOKEN,
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "stub-refresh-token",
            "user": Self::user_json(state),
        })
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/auth/v1/signup", post(stub_signup))
            .route("/auth/v1/token", post(stub_token))
            .route("/auth/v1/user", get(stub_user))
            .route("/auth/v1/user/identities/:id", delete(stub_unlink))
            .with_state(self.clone())
    }

    /// Serve the stub on an ephemeral port, returning its base URL.
    async fn spawn(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = self.router();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }
}

async fn stub_signup(
    State(stub): State<StubProvider>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let mut state = stub.state.lock().unwrap();
    state.signup_calls += 1;

    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    if state.users.iter().any(|(known, _)| *known == email) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "msg": "User already registered" })),
        )
            .into_response();
    }

    state.users.push((email.clone(), password));
    state.email = Some(email);
    Json(StubProvider::session_json(&state)).into_response()
}

#[derive(serde::Deserialize)]
struct TokenQuery {
    grant_type: String,
}

async fn stub_token(
    State(stub): State<StubProvider>,
    Query(query): Query<TokenQuery>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let mut state = stub.state.lock().unwrap();
    state.token_calls += 1;

    match query.grant_type.as_str() {
        "password" => {
            let email = body["email"].as_str().unwrap_or_default();
            let password = body["password"].as_str().unwrap_or_default();

            let known = state
                .users
                .iter()
                .any(|(e, p)| e == email && p == password);
            if !known {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error_description": "Invalid login credentials" })),
                )
                    .into_response();
            }

            state.email = Some(email.to_string());
            Json(StubProvider::session_json(&state)).into_response()
        }
        "pkce" => {
            let code = body["auth_code"].as_str().unwrap_or_default();
            let verifier = body["code_verifier"].as_str().unwrap_or_default();

            if code != GOOD_OAUTH_CODE || verifier.is_empty() {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error_description": "invalid flow state" })),
                )
                    .into_response();
            }

            // A completed GitHub OAuth dance links the identity
            state.github_linked = true;
            if state.email.is_none() {
                state.email = Some("user@example.com".to_string());
            }
            Json(StubProvider::session_json(&state)).into_response()
        }
        other => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error_description": format!("unsupported grant type {other}") })),
        )
            .into_response(),
    }
}

async fn stub_user(State(stub): State<StubProvider>, headers: HeaderMap) -> Response {
    let authorized = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TEST_ACCESS_TOKEN}"));

    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "msg": "invalid JWT" }))).into_response();
    }

    let state = stub.state.lock().unwrap();
    Json(StubProvider::user_json(&state)).into_response()
}

async fn stub_unlink(
    State(stub): State<StubProvider>,
    Path(identity_id): Path<String>,
) -> Response {
    let mut state = stub.state.lock().unwrap();
    if identity_id == "identity-github" {
        state.github_linked = false;
    }
    Json(json!({})).into_response()
}

// =============================================================================
// Test server
// =============================================================================

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub provider: StubProvider,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance backed by a stub auth provider
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Boot the stub provider first; the app needs its URL
        let provider = StubProvider::default();
        let provider_url = provider.spawn().await;

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            provider: config::ProviderConfig {
                url: provider_url,
                anon_key: "test-anon-key".to_string(),
            },
            auth: config::AuthConfig {
                session_secret: TEST_SESSION_SECRET.to_string(),
                session_max_age: 604800,
                github_scopes: "repo:status public_repo".to_string(),
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config.clone()).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = flowdev::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            provider,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Register a user with the stub provider
    pub fn seed_user(&self, email: &str, password: &str) {
        let mut state = self.provider.state.lock().unwrap();
        state.users.push((email.to_string(), password.to_string()));
    }

    /// Mark the stub user's GitHub identity as linked
    pub fn link_github(&self) {
        self.provider.state.lock().unwrap().github_linked = true;
    }

    /// Build a valid session cookie for the stub user
    pub fn session_cookie(&self, email: &str) -> String {
        let now = Utc::now();
        let session = auth::Session {
            user_id: TEST_USER_ID.to_string(),
            email: email.to_string(),
            access_token: TEST_ACCESS_TOKEN.to_string(),
            refresh_token: Some("stub-refresh-token".to_string()),
            created_at: now,
            expires_at: now + Duration::hours(1),
        };
        let token = auth::create_session_token(&session, TEST_SESSION_SECRET).unwrap();
        format!("session={token}")
    }
}

/// Client that surfaces redirects instead of following them
pub fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("failed to build no-redirect client")
}
