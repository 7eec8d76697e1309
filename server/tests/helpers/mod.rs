//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for sending requests through the full axum router, a
//! `FakeBackend` standing in for the identity service, and cookie utilities.
//!
//! ## Test Servers
//!
//! The fake backend runs on a real socket via [`spawn_test_server()`] since
//! the server talks to it over HTTP.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{self, header, HeaderMap, Method, Request, Response, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::Cookie;
use bo_common::{GrantedPermission, User};
use bo_server::api::{create_router, AppState};
use bo_server::backend::BackendClient;
use bo_server::config::Config;
use bo_server::navigation::default_navigation;
use bo_server::session::SessionStorage;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "correct horse battery staple";

// ============================================================================
// Test Server
// ============================================================================

/// A running test server bound to a random port.
pub struct TestServer {
    /// Server address (127.0.0.1:PORT).
    pub addr: SocketAddr,
    /// Base URL for HTTP requests (e.g., `http://127.0.0.1:12345`).
    pub url: String,
    /// Handle to the server task for cleanup.
    _handle: JoinHandle<()>,
}

/// Spawn a real HTTP server on a random port.
pub async fn spawn_test_server(router: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");
    let url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    TestServer {
        addr,
        url,
        _handle: handle,
    }
}

// ============================================================================
// Fake identity service
// ============================================================================

#[derive(Clone)]
struct Account {
    password: String,
    employee_id: Uuid,
    user: User,
}

#[derive(Default)]
struct FakeState {
    accounts: Mutex<HashMap<String, Account>>,
    /// Auth session ID -> user ID.
    auth_sessions: Mutex<HashMap<String, Uuid>>,
    /// Bearer token -> user ID.
    tokens: Mutex<HashMap<String, Uuid>>,
    /// TTL for tokens issued at login, in seconds.
    login_token_ttl: Mutex<Option<i64>>,
    refresh_calls: AtomicUsize,
    revoked: Mutex<Vec<String>>,
}

/// In-memory stand-in for the identity service.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<FakeState>,
}

impl FakeBackend {
    /// Register an account and return its user ID.
    pub fn add_user(&self, email: &str, codes: &[&str]) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            display_name: Some(email.split('@').next().unwrap_or(email).to_string()),
            permissions: codes
                .iter()
                .map(|code| GrantedPermission::new(*code, *code))
                .collect(),
        };
        let id = user.id;

        self.state.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                password: PASSWORD.to_string(),
                employee_id: Uuid::new_v4(),
                user,
            },
        );
        id
    }

    /// Issue login tokens expiring `seconds` from now.
    pub fn set_login_token_ttl(&self, seconds: i64) {
        *self.state.login_token_ttl.lock().unwrap() = Some(seconds);
    }

    /// Invalidate every bearer token issued so far.
    pub fn revoke_all_tokens(&self) {
        self.state.tokens.lock().unwrap().clear();
        self.state.auth_sessions.lock().unwrap().clear();
    }

    /// Number of token refreshes served.
    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    /// Auth session IDs revoked through logout.
    pub fn revoked_sessions(&self) -> Vec<String> {
        self.state.revoked.lock().unwrap().clone()
    }

    fn issue_token(&self, user_id: Uuid, ttl: i64) -> Value {
        let token = Uuid::new_v4().simple().to_string();
        self.state
            .tokens
            .lock()
            .unwrap()
            .insert(token.clone(), user_id);
        json!({ "token": token, "expiresAt": Utc::now() + Duration::seconds(ttl) })
    }

    fn bearer_user(&self, headers: &HeaderMap) -> Option<Uuid> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        self.state.tokens.lock().unwrap().get(token).copied()
    }

    fn router(self) -> Router {
        Router::new()
            .route("/auth/login", post(fake_login))
            .route("/auth/sessions/{id}/token", post(fake_refresh))
            .route("/auth/sessions/{id}", delete(fake_logout))
            .route("/users/{id}", get(fake_user))
            .route("/roles/{id}/{action}", post(fake_role_action))
            .with_state(self)
    }
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Invalid token" })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct FakeLogin {
    email: String,
    password: String,
}

async fn fake_login(
    State(fake): State<FakeBackend>,
    Json(body): Json<FakeLogin>,
) -> axum::response::Response {
    let account = fake.state.accounts.lock().unwrap().get(&body.email).cloned();
    let Some(account) = account.filter(|account| account.password == body.password) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Bad credentials" })),
        )
            .into_response();
    };

    let auth_session_id = Uuid::new_v4().to_string();
    fake.state
        .auth_sessions
        .lock()
        .unwrap()
        .insert(auth_session_id.clone(), account.user.id);

    let ttl = (*fake.state.login_token_ttl.lock().unwrap()).unwrap_or(3600);
    let token = fake.issue_token(account.user.id, ttl);

    Json(json!({
        "userId": account.user.id,
        "employeeId": account.employee_id,
        "authSessionId": auth_session_id,
        "accessToken": token["token"],
        "expiresAt": token["expiresAt"],
    }))
    .into_response()
}

async fn fake_refresh(
    State(fake): State<FakeBackend>,
    Path(auth_session_id): Path<String>,
) -> axum::response::Response {
    let user_id = fake
        .state
        .auth_sessions
        .lock()
        .unwrap()
        .get(&auth_session_id)
        .copied();
    let Some(user_id) = user_id else {
        return unauthorized();
    };

    fake.state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    Json(fake.issue_token(user_id, 3600)).into_response()
}

async fn fake_logout(
    State(fake): State<FakeBackend>,
    Path(auth_session_id): Path<String>,
) -> StatusCode {
    fake.state.auth_sessions.lock().unwrap().remove(&auth_session_id);
    fake.state.revoked.lock().unwrap().push(auth_session_id);
    StatusCode::NO_CONTENT
}

async fn fake_user(
    State(fake): State<FakeBackend>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
) -> axum::response::Response {
    if fake.bearer_user(&headers).is_none() {
        return unauthorized();
    }

    let account = fake
        .state
        .accounts
        .lock()
        .unwrap()
        .values()
        .find(|account| account.user.id == user_id)
        .cloned();
    match account {
        Some(account) => Json(account.user).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "User not found" })),
        )
            .into_response(),
    }
}

async fn fake_role_action(
    State(fake): State<FakeBackend>,
    headers: HeaderMap,
    Path((role_id, action)): Path<(Uuid, String)>,
) -> axum::response::Response {
    if fake.bearer_user(&headers).is_none() {
        return unauthorized();
    }

    Json(json!({
        "id": role_id,
        "name": "Scrum Master",
        "active": action == "activate",
    }))
    .into_response()
}

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router and its fake backend.
pub struct TestApp {
    pub router: Router,
    pub config: Arc<Config>,
    pub sessions: SessionStorage,
    pub backend: FakeBackend,
    _backend_server: TestServer,
}

impl TestApp {
    /// Create a new test app with a fresh fake backend.
    pub async fn new() -> Self {
        Self::with_config(Config::default_for_test()).await
    }

    /// Create a test app with a custom config. `backend_url` is overridden.
    pub async fn with_config(mut config: Config) -> Self {
        let backend = FakeBackend::default();
        let server = spawn_test_server(backend.clone().router()).await;
        config.backend_url = server.url.clone();

        let sessions = SessionStorage::new(&config);
        let client = BackendClient::new(&config).expect("Failed to build backend client");
        let state = AppState::new(
            config.clone(),
            sessions.clone(),
            client,
            default_navigation(),
        );

        Self {
            router: create_router(state),
            config: Arc::new(config),
            sessions,
            backend,
            _backend_server: server,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// GET `uri`, optionally with a session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Self::request(Method::GET, uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.oneshot(builder.body(Body::empty()).unwrap()).await
    }

    /// POST an empty body to `uri` with a session cookie.
    pub async fn post(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Self::request(Method::POST, uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.oneshot(builder.body(Body::empty()).unwrap()).await
    }

    /// POST /login with the given credentials.
    pub async fn post_login(&self, body: Value, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Self::request(Method::POST, "/login")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Sign in as `email` and return the session cookie pair.
    pub async fn sign_in(&self, email: &str) -> String {
        let response = self
            .post_login(json!({ "email": email, "password": PASSWORD }), None)
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        self.session_cookie(&response)
            .expect("login should set a session cookie")
    }

    /// `name=value` pair of the session cookie set by `response`, if any.
    pub fn session_cookie(&self, response: &Response<Body>) -> Option<String> {
        cookie_pair(response, self.sessions.cookie_name())
    }

    /// Name of the cookie carrying flash values.
    pub fn flash_cookie_name(&self) -> String {
        format!("{}_flash", self.sessions.cookie_name())
    }
}

// ============================================================================
// Client cookies
// ============================================================================

/// Client-side cookie store that follows `Set-Cookie` updates across
/// requests, so flash cookies behave like they would in a browser.
#[derive(Debug, Clone, Default)]
pub struct Cookies {
    values: BTreeMap<String, String>,
}

impl Cookies {
    /// Start from a `name=value` pair, such as the one returned by `sign_in`.
    pub fn from_pair(pair: &str) -> Self {
        let mut cookies = Self::default();
        if let Some((name, value)) = pair.split_once('=') {
            cookies.values.insert(name.to_string(), value.to_string());
        }
        cookies
    }

    /// Apply every `Set-Cookie` header of `response`.
    pub fn update(&mut self, response: &Response<Body>) {
        for raw in set_cookie_headers(response) {
            let cookie = Cookie::parse(raw).expect("Invalid Set-Cookie header");
            let removed = cookie.value().is_empty()
                || cookie.max_age().is_some_and(|max_age| max_age.is_zero());
            if removed {
                self.values.remove(cookie.name());
            } else {
                self.values
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// `Cookie` request header value, `None` when the store is empty.
    pub fn header(&self) -> Option<String> {
        if self.values.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .values
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Some(pairs.join("; "))
    }
}

// ============================================================================
// Response helpers
// ============================================================================

/// `name=value` pair of the `Set-Cookie` header for `name`, if any.
pub fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    set_cookie_headers(response)
        .iter()
        .filter_map(|value| value.split(';').next())
        .filter(|pair| pair.split_once('=').is_some_and(|(n, _)| n == name))
        .map(str::to_string)
        .last()
}

/// Raw `Set-Cookie` header values.
pub fn set_cookie_headers(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok().map(str::to_string))
        .collect()
}

/// `Location` header of a redirect.
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

/// URLs of a serialized navigation tree, depth-first.
pub fn nav_urls(items: &Value) -> Vec<String> {
    let mut urls = Vec::new();
    for item in items.as_array().into_iter().flatten() {
        urls.push(item["url"].as_str().unwrap_or_default().to_string());
        if let Some(children) = item.get("items") {
            urls.extend(nav_urls(children));
        }
    }
    urls
}
