//! End-to-end test harness for Fitting Room.
//!
//! [`MockBackend`] serves the profile API and the try-on generation endpoint
//! in-process on an ephemeral port, recording every generation request so
//! tests can assert exactly how many calls a flow made.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fitting-room-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use fitting_room_storefront::config::{ClientConfig, ConfigError};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Token the mock hands out on login.
pub const TEST_TOKEN: &str = "test-token";

/// A generation request as the mock received it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReceivedGeneration {
    pub garment_url: String,
    pub model_face_url: String,
    #[serde(default)]
    pub garment_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CredentialsBody {
    email: String,
    password: String,
}

#[derive(Default)]
struct Backend {
    users: Mutex<HashMap<String, String>>,
    profile: Mutex<Value>,
    profile_unavailable: AtomicBool,
    failing_garments: Mutex<HashSet<String>>,
    generations: Mutex<Vec<ReceivedGeneration>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process profile API and generation endpoint.
pub struct MockBackend {
    addr: SocketAddr,
    backend: Arc<Backend>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let backend = Arc::new(Backend {
            profile: Mutex::new(json!({})),
            ..Backend::default()
        });

        let router = Router::new()
            .route("/signup", post(signup))
            .route("/login", post(login))
            .route("/me", get(me))
            .route("/profile", post(update_profile))
            .route("/fashion-face-swap/", post(generate))
            .with_state(Arc::clone(&backend));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                log_server_error(&e);
            }
        });

        Ok(Self {
            addr,
            backend,
            server,
        })
    }

    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    #[must_use]
    pub fn tryon_url(&self) -> String {
        format!("http://{}/fashion-face-swap/", self.addr)
    }

    /// Client configuration pointing at this backend.
    ///
    /// `overrides` take precedence over the defaults, which select the
    /// parallel strategy so tests do not wait on a throttle.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is invalid.
    pub fn config(
        &self,
        state_dir: &Path,
        overrides: &[(&str, &str)],
    ) -> Result<ClientConfig, ConfigError> {
        let mut env: HashMap<String, String> = HashMap::from([
            ("FITTING_ROOM_API_URL".to_string(), self.api_url()),
            ("FITTING_ROOM_TRYON_URL".to_string(), self.tryon_url()),
            (
                "FITTING_ROOM_STATE_DIR".to_string(),
                state_dir.display().to_string(),
            ),
            ("TRYON_STRATEGY".to_string(), "parallel".to_string()),
        ]);
        for (key, value) in overrides {
            env.insert((*key).to_string(), (*value).to_string());
        }
        ClientConfig::from_lookup(|key| env.get(key).cloned())
    }

    /// Register an account directly.
    pub fn add_user(&self, email: &str, password: &str) {
        lock(&self.backend.users).insert(email.to_string(), password.to_string());
    }

    /// Replace what `/me` returns.
    pub fn set_profile(&self, profile: Value) {
        *lock(&self.backend.profile) = profile;
    }

    /// Make `/me` answer 500 for any token.
    pub fn fail_profile_fetch(&self) {
        self.backend.profile_unavailable.store(true, Ordering::Relaxed);
    }

    /// The profile the backend currently holds.
    #[must_use]
    pub fn profile(&self) -> Value {
        lock(&self.backend.profile).clone()
    }

    /// Make generation fail for `garment_url`.
    pub fn fail_garment(&self, garment_url: &str) {
        lock(&self.backend.failing_garments).insert(garment_url.to_string());
    }

    /// Every generation request received so far.
    #[must_use]
    pub fn generations(&self) -> Vec<ReceivedGeneration> {
        lock(&self.backend.generations).clone()
    }

    #[must_use]
    pub fn generation_calls(&self) -> usize {
        lock(&self.backend.generations).len()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// The image bytes the mock returns for a garment.
#[must_use]
pub fn fake_image(garment_url: &str) -> Vec<u8> {
    let mut bytes = b"\x89PNG".to_vec();
    bytes.extend_from_slice(garment_url.as_bytes());
    bytes
}

fn log_server_error(error: &std::io::Error) {
    use std::io::Write;
    let _ = writeln!(std::io::stderr().lock(), "mock backend stopped: {error}");
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_once(' '))
        .is_some_and(|(scheme, token)| scheme.eq_ignore_ascii_case("bearer") && token == TEST_TOKEN)
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn signup(State(backend): State<Arc<Backend>>, Json(body): Json<CredentialsBody>) -> Response {
    let mut users = lock(&backend.users);
    if users.contains_key(&body.email) {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    users.insert(body.email.clone(), body.password);
    (
        StatusCode::CREATED,
        Json(json!({ "message": "User created", "email": body.email })),
    )
        .into_response()
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<CredentialsBody>) -> Response {
    let valid = lock(&backend.users).get(&body.email) == Some(&body.password);
    if !valid {
        return detail(StatusCode::BAD_REQUEST, "Incorrect email or password");
    }
    Json(json!({ "access_token": TEST_TOKEN, "token_type": "bearer" })).into_response()
}

async fn me(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    if backend.profile_unavailable.load(Ordering::Relaxed) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "profile service unavailable");
    }
    Json(lock(&backend.profile).clone()).into_response()
}

/// Stores the submitted fields and, like the real API, answers with only
/// those fields.
async fn update_profile(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }

    let mut returned = serde_json::Map::new();
    let mut profile = lock(&backend.profile);
    for field in ["dob", "gender", "profile_picture"] {
        if let Some(value) = body.get(field) {
            returned.insert(field.to_string(), value.clone());
            if let Some(stored) = profile.as_object_mut() {
                stored.insert(field.to_string(), value.clone());
            }
        }
    }
    Json(Value::Object(returned)).into_response()
}

async fn generate(
    State(backend): State<Arc<Backend>>,
    Json(body): Json<ReceivedGeneration>,
) -> Response {
    lock(&backend.generations).push(body.clone());

    if lock(&backend.failing_garments).contains(&body.garment_url) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "face swap failed");
    }
    (
        [(header::CONTENT_TYPE, "image/png")],
        fake_image(&body.garment_url),
    )
        .into_response()
}
