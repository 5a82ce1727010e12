//! Client for the profile and authentication API.
//!
//! # Endpoints
//!
//! - `POST /signup` - create an account
//! - `POST /login` - exchange credentials for a bearer token
//! - `GET /me` - the signed-in user's profile
//! - `POST /profile` - update date of birth, gender and profile picture

mod types;

pub use types::{Credentials, LoginResponse, ProfileUpdate};

use fitting_room_core::UserProfile;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::session::AuthToken;
use types::ErrorBody;

/// Errors that can occur when calling the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token was rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// API client.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, mut base_url: Url) -> Self {
        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails; the server's `detail` message is
    /// carried in [`ApiError::Api`].
    #[instrument(skip_all)]
    pub async fn signup(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("signup")?)
            .header(ACCEPT, "application/json")
            .json(credentials)
            .send()
            .await?;

        check_status(response, false).await?;
        debug!("Account created");
        Ok(())
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or no token comes back.
    #[instrument(skip_all)]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ApiError> {
        let response = self
            .client
            .post(self.endpoint("login")?)
            .header(ACCEPT, "application/json")
            .json(credentials)
            .send()
            .await?;

        let body: LoginResponse = parse_json(check_status(response, false).await?).await?;
        body.into_token()
            .ok_or_else(|| ApiError::Parse("login response has no token".to_string()))
    }

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the token is rejected, or another
    /// error if the request fails.
    #[instrument(skip_all)]
    pub async fn me(&self, token: &AuthToken) -> Result<UserProfile, ApiError> {
        let response = self
            .client
            .get(self.endpoint("me")?)
            .header(ACCEPT, "application/json")
            .bearer_auth(token.expose())
            .send()
            .await?;

        parse_json(check_status(response, true).await?).await
    }

    /// Update profile fields and return the profile the server now holds.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the token is rejected, or another
    /// error if the request fails.
    #[instrument(skip_all)]
    pub async fn update_profile(
        &self,
        token: &AuthToken,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        let response = self
            .client
            .post(self.endpoint("profile")?)
            .header(ACCEPT, "application/json")
            .bearer_auth(token.expose())
            .json(update)
            .send()
            .await?;

        parse_json(check_status(response, true).await?).await
    }
}

/// Map non-success statuses to errors, passing successful responses through.
///
/// 401/403 only mean a rejected token on `bearer` requests; for signup and
/// login they carry the server's message like any other failure.
async fn check_status(
    response: reqwest::Response,
    bearer: bool,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if bearer && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(ApiError::Unauthorized);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            if text.is_empty() {
                "Something went wrong".to_string()
            } else {
                text.chars().take(200).collect()
            }
        });

    warn!(status = %status, %message, "API returned non-success status");
    Err(ApiError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
}
