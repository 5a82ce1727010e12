//! Request and response bodies.

use fitting_room_core::UserProfile;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::session::AuthToken;

/// Email and password, as sent to `/signup` and `/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    #[serde(serialize_with = "expose_password")]
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

fn expose_password<S: Serializer>(password: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(password.expose_secret())
}

/// Body of a successful login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default, alias = "token")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl LoginResponse {
    /// The bearer token, if the server sent a non-blank one.
    #[must_use]
    pub fn into_token(self) -> Option<AuthToken> {
        self.access_token
            .filter(|t| !t.trim().is_empty())
            .map(AuthToken::new)
    }
}

/// Fields accepted by `POST /profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub dob: String,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl ProfileUpdate {
    /// The submitted fields as a partial profile, for merging.
    #[must_use]
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            dob: Some(self.dob.clone()),
            gender: Some(self.gender.clone()),
            profile_picture: self.profile_picture.clone(),
            ..UserProfile::default()
        }
    }
}

/// Error body. The API sends either `{"detail": "..."}`, a list of
/// validation errors under `detail`, or `{"message": "..."}`.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    pub(super) fn into_message(self) -> Option<String> {
        let detail = match self.detail {
            Some(Value::String(s)) => Some(s),
            Some(Value::Array(items)) => items
                .first()
                .and_then(|item| item.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => None,
        };
        detail.or(self.message).filter(|m| !m.trim().is_empty())
    }
}
