//! Signed-in state: the bearer token and the cached user profile.
//!
//! The token's presence, not its validity, is what turns personalization on.
//! Logging out is the only operation that removes it, and it always takes the
//! profile and every try-on cache entry with it.

use std::fmt;
use std::sync::Arc;

use fitting_room_core::UserProfile;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::store::{LocalStore, StoreError, keys};
use crate::tryon::TryOnCache;

/// Opaque bearer token returned by login.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// Typed access to the token and profile in local storage.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn LocalStore>,
}

impl Session {
    #[must_use]
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn LocalStore> {
        &self.store
    }

    /// The try-on cache sharing this session's store.
    #[must_use]
    pub fn try_on_cache(&self) -> TryOnCache {
        TryOnCache::new(Arc::clone(&self.store))
    }

    /// The stored token, if any. A blank value counts as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn token(&self) -> Result<Option<AuthToken>, StoreError> {
        Ok(self
            .store
            .get(keys::TOKEN)?
            .filter(|t| !t.trim().is_empty())
            .map(AuthToken::new))
    }

    /// Store the token returned by login.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set_token(&self, token: &AuthToken) -> Result<(), StoreError> {
        self.store.set(keys::TOKEN, token.expose())
    }

    /// Whether a token is present.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn is_authenticated(&self) -> Result<bool, StoreError> {
        Ok(self.token()?.is_some())
    }

    /// The stored profile.
    ///
    /// A profile that no longer parses is logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn profile(&self) -> Result<Option<UserProfile>, StoreError> {
        let Some(raw) = self.store.get(keys::USER_PROFILE)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(error = %e, "Stored user profile is malformed, ignoring it");
                Ok(None)
            }
        }
    }

    /// Replace the stored profile wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be encoded or written.
    pub fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let raw = serde_json::to_string(profile)?;
        self.store.set(keys::USER_PROFILE, &raw)
    }

    /// Overlay `update` on the stored profile, persist and return the result.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or written.
    pub fn merge_profile(&self, update: UserProfile) -> Result<UserProfile, StoreError> {
        let merged = self.profile()?.unwrap_or_default().merge(update);
        self.save_profile(&merged)?;
        Ok(merged)
    }

    /// Begin a new session holding only `token`.
    ///
    /// Whatever an earlier login left behind (profile, try-on results) is
    /// dropped first, so nothing from another account survives.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn start(&self, token: &AuthToken) -> Result<(), StoreError> {
        self.logout()?;
        self.set_token(token)
    }

    /// Clear the token, the profile and every try-on cache entry.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.remove(keys::TOKEN)?;
        self.store.remove(keys::USER_PROFILE)?;
        let cleared = self.try_on_cache().clear_all()?;
        debug!(cleared, "Session cleared");
        Ok(())
    }
}
