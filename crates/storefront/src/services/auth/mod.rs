//! Authentication service.
//!
//! Signup, login and logout against the profile API. The token returned by
//! login is the only thing that turns personalization on.

mod error;

pub use error::AuthError;

use fitting_room_core::{Email, UserProfile};
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, Credentials};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::session::{AuthToken, Session};

/// Authentication service.
pub struct AuthService<'a> {
    api: &'a ApiClient,
    session: &'a Session,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(api: &'a ApiClient, session: &'a Session) -> Self {
        Self { api, session }
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if any field is blank.
    /// Returns `AuthError::PasswordMismatch` if the confirmation differs.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::Api` with the server's message if signup is refused.
    #[instrument(skip_all)]
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        if email.trim().is_empty() || password.is_empty() || confirm_password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        let email = Email::parse(email)?;

        self.api
            .signup(&Credentials::new(email.as_str(), password))
            .await?;

        info!(email = %email.masked(), "Account created");
        Ok(())
    }

    /// Log in, store the token and fetch the profile.
    ///
    /// Returns the profile if it could be fetched. A failed profile fetch is
    /// logged and does not fail the login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either field is blank.
    /// Returns `AuthError::Api` if the credentials are refused.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let token = self.api.login(&Credentials::new(email, password)).await?;
        self.session.start(&token)?;

        let profile = match self.api.me(&token).await {
            Ok(profile) => {
                self.session.save_profile(&profile)?;
                Some(profile)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch profile after login, continuing without it");
                None
            }
        };

        let known_email = profile
            .as_ref()
            .and_then(|p| p.email.clone())
            .or_else(|| Email::parse(email).ok());
        if let Some(email) = &known_email {
            set_sentry_user(email);
        }
        add_breadcrumb("auth", "Logged in", None);
        info!("Logged in");

        Ok(profile)
    }

    /// Clear the token, the profile and every cached try-on result.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if local storage cannot be written.
    #[instrument(skip_all)]
    pub fn logout(&self) -> Result<(), AuthError> {
        self.session.logout()?;
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);
        info!("Logged out");
        Ok(())
    }

    /// The stored token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` if there is none.
    pub fn require_token(&self) -> Result<AuthToken, AuthError> {
        self.session.token()?.ok_or(AuthError::NotAuthenticated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use url::Url;

    use super::*;
    use crate::store::MemoryStore;

    // Nothing listens here; validation must fail before any request is made.
    fn api() -> ApiClient {
        ApiClient::new(Url::parse("http://127.0.0.1:9").unwrap())
    }

    fn session() -> Session {
        Session::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_signup_requires_all_fields() {
        let (api, session) = (api(), session());
        let auth = AuthService::new(&api, &session);

        let err = auth.signup("", "password1", "password1").await.unwrap_err();
        assert_eq!(err.to_string(), "All fields are required");

        let err = auth
            .signup("jane@example.com", "password1", "")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));
    }

    #[tokio::test]
    async fn test_signup_rejects_mismatched_passwords() {
        let (api, session) = (api(), session());
        let auth = AuthService::new(&api, &session);

        let err = auth
            .signup("jane@example.com", "password1", "password2")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Passwords don't match");
    }

    #[tokio::test]
    async fn test_signup_rejects_invalid_email() {
        let (api, session) = (api(), session());
        let auth = AuthService::new(&api, &session);

        let err = auth
            .signup("not-an-email", "password1", "password1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let (api, session) = (api(), session());
        let auth = AuthService::new(&api, &session);

        let err = auth.login("  ", "password1").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));
        assert!(!session.is_authenticated().unwrap());
    }

    #[test]
    fn test_require_token() {
        let (api, session) = (api(), session());
        let auth = AuthService::new(&api, &session);

        let err = auth.require_token().unwrap_err();
        assert_eq!(err.to_string(), "Please login to access your profile");

        session.set_token(&AuthToken::new("abc")).unwrap();
        assert_eq!(auth.require_token().unwrap().expose(), "abc");
    }

    #[test]
    fn test_logout_clears_session() {
        let (api, session) = (api(), session());
        session.set_token(&AuthToken::new("abc")).unwrap();
        session.save_profile(&UserProfile::default()).unwrap();

        AuthService::new(&api, &session).logout().unwrap();

        assert!(!session.is_authenticated().unwrap());
        assert!(session.profile().unwrap().is_none());
    }
}
