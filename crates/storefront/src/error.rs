//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front-ends. Internal failures are
//! captured to Sentry by [`AppError::report`]; [`AppError::user_message`] is
//! the text to show the user, with internal details left out.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::{AuthError, ProfileError};
use crate::store::StoreError;
use crate::tryon::{GenerationError, SingleTryOnError};
use crate::views::TransitionError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Profile API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Profile operation failed.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Try-on generation failed.
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Single-garment try-on failed.
    #[error("Try-on error: {0}")]
    TryOn(#[from] SingleTryOnError),

    /// A page operation was not valid in its current state.
    #[error("Invalid page transition: {0}")]
    Transition(#[from] TransitionError),

    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this is our fault rather than the user's or the network's.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Store(_) | Self::Transition(_) | Self::Internal(_)
        ) || matches!(
            self,
            Self::Auth(AuthError::Store(_)) | Self::Profile(ProfileError::Store(_))
        )
    }

    /// Capture internal errors to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Internal error"
            );
        } else {
            tracing::warn!(error = %self, "Operation failed");
        }
    }

    /// Notification text for the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Io(err) => format!("Could not write file: {err}"),
            Self::Store(_) | Self::Transition(_) | Self::Internal(_) => {
                "Something went wrong".to_string()
            }
            Self::Api(err) => api_message(err),
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::Api(err) => api_message(err),
                AuthError::Store(_) => "Something went wrong".to_string(),
                AuthError::MissingFields
                | AuthError::PasswordMismatch
                | AuthError::NotAuthenticated => err.to_string(),
            },
            Self::Profile(err) => match err {
                ProfileError::Api(err) => api_message(err),
                ProfileError::Store(_) => "Something went wrong".to_string(),
                ProfileError::MissingDob
                | ProfileError::MissingGender
                | ProfileError::NotAuthenticated => err.to_string(),
            },
            Self::Generation(_) | Self::TryOn(SingleTryOnError::Generation(_)) => {
                "Failed to generate virtual try-on".to_string()
            }
            Self::TryOn(err) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

fn api_message(err: &ApiError) -> String {
    match err {
        ApiError::Api { message, .. } => message.clone(),
        ApiError::Unauthorized => "Please login to access your profile".to_string(),
        ApiError::Http(_) => "Could not reach the server".to_string(),
        ApiError::Parse(_) | ApiError::Url(_) => "Something went wrong".to_string(),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after login to associate errors with the user.
pub fn set_sentry_user(email: &fitting_room_core::Email) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.as_str().to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("tryon", "Opened category", Some(&[("category", "handbags")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");

        let err = AppError::Auth(AuthError::PasswordMismatch);
        assert_eq!(err.to_string(), "Auth error: Passwords don't match");
    }

    #[test]
    fn test_user_message_surfaces_server_detail() {
        let err = AppError::Auth(AuthError::Api(ApiError::Api {
            status: 400,
            message: "Email already registered".to_string(),
        }));
        assert_eq!(err.user_message(), "Email already registered");
        assert!(!err.is_internal());
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let err = AppError::Internal("mutex poisoned at store.rs:42".to_string());
        assert_eq!(err.user_message(), "Something went wrong");
        assert!(err.is_internal());

        let err = AppError::Store(StoreError::Poisoned);
        assert_eq!(err.user_message(), "Something went wrong");
    }

    #[test]
    fn test_user_message_for_validation() {
        assert_eq!(
            AppError::Profile(ProfileError::MissingDob).user_message(),
            "Date of birth is required"
        );
        assert_eq!(
            AppError::TryOn(SingleTryOnError::MissingModelImage).user_message(),
            "Please set up your profile picture first"
        );
        assert_eq!(
            AppError::Generation(GenerationError::EmptyImage).user_message(),
            "Failed to generate virtual try-on"
        );
    }
}
