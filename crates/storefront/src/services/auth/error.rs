//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::store::StoreError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required form field was left blank.
    #[error("All fields are required")]
    MissingFields,

    /// Password and confirmation differ.
    #[error("Passwords don't match")]
    PasswordMismatch,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] fitting_room_core::EmailError),

    /// No token is stored.
    #[error("Please login to access your profile")]
    NotAuthenticated,

    /// The API rejected or failed the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Local storage failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
