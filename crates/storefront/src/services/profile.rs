//! Profile service: fetch and update the signed-in user's profile.

use chrono::NaiveDate;
use fitting_room_core::UserProfile;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError, ProfileUpdate};
use crate::error::clear_sentry_user;
use crate::session::{AuthToken, Session};
use crate::store::StoreError;

/// Shown for a missing date of birth.
const NOT_SET: &str = "Not set";

/// Errors from profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Date of birth is required")]
    MissingDob,

    #[error("Gender is required")]
    MissingGender,

    /// No token, or the server rejected it and the session was cleared.
    #[error("Please login to access your profile")]
    NotAuthenticated,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Profile service.
pub struct ProfileService<'a> {
    api: &'a ApiClient,
    session: &'a Session,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, session: &'a Session) -> Self {
        Self { api, session }
    }

    /// The profile in local storage, without a network call.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn cached(&self) -> Result<Option<UserProfile>, ProfileError> {
        Ok(self.session.profile()?)
    }

    /// Fetch the profile from `/me` and store it.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotAuthenticated` if there is no token or the
    /// server rejects it; in the latter case the session is cleared first.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> Result<UserProfile, ProfileError> {
        let token = self.token()?;
        let profile = self.api.me(&token).await.map_err(|e| self.on_api_error(e))?;
        self.session.save_profile(&profile)?;
        Ok(profile)
    }

    /// Update date of birth, gender and optionally the profile picture.
    ///
    /// The stored profile keeps every field the update does not touch.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::MissingDob` or `ProfileError::MissingGender` for
    /// blank input, `ProfileError::NotAuthenticated` as for [`Self::refresh`],
    /// or the API error.
    #[instrument(skip_all)]
    pub async fn update(
        &self,
        dob: &str,
        gender: &str,
        profile_picture: Option<&str>,
    ) -> Result<UserProfile, ProfileError> {
        let dob = dob.trim();
        if dob.is_empty() {
            return Err(ProfileError::MissingDob);
        }
        let gender = gender.trim();
        if gender.is_empty() {
            return Err(ProfileError::MissingGender);
        }

        let update = ProfileUpdate {
            dob: dob.to_owned(),
            gender: gender.to_owned(),
            profile_picture: profile_picture
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned),
        };

        let token = self.token()?;
        let returned = self
            .api
            .update_profile(&token, &update)
            .await
            .map_err(|e| self.on_api_error(e))?;

        let merged = self
            .session
            .merge_profile(returned.merge(update.to_profile()))?;
        info!("Profile updated");
        Ok(merged)
    }

    fn token(&self) -> Result<AuthToken, ProfileError> {
        self.session.token()?.ok_or(ProfileError::NotAuthenticated)
    }

    fn on_api_error(&self, error: ApiError) -> ProfileError {
        if !matches!(error, ApiError::Unauthorized) {
            return error.into();
        }
        warn!("Token rejected, logging out");
        if let Err(e) = self.session.logout() {
            warn!(error = %e, "Failed to clear session");
        }
        clear_sentry_user();
        ProfileError::NotAuthenticated
    }
}

/// Render a `DD-MM-YYYY` date of birth as e.g. `March 5, 1994`.
///
/// Anything else is returned unchanged.
#[must_use]
pub fn format_display_date(dob: Option<&str>) -> String {
    let Some(dob) = dob.map(str::trim).filter(|d| !d.is_empty()) else {
        return NOT_SET.to_owned();
    };
    NaiveDate::parse_from_str(dob, "%d-%m-%Y")
        .map_or_else(|_| dob.to_owned(), |d| d.format("%B %-d, %Y").to_string())
}
