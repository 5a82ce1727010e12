//! Profile commands.

use std::io::Write;

use fitting_room_core::{Category, UserProfile};
use fitting_room_storefront::error::AppError;
use fitting_room_storefront::services::format_display_date;
use fitting_room_storefront::state::AppState;

/// Print the stored profile.
///
/// # Errors
///
/// Returns an error if the user is not logged in.
pub fn show(state: &AppState) -> Result<(), AppError> {
    state.auth().require_token()?;
    let profile = state.profiles().cached()?.unwrap_or_default();
    print_profile(&profile)
}

/// Fetch the profile from the server and print it.
///
/// # Errors
///
/// Returns an error if the user is not logged in or the request fails.
pub async fn refresh(state: &AppState) -> Result<(), AppError> {
    let profile = state.profiles().refresh().await?;
    print_profile(&profile)
}

/// Update the profile and print the result.
///
/// # Errors
///
/// Returns an error for blank fields, when not logged in, or if the request
/// fails.
pub async fn update(
    state: &AppState,
    dob: &str,
    gender: &str,
    picture: Option<&str>,
) -> Result<(), AppError> {
    let profile = state.profiles().update(dob, gender, picture).await?;
    writeln!(std::io::stdout().lock(), "Profile updated successfully")?;
    print_profile(&profile)
}

fn print_profile(profile: &UserProfile) -> Result<(), AppError> {
    let mut out = std::io::stdout().lock();
    let or_not_set = |v: Option<&str>| v.unwrap_or("Not set").to_owned();

    writeln!(
        out,
        "Email:           {}",
        or_not_set(profile.email.as_ref().map(fitting_room_core::Email::as_str))
    )?;
    writeln!(out, "Date of birth:   {}", format_display_date(profile.dob.as_deref()))?;
    writeln!(out, "Gender:          {}", or_not_set(profile.gender.as_deref()))?;
    writeln!(out, "Profile picture: {}", or_not_set(profile.model_image()))?;
    writeln!(out, "Skin tone:       {}", or_not_set(profile.skin_tone.as_deref()))?;
    writeln!(out, "Country:         {}", or_not_set(profile.country.as_deref()))?;

    writeln!(out, "Recommendations:")?;
    for category in Category::ALL {
        writeln!(
            out,
            "  {:<10} {}",
            category.display_name(),
            profile.recommendations(category).len()
        )?;
    }
    Ok(())
}
