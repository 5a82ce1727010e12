//! Signup, login and logout.

use std::io::Write;

use fitting_room_storefront::error::AppError;
use fitting_room_storefront::state::AppState;

/// Create an account.
///
/// # Errors
///
/// Returns an error if validation or the signup request fails.
pub async fn signup(
    state: &AppState,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), AppError> {
    state.auth().signup(email, password, confirm).await?;
    writeln!(std::io::stdout().lock(), "User created successfully, please log in")?;
    Ok(())
}

/// Log in and store the profile.
///
/// # Errors
///
/// Returns an error if the credentials are refused.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<(), AppError> {
    let profile = state.auth().login(email, password).await?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "Logged in successfully")?;
    if profile.is_none() {
        writeln!(out, "Your profile could not be loaded; run `fr profile refresh` later")?;
    }
    Ok(())
}

/// Log out and clear local data.
///
/// # Errors
///
/// Returns an error if local storage cannot be written.
pub fn logout(state: &AppState) -> Result<(), AppError> {
    state.auth().logout()?;
    writeln!(std::io::stdout().lock(), "You have been logged out of your account")?;
    Ok(())
}
