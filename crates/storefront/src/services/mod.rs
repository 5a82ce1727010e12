//! Business logic services.
//!
//! # Services
//!
//! - `auth` - signup, login, logout
//! - `profile` - fetch and update the user's profile

pub mod auth;
pub mod profile;

pub use auth::{AuthError, AuthService};
pub use profile::{ProfileError, ProfileService, format_display_date};
