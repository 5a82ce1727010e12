//! Subcommand implementations.

pub mod auth;
pub mod browse;
pub mod profile;
pub mod tryon;

use fitting_room_core::Category;
use fitting_room_storefront::error::AppError;

/// Parse a category from the command line.
fn parse_category(slug: &str) -> Result<Category, AppError> {
    slug.parse()
        .map_err(|e: fitting_room_core::CategoryError| AppError::BadRequest(e.to_string()))
}
