//! Storage key names.

use fitting_room_core::Category;

/// Opaque bearer token of the signed-in user.
pub const TOKEN: &str = "token";

/// JSON-encoded [`fitting_room_core::UserProfile`].
pub const USER_PROFILE: &str = "userProfile";

/// Prefix of the per-category try-on cache keys.
pub const TRY_ON_PREFIX: &str = "tryOnResults_";

/// Key of a category's try-on cache entry, e.g. `tryOnResults_handbags`.
#[must_use]
pub fn try_on_results(category: Category) -> String {
    format!("{TRY_ON_PREFIX}{}", category.slug())
}

/// Whether `key` holds a try-on cache entry.
#[must_use]
pub fn is_try_on_results(key: &str) -> bool {
    key.starts_with(TRY_ON_PREFIX)
}
