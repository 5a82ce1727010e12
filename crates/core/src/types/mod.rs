//! Core types for Fitting Room.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod profile;
pub mod tryon;

pub use category::{Category, CategoryError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use profile::{RecommendedProducts, UserProfile};
pub use tryon::{
    ERROR_SENTINEL, MAX_GARMENTS_PER_CATEGORY, TileState, TryOnCacheEntry, TryOnOutcome,
    TryOnResults,
};
