//! Page state for the home and category pages.

mod category;
mod home;

pub use category::{CategoryPage, CategoryState, Tile, TransitionError};
pub use home::{HomeCategory, HomeView};
