//! Home page.

use fitting_room_core::{Category, UserProfile};

use crate::catalog::{self, Product};
use crate::session::Session;
use crate::store::StoreError;
use crate::tryon::select_garments;

/// A category tile, with how many recommendations its page will try on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeCategory {
    pub category: Category,
    pub image: &'static str,
    pub recommendations: usize,
}

/// Everything the home page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeView {
    pub categories: Vec<HomeCategory>,
    pub featured: Vec<Product>,
    pub personalized: bool,
}

impl HomeView {
    #[must_use]
    pub fn build(authenticated: bool, profile: Option<&UserProfile>) -> Self {
        let profile = profile.filter(|_| authenticated);
        let categories = catalog::home_categories()
            .iter()
            .map(|tile| HomeCategory {
                category: tile.category,
                image: tile.image,
                recommendations: profile
                    .map_or(0, |p| select_garments(p.recommendations(tile.category)).len()),
            })
            .collect();

        Self {
            categories,
            featured: catalog::featured_products(),
            personalized: authenticated,
        }
    }

    /// Build from the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn load(session: &Session) -> Result<Self, StoreError> {
        let authenticated = session.is_authenticated()?;
        let profile = if authenticated {
            session.profile()?
        } else {
            None
        };
        Ok(Self::build(authenticated, profile.as_ref()))
    }
}
