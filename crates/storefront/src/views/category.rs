//! Category page state.
//!
//! ```text
//! Loading --> Recommended <--> Enlarged(selected)
//!    |             |
//!    |             v  (recommendations gone)
//!    `-------> Catalog
//! ```
//!
//! `Recommended` needs a token and a non-empty recommendation list for the
//! category. Every other combination shows the static catalog.

use fitting_room_core::{Category, TileState, TryOnResults, UserProfile};
use thiserror::Error;

use crate::catalog::{self, Product};
use crate::session::Session;
use crate::store::StoreError;
use crate::tryon::{TryOnJob, select_garments};

/// An operation that the page's current state does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot {action} while {state}")]
    InvalidState {
        state: &'static str,
        action: &'static str,
    },

    #[error("garment is not on this page: {0}")]
    UnknownGarment(String),
}

/// Where a category page is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryState {
    Loading,
    Recommended,
    /// A recommended tile is open in the lightbox.
    Enlarged { selected: String },
    Catalog,
}

impl CategoryState {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Recommended => "showing recommendations",
            Self::Enlarged { .. } => "showing an enlarged image",
            Self::Catalog => "showing the catalog",
        }
    }
}

/// One recommended garment as the page shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile<'a> {
    pub garment_url: &'a str,
    pub state: TileState<'a>,
    /// Pending and a generation run can produce a result.
    pub loading: bool,
}

impl Tile<'_> {
    /// The image to draw: the try-on result once there is one, otherwise the
    /// garment itself.
    #[must_use]
    pub const fn display_image(&self) -> &str {
        match self.state {
            TileState::Generated(image) => image,
            TileState::Pending | TileState::Failed => self.garment_url,
        }
    }
}

/// State of one category page.
#[derive(Debug, Clone)]
pub struct CategoryPage {
    category: Category,
    state: CategoryState,
    model_image: Option<String>,
    garments: Vec<String>,
    results: TryOnResults,
    last_job: Option<TryOnJob>,
}

impl CategoryPage {
    /// A page that has not yet read the session.
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self {
            category,
            state: CategoryState::Loading,
            model_image: None,
            garments: Vec::new(),
            results: TryOnResults::new(),
            last_job: None,
        }
    }

    /// A page resolved from the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn load(category: Category, session: &Session) -> Result<Self, StoreError> {
        let authenticated = session.is_authenticated()?;
        let profile = if authenticated {
            session.profile()?
        } else {
            None
        };
        let mut page = Self::new(category);
        page.enter(authenticated, profile.as_ref());
        Ok(page)
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub const fn state(&self) -> &CategoryState {
        &self.state
    }

    /// Leave `Loading` for the recommended view or the catalog.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::InvalidState` unless the page is loading.
    pub fn resolve(
        &mut self,
        authenticated: bool,
        profile: Option<&UserProfile>,
    ) -> Result<&CategoryState, TransitionError> {
        self.expect_state("resolve", |s| matches!(s, CategoryState::Loading))?;
        self.enter(authenticated, profile);
        Ok(&self.state)
    }

    fn enter(&mut self, authenticated: bool, profile: Option<&UserProfile>) {
        let garments = profile
            .filter(|_| authenticated)
            .map(|p| select_garments(p.recommendations(self.category)))
            .unwrap_or_default();

        if garments.is_empty() {
            self.state = CategoryState::Catalog;
        } else {
            self.model_image = profile.and_then(UserProfile::model_image).map(str::to_owned);
            self.garments = garments;
            self.state = CategoryState::Recommended;
        }
    }

    /// Pick up a changed profile while recommendations are shown.
    ///
    /// A new picture or garment list drops the shown results and makes
    /// [`Self::next_job`] yield again. With no recommendations left the page
    /// falls back to the catalog. If the enlarged garment is gone the lightbox
    /// closes.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::InvalidState` unless recommendations are shown.
    pub fn update_profile(&mut self, profile: &UserProfile) -> Result<(), TransitionError> {
        self.expect_state("update the profile", |s| {
            matches!(s, CategoryState::Recommended | CategoryState::Enlarged { .. })
        })?;

        self.model_image = profile.model_image().map(str::to_owned);
        self.garments = select_garments(profile.recommendations(self.category));

        // Results only ever belong to the inputs of the last job
        let job = self
            .model_image
            .as_deref()
            .and_then(|image| TryOnJob::new(self.category, image, &self.garments));
        if job != self.last_job {
            self.results.clear();
            self.last_job = None;
        }

        if self.garments.is_empty() {
            self.model_image = None;
            self.state = CategoryState::Catalog;
        } else if let CategoryState::Enlarged { selected } = &self.state
            && !self.garments.contains(selected)
        {
            self.state = CategoryState::Recommended;
        }
        Ok(())
    }

    /// The job to run, if the page's inputs changed since the last one.
    ///
    /// Yields nothing outside the recommended view, without a profile
    /// picture, or when the last job already covers the current inputs.
    pub fn next_job(&mut self) -> Option<TryOnJob> {
        if !matches!(
            self.state,
            CategoryState::Recommended | CategoryState::Enlarged { .. }
        ) {
            return None;
        }

        let job = TryOnJob::new(self.category, self.model_image.as_deref()?, &self.garments)?;
        if self.last_job.as_ref() == Some(&job) {
            return None;
        }

        self.results.clear();
        self.last_job = Some(job.clone());
        Some(job)
    }

    /// Replace the shown results with the latest (possibly partial) map.
    pub fn apply(&mut self, results: TryOnResults) {
        self.results = results;
    }

    #[must_use]
    pub const fn results(&self) -> &TryOnResults {
        &self.results
    }

    /// Recommended tiles in display order. Empty outside the recommended view.
    #[must_use]
    pub fn tiles(&self) -> Vec<Tile<'_>> {
        if !matches!(
            self.state,
            CategoryState::Recommended | CategoryState::Enlarged { .. }
        ) {
            return Vec::new();
        }
        self.garments.iter().map(|g| self.tile(g)).collect()
    }

    /// Static products, when the catalog is shown.
    #[must_use]
    pub fn catalog(&self) -> Vec<Product> {
        if self.state == CategoryState::Catalog {
            catalog::products(self.category)
        } else {
            Vec::new()
        }
    }

    /// Open the lightbox on a recommended garment.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::InvalidState` unless recommendations are shown
    /// without the lightbox, or `TransitionError::UnknownGarment`.
    pub fn enlarge(&mut self, garment_url: &str) -> Result<(), TransitionError> {
        self.expect_state("enlarge an image", |s| {
            matches!(s, CategoryState::Recommended)
        })?;
        if !self.garments.iter().any(|g| g == garment_url) {
            return Err(TransitionError::UnknownGarment(garment_url.to_owned()));
        }
        self.state = CategoryState::Enlarged {
            selected: garment_url.to_owned(),
        };
        Ok(())
    }

    /// Close the lightbox.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::InvalidState` unless the lightbox is open.
    pub fn close_enlarged(&mut self) -> Result<(), TransitionError> {
        self.expect_state("close the enlarged image", |s| {
            matches!(s, CategoryState::Enlarged { .. })
        })?;
        self.state = CategoryState::Recommended;
        Ok(())
    }

    /// The tile open in the lightbox.
    #[must_use]
    pub fn enlarged(&self) -> Option<Tile<'_>> {
        match &self.state {
            CategoryState::Enlarged { selected } => Some(self.tile(selected)),
            _ => None,
        }
    }

    fn tile<'a>(&'a self, garment_url: &'a str) -> Tile<'a> {
        let state = TileState::lookup(&self.results, garment_url);
        Tile {
            garment_url,
            state,
            loading: state == TileState::Pending && self.last_job.is_some(),
        }
    }

    fn expect_state(
        &self,
        action: &'static str,
        allowed: impl FnOnce(&CategoryState) -> bool,
    ) -> Result<(), TransitionError> {
        if allowed(&self.state) {
            Ok(())
        } else {
            Err(TransitionError::InvalidState {
                state: self.state.name(),
                action,
            })
        }
    }
}
