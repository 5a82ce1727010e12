//! Product categories.
//!
//! A category has two spellings: the plural route slug used for pages and
//! storage keys (`handbags`), and the singular recommendation key used by the
//! profile API and the try-on endpoint (`handbag`).

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string names no known category.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct CategoryError(pub String);

/// A storefront product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Handbags,
    Wallets,
    Watches,
    Jewellery,
    Clothing,
}

impl Category {
    /// Every category, in navigation order.
    pub const ALL: [Self; 5] = [
        Self::Handbags,
        Self::Wallets,
        Self::Watches,
        Self::Jewellery,
        Self::Clothing,
    ];

    /// Route slug, e.g. `handbags`.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Handbags => "handbags",
            Self::Wallets => "wallets",
            Self::Watches => "watches",
            Self::Jewellery => "jewellery",
            Self::Clothing => "clothing",
        }
    }

    /// Key under `recommended_products`, also sent as `garment_type`.
    #[must_use]
    pub const fn recommendation_key(self) -> &'static str {
        match self {
            Self::Handbags => "handbag",
            Self::Wallets => "wallet",
            Self::Watches => "watch",
            Self::Jewellery => "jewellery",
            Self::Clothing => "clothing",
        }
    }

    /// Human-readable name, e.g. `Handbags`.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Handbags => "Handbags",
            Self::Wallets => "Wallets",
            Self::Watches => "Watches",
            Self::Jewellery => "Jewellery",
            Self::Clothing => "Clothing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    /// Accepts either the slug or the recommendation key, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == needle || c.recommendation_key() == needle)
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}
