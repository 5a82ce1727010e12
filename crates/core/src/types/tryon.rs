//! Virtual try-on result types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored in place of an image when generation failed for a garment.
pub const ERROR_SENTINEL: &str = "error";

/// Only the first few recommendations of a category are tried on.
pub const MAX_GARMENTS_PER_CATEGORY: usize = 4;

/// Result of one generation request.
///
/// Serialized as a bare string: the image data URL, or [`ERROR_SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TryOnOutcome {
    /// A generated image, as a `data:` URL.
    Generated(String),
    /// The request failed; the tile shows its fallback presentation.
    Failed,
}

impl TryOnOutcome {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// The generated image, if any.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Generated(image) => Some(image),
            Self::Failed => None,
        }
    }
}

impl From<String> for TryOnOutcome {
    fn from(value: String) -> Self {
        if value == ERROR_SENTINEL {
            Self::Failed
        } else {
            Self::Generated(value)
        }
    }
}

impl From<TryOnOutcome> for String {
    fn from(value: TryOnOutcome) -> Self {
        match value {
            TryOnOutcome::Generated(image) => image,
            TryOnOutcome::Failed => ERROR_SENTINEL.to_owned(),
        }
    }
}

/// Outcomes keyed by garment URL. A garment with no key is still loading.
pub type TryOnResults = BTreeMap<String, TryOnOutcome>;

/// Display state of one garment tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState<'a> {
    /// Show the generated try-on image.
    Generated(&'a str),
    /// Show the original garment image with a loading indicator.
    Pending,
    /// Show the fallback presentation.
    Failed,
}

impl<'a> TileState<'a> {
    /// Look up a garment's state in a (possibly partial) result map.
    #[must_use]
    pub fn lookup(results: &'a TryOnResults, garment_url: &str) -> Self {
        match results.get(garment_url) {
            Some(TryOnOutcome::Generated(image)) => Self::Generated(image),
            Some(TryOnOutcome::Failed) => Self::Failed,
            None => Self::Pending,
        }
    }
}

/// A category's cached try-on results.
///
/// The JSON field names match what earlier clients wrote to local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryOnCacheEntry {
    pub results: TryOnResults,
    /// When the entry was written, as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// The profile picture the results were generated from.
    #[serde(rename = "modelImage")]
    pub model_image: String,
}

impl TryOnCacheEntry {
    #[must_use]
    pub fn new(results: TryOnResults, model_image: impl Into<String>) -> Self {
        Self {
            results,
            timestamp: Utc::now(),
            model_image: model_image.into(),
        }
    }

    /// Whether this entry was generated from `model_image`.
    #[must_use]
    pub fn is_valid_for(&self, model_image: &str) -> bool {
        self.model_image == model_image
    }

    /// Time since the entry was written. Never used for expiry.
    #[must_use]
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.timestamp)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_outcome_serializes_as_bare_string() {
        let failed = serde_json::to_value(TryOnOutcome::Failed).unwrap();
        assert_eq!(failed, json!("error"));

        let image = TryOnOutcome::Generated("data:image/png;base64,AAAA".to_owned());
        assert_eq!(
            serde_json::to_value(&image).unwrap(),
            json!("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn test_tile_state_distinguishes_pending_from_failed() {
        let mut results = TryOnResults::new();
        results.insert("u1".to_owned(), TryOnOutcome::Failed);
        results.insert(
            "u2".to_owned(),
            TryOnOutcome::Generated("data:image/png;base64,AAAA".to_owned()),
        );

        assert_eq!(TileState::lookup(&results, "u1"), TileState::Failed);
        assert_eq!(
            TileState::lookup(&results, "u2"),
            TileState::Generated("data:image/png;base64,AAAA")
        );
        assert_eq!(TileState::lookup(&results, "u3"), TileState::Pending);
    }

    #[test]
    fn test_cache_entry_reads_stored_layout() {
        let entry: TryOnCacheEntry = serde_json::from_value(json!({
            "results": {"https://cdn.example.com/h1.jpg": "error"},
            "timestamp": 1_717_171_717_000_i64,
            "modelImage": "https://cdn.example.com/face.jpg"
        }))
        .unwrap();

        assert!(entry.is_valid_for("https://cdn.example.com/face.jpg"));
        assert!(!entry.is_valid_for("https://cdn.example.com/other.jpg"));
        assert_eq!(entry.timestamp.timestamp_millis(), 1_717_171_717_000);
        assert!(entry.results["https://cdn.example.com/h1.jpg"].is_failed());
    }
}
