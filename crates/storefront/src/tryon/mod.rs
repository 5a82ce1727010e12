//! Virtual try-on: result cache, generation client and pipeline.
//!
//! # Flow
//!
//! 1. A category page builds a [`TryOnJob`] from the profile picture and the
//!    first four recommended garments.
//! 2. [`TryOnPipeline::run`] answers from [`TryOnCache`] when the cached entry
//!    was made from the same picture, otherwise calls the [`Generator`] once
//!    per garment using the configured [`Strategy`].
//! 3. Outcomes are published on a `watch` channel for the view and written
//!    back to the cache when the run completes.
//!
//! [`try_on_single`] is the one-off variant used by the try-on page: one
//! garment, no cache.

mod cache;
mod generator;
mod pipeline;

pub use cache::TryOnCache;
pub use generator::{
    GenerationError, GenerationRequest, Generator, HttpGenerator, decode_data_url, to_data_url,
};
pub use pipeline::{PipelineOutcome, Strategy, TryOnJob, TryOnPipeline, select_garments};

use fitting_room_core::UserProfile;
use thiserror::Error;

/// Errors from a single-garment try-on.
#[derive(Debug, Error)]
pub enum SingleTryOnError {
    /// The profile has no picture to use as the model.
    #[error("Please set up your profile picture first")]
    MissingModelImage,

    /// No garment URL was given.
    #[error("Please enter a garment image URL")]
    MissingGarment,

    /// The generation request failed.
    #[error("Failed to generate virtual try-on: {0}")]
    Generation(#[from] GenerationError),
}

/// Generate one try-on image for `garment_url` on the profile's picture.
///
/// # Errors
///
/// Returns an error if the profile has no picture, the garment URL is blank,
/// or generation fails.
pub async fn try_on_single<G: Generator>(
    generator: &G,
    profile: Option<&UserProfile>,
    garment_url: &str,
) -> Result<String, SingleTryOnError> {
    let model_image = profile
        .and_then(UserProfile::model_image)
        .ok_or(SingleTryOnError::MissingModelImage)?;

    let garment_url = garment_url.trim();
    if garment_url.is_empty() {
        return Err(SingleTryOnError::MissingGarment);
    }

    let request = GenerationRequest {
        garment_url: garment_url.to_owned(),
        model_face_url: model_image.to_owned(),
        garment_type: None,
    };
    Ok(generator.generate(&request).await?)
}
