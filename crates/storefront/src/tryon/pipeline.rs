//! Try-on generation pipeline for a category page.
//!
//! A run first consults the cache and only falls back to the generation
//! endpoint on a miss. Each garment gets exactly one request; a failure is
//! recorded as [`TryOnOutcome::Failed`] and never stops the rest. The full
//! result map is written to the cache once, and only if the run was not
//! cancelled.

use std::num::NonZeroUsize;
use std::pin::pin;
use std::time::Duration;

use fitting_room_core::{
    Category, MAX_GARMENTS_PER_CATEGORY, TryOnCacheEntry, TryOnOutcome, TryOnResults, UserProfile,
};
use futures::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::cache::TryOnCache;
use super::generator::{GenerationRequest, Generator};
use crate::store::StoreError;

/// How generation requests for one category are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Up to `concurrency` requests in flight; results land in one update.
    Parallel { concurrency: NonZeroUsize },
    /// One request at a time in list order, pausing `delay` between requests.
    /// Each result is published as soon as it arrives.
    Sequential { delay: Duration },
}

impl Strategy {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Parallel { .. } => "parallel",
            Self::Sequential { .. } => "sequential",
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Sequential {
            delay: Duration::from_secs(20),
        }
    }
}

/// The inputs of one pipeline run.
///
/// Two jobs compare equal exactly when a page would not need to re-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryOnJob {
    category: Category,
    model_image: String,
    garments: Vec<String>,
}

impl TryOnJob {
    /// Build a job, or `None` when there is nothing to generate.
    ///
    /// Blank and repeated garment URLs are dropped and only the first
    /// [`MAX_GARMENTS_PER_CATEGORY`] are kept.
    #[must_use]
    pub fn new(category: Category, model_image: &str, garments: &[String]) -> Option<Self> {
        let model_image = model_image.trim();
        if model_image.is_empty() {
            return None;
        }

        let unique = select_garments(garments);
        if unique.is_empty() {
            return None;
        }

        Some(Self {
            category,
            model_image: model_image.to_owned(),
            garments: unique,
        })
    }

    /// The job for a category page of `profile`.
    #[must_use]
    pub fn for_profile(category: Category, profile: &UserProfile) -> Option<Self> {
        Self::new(
            category,
            profile.model_image()?,
            profile.recommendations(category),
        )
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn model_image(&self) -> &str {
        &self.model_image
    }

    #[must_use]
    pub fn garments(&self) -> &[String] {
        &self.garments
    }
}

/// The garments a category page shows: the first
/// [`MAX_GARMENTS_PER_CATEGORY`] distinct non-blank URLs, in order.
#[must_use]
pub fn select_garments(garments: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(MAX_GARMENTS_PER_CATEGORY);
    for garment in garments.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
        if unique.len() == MAX_GARMENTS_PER_CATEGORY {
            break;
        }
        if !unique.iter().any(|u| u == garment) {
            unique.push(garment.to_owned());
        }
    }
    unique
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Served from cache; no request was made.
    Cached(TryOnCacheEntry),
    /// Generated and written to the cache.
    Generated(TryOnCacheEntry),
    /// Cancelled before completion; nothing was cached.
    Cancelled { partial: TryOnResults },
}

impl PipelineOutcome {
    #[must_use]
    pub const fn results(&self) -> &TryOnResults {
        match self {
            Self::Cached(entry) | Self::Generated(entry) => &entry.results,
            Self::Cancelled { partial } => partial,
        }
    }
}

enum Run {
    Complete(TryOnResults),
    Cancelled(TryOnResults),
}

/// Runs try-on jobs against a [`Generator`] with a [`TryOnCache`] in front.
pub struct TryOnPipeline<G> {
    generator: G,
    cache: TryOnCache,
    strategy: Strategy,
    send_garment_type: bool,
}

impl<G: Generator> TryOnPipeline<G> {
    #[must_use]
    pub const fn new(generator: G, cache: TryOnCache, strategy: Strategy) -> Self {
        Self {
            generator,
            cache,
            strategy,
            send_garment_type: true,
        }
    }

    /// Whether requests carry the category as `garment_type`.
    #[must_use]
    pub fn with_garment_type(mut self, send: bool) -> Self {
        self.send_garment_type = send;
        self
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Produce results for `job`, publishing them on `progress`.
    ///
    /// `progress` is reset to an empty map when generation starts, so every
    /// garment reads as pending until its outcome arrives. Cancelling `cancel`
    /// drops in-flight requests and returns what finished so far.
    ///
    /// # Errors
    ///
    /// Returns an error only if the cache cannot be read or written.
    #[instrument(skip_all, fields(category = %job.category, strategy = self.strategy.name()))]
    pub async fn run(
        &self,
        job: &TryOnJob,
        progress: &watch::Sender<TryOnResults>,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutcome, StoreError> {
        if let Some(entry) = self.cache.get(job.category, &job.model_image)? {
            progress.send_replace(entry.results.clone());
            return Ok(PipelineOutcome::Cached(entry));
        }

        progress.send_replace(TryOnResults::new());
        info!(garments = job.garments.len(), "Generating try-on results");

        let run = match self.strategy {
            Strategy::Parallel { concurrency } => {
                self.run_parallel(job, concurrency, progress, cancel).await
            }
            Strategy::Sequential { delay } => {
                self.run_sequential(job, delay, progress, cancel).await
            }
        };

        match run {
            Run::Complete(results) if !cancel.is_cancelled() => {
                let failed = results.values().filter(|o| o.is_failed()).count();
                let entry = self.cache.put(job.category, results, &job.model_image)?;
                info!(failed, "Try-on results cached");
                Ok(PipelineOutcome::Generated(entry))
            }
            Run::Complete(partial) | Run::Cancelled(partial) => {
                info!(finished = partial.len(), "Try-on generation cancelled");
                Ok(PipelineOutcome::Cancelled { partial })
            }
        }
    }

    async fn run_parallel(
        &self,
        job: &TryOnJob,
        concurrency: NonZeroUsize,
        progress: &watch::Sender<TryOnResults>,
        cancel: &CancellationToken,
    ) -> Run {
        let mut pending = pin!(
            futures::stream::iter(&job.garments)
                .map(|garment| async move {
                    (garment.clone(), self.generate_one(job, garment).await)
                })
                .buffer_unordered(concurrency.get())
        );

        let mut results = TryOnResults::new();
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Run::Cancelled(results),
                next = pending.next() => match next {
                    Some((garment, outcome)) => {
                        results.insert(garment, outcome);
                    }
                    None => break,
                },
            }
        }

        progress.send_replace(results.clone());
        Run::Complete(results)
    }

    async fn run_sequential(
        &self,
        job: &TryOnJob,
        delay: Duration,
        progress: &watch::Sender<TryOnResults>,
        cancel: &CancellationToken,
    ) -> Run {
        let mut results = TryOnResults::new();
        let mut garments = job.garments.iter().peekable();

        while let Some(garment) = garments.next() {
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Run::Cancelled(results),
                outcome = self.generate_one(job, garment) => outcome,
            };
            results.insert(garment.clone(), outcome);
            progress.send_replace(results.clone());

            if garments.peek().is_some() && !delay.is_zero() {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Run::Cancelled(results),
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }

        Run::Complete(results)
    }

    async fn generate_one(&self, job: &TryOnJob, garment: &str) -> TryOnOutcome {
        let request = GenerationRequest {
            garment_url: garment.to_owned(),
            model_face_url: job.model_image.clone(),
            garment_type: self
                .send_garment_type
                .then(|| job.category.recommendation_key().to_owned()),
        };

        match self.generator.generate(&request).await {
            Ok(image) => TryOnOutcome::Generated(image),
            Err(e) => {
                warn!(garment, error = %e, "Try-on generation failed");
                TryOnOutcome::Failed
            }
        }
    }
}
