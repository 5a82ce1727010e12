//! Try-on pipeline against the mock generation endpoint.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use fitting_room_core::{Category, TileState, TryOnOutcome, TryOnResults, UserProfile};
use fitting_room_integration_tests::{MockBackend, TEST_TOKEN, fake_image};
use fitting_room_storefront::session::AuthToken;
use fitting_room_storefront::state::AppState;
use fitting_room_storefront::store::FileStore;
use fitting_room_storefront::tryon::{PipelineOutcome, decode_data_url};
use fitting_room_storefront::views::{CategoryPage, CategoryState};
use serde_json::json;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

const FACE: &str = "https://cdn.example.com/face.jpg";

fn handbags(n: usize) -> Vec<String> {
    (1..=n)
        .map(|i| format!("https://cdn.example.com/handbag-{i}.jpg"))
        .collect()
}

fn profile_json(face: &str, garments: &[String]) -> serde_json::Value {
    json!({
        "email": "jane@example.com",
        "profile_picture": face,
        "recommended_products": {
            "handbag": garments,
            "wallet": null,
            "watch": [],
        }
    })
}

struct Harness {
    backend: MockBackend,
    state: AppState,
    _dir: tempfile::TempDir,
}

async fn harness(overrides: &[(&str, &str)]) -> Harness {
    let backend = MockBackend::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let config = backend.config(dir.path(), overrides).unwrap();
    let state = AppState::with_store(config, Arc::new(FileStore::new(dir.path()))).unwrap();
    Harness {
        backend,
        state,
        _dir: dir,
    }
}

/// Store a token and `profile` as a login would.
fn sign_in(state: &AppState, profile: &serde_json::Value) {
    let profile: UserProfile = serde_json::from_value(profile.clone()).unwrap();
    state
        .session()
        .set_token(&AuthToken::new(TEST_TOKEN))
        .unwrap();
    state.session().save_profile(&profile).unwrap();
}

/// Open the handbags page and run its job to completion.
async fn open_handbags(state: &AppState) -> (CategoryPage, Option<PipelineOutcome>) {
    let mut page = CategoryPage::load(Category::Handbags, state.session()).unwrap();
    let Some(job) = page.next_job() else {
        return (page, None);
    };

    let (progress, _updates) = watch::channel(TryOnResults::new());
    let outcome = state
        .pipeline()
        .run(&job, &progress, &CancellationToken::new())
        .await
        .unwrap();
    page.apply(outcome.results().clone());
    (page, Some(outcome))
}

#[tokio::test]
async fn test_first_four_recommendations_are_generated() {
    let h = harness(&[]).await;
    sign_in(&h.state, &profile_json(FACE, &handbags(5)));

    let (page, outcome) = open_handbags(&h.state).await;
    assert!(matches!(outcome, Some(PipelineOutcome::Generated(_))));

    let mut requested: Vec<String> = h
        .backend
        .generations()
        .into_iter()
        .map(|g| g.garment_url)
        .collect();
    requested.sort();
    assert_eq!(requested, handbags(4));

    let shown: Vec<&str> = page.tiles().iter().map(|t| t.garment_url).collect();
    assert_eq!(shown, handbags(4));
    for tile in page.tiles() {
        let TileState::Generated(image) = tile.state else {
            panic!("tile not generated: {tile:?}");
        };
        let (mime, bytes) = decode_data_url(image).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, fake_image(tile.garment_url));
    }
}

#[tokio::test]
async fn test_requests_carry_face_and_garment_type() {
    let h = harness(&[]).await;
    sign_in(&h.state, &profile_json(FACE, &handbags(1)));
    open_handbags(&h.state).await;

    let sent = h.backend.generations();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].model_face_url, FACE);
    assert_eq!(sent[0].garment_type.as_deref(), Some("handbag"));

    let h = harness(&[("TRYON_SEND_GARMENT_TYPE", "false")]).await;
    sign_in(&h.state, &profile_json(FACE, &handbags(1)));
    open_handbags(&h.state).await;
    assert_eq!(h.backend.generations()[0].garment_type, None);
}

#[tokio::test]
async fn test_miss_persists_entry_and_hit_makes_no_calls() {
    let h = harness(&[]).await;
    sign_in(&h.state, &profile_json(FACE, &handbags(3)));

    open_handbags(&h.state).await;
    assert_eq!(h.backend.generation_calls(), 3);

    let entry = h
        .state
        .session()
        .try_on_cache()
        .get(Category::Handbags, FACE)
        .unwrap()
        .unwrap();
    assert_eq!(entry.model_image, FACE);
    assert_eq!(entry.results.len(), 3);

    // A fresh page load is served entirely from the cache
    let (page, outcome) = open_handbags(&h.state).await;
    assert_eq!(h.backend.generation_calls(), 3);
    let Some(PipelineOutcome::Cached(cached)) = outcome else {
        panic!("expected a cache hit, got {outcome:?}");
    };
    assert_eq!(cached.results, entry.results);
    assert_eq!(page.results(), &entry.results);
}

#[tokio::test]
async fn test_new_profile_picture_regenerates() {
    let h = harness(&[]).await;
    sign_in(&h.state, &profile_json(FACE, &handbags(2)));
    open_handbags(&h.state).await;
    assert_eq!(h.backend.generation_calls(), 2);

    let new_face = "https://cdn.example.com/new-face.jpg";
    sign_in(&h.state, &profile_json(new_face, &handbags(2)));
    let (_, outcome) = open_handbags(&h.state).await;

    assert!(matches!(outcome, Some(PipelineOutcome::Generated(_))));
    assert_eq!(h.backend.generation_calls(), 4);
    let entry = h
        .state
        .session()
        .try_on_cache()
        .get(Category::Handbags, new_face)
        .unwrap()
        .unwrap();
    assert_eq!(entry.model_image, new_face);
}

#[tokio::test]
async fn test_failed_garment_is_isolated() {
    let h = harness(&[]).await;
    let garments = handbags(4);
    h.backend.fail_garment(&garments[1]);
    sign_in(&h.state, &profile_json(FACE, &garments));

    let (page, _) = open_handbags(&h.state).await;
    assert_eq!(h.backend.generation_calls(), 4);

    let results = page.results();
    assert_eq!(results.get(&garments[1]), Some(&TryOnOutcome::Failed));
    for garment in [&garments[0], &garments[2], &garments[3]] {
        assert!(matches!(results.get(garment), Some(TryOnOutcome::Generated(_))));
    }

    let tiles = page.tiles();
    assert_eq!(tiles[1].state, TileState::Failed);
    assert_eq!(tiles[1].display_image(), garments[1]);

    // The failure is cached as the sentinel, not retried on the next load
    let raw = h
        .state
        .session()
        .store()
        .get("tryOnResults_handbags")
        .unwrap()
        .unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored["results"][&garments[1]], "error");
    assert_eq!(stored["modelImage"], FACE);
    assert!(stored["timestamp"].is_i64());

    open_handbags(&h.state).await;
    assert_eq!(h.backend.generation_calls(), 4);
}

#[tokio::test]
async fn test_sequential_strategy_publishes_in_order() {
    let h = harness(&[("TRYON_STRATEGY", "sequential"), ("TRYON_DELAY_SECS", "0")]).await;
    let garments = handbags(3);
    sign_in(&h.state, &profile_json(FACE, &garments));

    let mut page = CategoryPage::load(Category::Handbags, h.state.session()).unwrap();
    let job = page.next_job().unwrap();
    let (progress, mut updates) = watch::channel(TryOnResults::new());

    let pipeline = h.state.pipeline();
    let cancel = CancellationToken::new();
    let run = pipeline.run(&job, &progress, &cancel);
    tokio::pin!(run);

    let mut seen = Vec::new();
    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome.unwrap(),
            Ok(()) = updates.changed() => seen.push(updates.borrow_and_update().len()),
        }
    };

    assert!(matches!(outcome, PipelineOutcome::Generated(_)));
    let requested: Vec<String> = h
        .backend
        .generations()
        .into_iter()
        .map(|g| g.garment_url)
        .collect();
    assert_eq!(requested, garments);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {seen:?}");
}

#[tokio::test]
async fn test_cancelled_run_is_not_cached() {
    let h = harness(&[("TRYON_STRATEGY", "sequential"), ("TRYON_DELAY_SECS", "60")]).await;
    sign_in(&h.state, &profile_json(FACE, &handbags(3)));

    let mut page = CategoryPage::load(Category::Handbags, h.state.session()).unwrap();
    let job = page.next_job().unwrap();
    let (progress, mut updates) = watch::channel(TryOnResults::new());
    let cancel = CancellationToken::new();

    let pipeline = h.state.pipeline();
    let run = pipeline.run(&job, &progress, &cancel);
    tokio::pin!(run);

    // Navigate away once the first result lands, during the throttle pause
    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome.unwrap(),
            Ok(()) = updates.changed() => {
                if !updates.borrow_and_update().is_empty() {
                    cancel.cancel();
                }
            }
        }
    };

    let PipelineOutcome::Cancelled { partial } = outcome else {
        panic!("expected cancellation, got {outcome:?}");
    };
    assert_eq!(partial.len(), 1);
    assert_eq!(h.backend.generation_calls(), 1);
    assert!(
        h.state
            .session()
            .try_on_cache()
            .get(Category::Handbags, FACE)
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_no_profile_picture_means_no_requests() {
    let h = harness(&[]).await;
    sign_in(&h.state, &json!({ "recommended_products": { "handbag": handbags(2) } }));

    let (page, outcome) = open_handbags(&h.state).await;
    assert_eq!(page.state(), &CategoryState::Recommended);
    assert!(outcome.is_none());
    assert_eq!(h.backend.generation_calls(), 0);
}
