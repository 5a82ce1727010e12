//! Home and category pages.

use std::io::Write;
use std::path::Path;

use fitting_room_core::{TileState, TryOnResults};
use fitting_room_storefront::catalog::Product;
use fitting_room_storefront::error::{AppError, add_breadcrumb};
use fitting_room_storefront::state::AppState;
use fitting_room_storefront::tryon::PipelineOutcome;
use fitting_room_storefront::views::{CategoryPage, CategoryState, HomeView};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::parse_category;
use super::tryon::save_image;

/// Print the home page.
///
/// # Errors
///
/// Returns an error if local storage cannot be read.
pub fn home(state: &AppState) -> Result<(), AppError> {
    let view = HomeView::load(state.session())?;
    let mut out = std::io::stdout().lock();

    writeln!(out, "Shop by category")?;
    for tile in &view.categories {
        if view.personalized && tile.recommendations > 0 {
            writeln!(
                out,
                "  {:<10} {} picked for you",
                tile.category.display_name(),
                tile.recommendations
            )?;
        } else {
            writeln!(out, "  {}", tile.category.display_name())?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Featured")?;
    print_products(&mut out, &view.featured)?;
    Ok(())
}

/// Open a category page, running the try-on pipeline for recommendations.
///
/// Ctrl-C cancels generation; nothing is cached for a cancelled run.
///
/// # Errors
///
/// Returns an error for an unknown category or if local storage fails.
pub async fn category(
    state: &AppState,
    slug: &str,
    save_dir: Option<&Path>,
) -> Result<(), AppError> {
    let category = parse_category(slug)?;
    add_breadcrumb("navigation", "Opened category", Some(&[("category", category.slug())]));

    let mut page = CategoryPage::load(category, state.session())?;
    writeln!(std::io::stdout().lock(), "{}", category.display_name())?;

    if *page.state() == CategoryState::Catalog {
        print_products(&mut std::io::stdout().lock(), &page.catalog())?;
        return Ok(());
    }

    let Some(job) = page.next_job() else {
        let mut out = std::io::stdout().lock();
        writeln!(out, "Set a profile picture to try these on:")?;
        for tile in page.tiles() {
            writeln!(out, "  {}", tile.garment_url)?;
        }
        return Ok(());
    };

    let (progress, mut updates) = watch::channel(TryOnResults::new());
    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let pipeline = state.pipeline();
    let run = pipeline.run(&job, &progress, &cancel);
    tokio::pin!(run);

    let total = job.garments().len();
    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome,
            Ok(()) = updates.changed() => {
                let done = updates.borrow_and_update().len();
                if done > 0 {
                    writeln!(std::io::stdout().lock(), "  [{done}/{total}] done")?;
                }
            }
        }
    };
    ctrl_c.abort();
    let outcome = outcome?;

    match &outcome {
        PipelineOutcome::Cached(entry) => debug!(age = ?entry.age(), "Showing cached try-on results"),
        PipelineOutcome::Generated(_) => {}
        PipelineOutcome::Cancelled { partial } => {
            writeln!(
                std::io::stdout().lock(),
                "Cancelled after {} of {total}",
                partial.len()
            )?;
        }
    }
    page.apply(outcome.results().clone());

    for (n, tile) in page.tiles().iter().enumerate() {
        let status = match tile.state {
            TileState::Generated(image) => match save_dir {
                Some(dir) => {
                    let stem = format!("{}-{}", category.slug(), n + 1);
                    let path = save_image(dir, &stem, image).await?;
                    format!("saved to {}", path.display())
                }
                None => "ready".to_string(),
            },
            TileState::Pending => "not generated".to_string(),
            TileState::Failed => "failed".to_string(),
        };
        writeln!(
            std::io::stdout().lock(),
            "  {}. {:<14} {}",
            n + 1,
            status,
            tile.garment_url
        )?;
    }
    Ok(())
}

fn print_products(out: &mut impl Write, products: &[Product]) -> Result<(), AppError> {
    for product in products {
        writeln!(out, "  {:<30} {:>9}", product.name, product.price.to_string())?;
    }
    Ok(())
}
