//! Single-garment try-on and cache maintenance.

use std::io::Write;
use std::path::{Path, PathBuf};

use fitting_room_core::Category;
use fitting_room_storefront::error::{AppError, add_breadcrumb};
use fitting_room_storefront::state::AppState;
use fitting_room_storefront::tryon::{decode_data_url, try_on_single};
use tracing::info;

use super::parse_category;

/// Generate one try-on image and write it to `out`.
///
/// # Errors
///
/// Returns an error if there is no profile picture, generation fails or the
/// file cannot be written.
pub async fn single(state: &AppState, garment: &str, out: &Path) -> Result<(), AppError> {
    add_breadcrumb("tryon", "Single try-on", Some(&[("garment", garment)]));
    let profile = state.session().profile()?;

    writeln!(std::io::stdout().lock(), "Generating...")?;
    let image = try_on_single(state.generator(), profile.as_ref(), garment).await?;

    let (_, bytes) = decode_data_url(&image)
        .ok_or_else(|| AppError::Internal("generated image is not a data URL".to_string()))?;
    tokio::fs::write(out, &bytes).await?;

    info!(path = %out.display(), bytes = bytes.len(), "Try-on image written");
    writeln!(std::io::stdout().lock(), "Saved {}", out.display())?;
    Ok(())
}

/// Write a generated image into `dir`, choosing the extension from its type.
///
/// # Errors
///
/// Returns an error if the image is not a data URL or cannot be written.
pub async fn save_image(dir: &Path, stem: &str, data_url: &str) -> Result<PathBuf, AppError> {
    let (mime, bytes) = decode_data_url(data_url)
        .ok_or_else(|| AppError::Internal("generated image is not a data URL".to_string()))?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{stem}.{}", extension(&mime)));
    tokio::fs::write(&path, &bytes).await?;
    Ok(path)
}

fn extension(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

/// Print which categories have results usable with the current picture.
///
/// # Errors
///
/// Returns an error if local storage cannot be read.
pub fn cache_status(state: &AppState) -> Result<(), AppError> {
    let cache = state.session().try_on_cache();
    let model_image = state
        .session()
        .profile()?
        .and_then(|p| p.model_image().map(str::to_owned));

    let mut out = std::io::stdout().lock();
    let Some(model_image) = model_image else {
        writeln!(out, "No profile picture set; cached results cannot be used")?;
        return Ok(());
    };

    for category in Category::ALL {
        match cache.get(category, &model_image)? {
            Some(entry) => {
                let failed = entry.results.values().filter(|o| o.is_failed()).count();
                writeln!(
                    out,
                    "{:<10} {} results ({failed} failed), {} minutes old",
                    category.display_name(),
                    entry.results.len(),
                    entry.age().num_minutes()
                )?;
            }
            None => writeln!(out, "{:<10} none", category.display_name())?,
        }
    }
    Ok(())
}

/// Drop cached results.
///
/// # Errors
///
/// Returns an error for an unknown category or if storage cannot be written.
pub fn cache_clear(state: &AppState, category: Option<&str>) -> Result<(), AppError> {
    let cache = state.session().try_on_cache();
    let mut out = std::io::stdout().lock();

    if let Some(slug) = category {
        let category = parse_category(slug)?;
        cache.clear(category)?;
        writeln!(out, "Cleared {}", category.display_name())?;
    } else {
        let cleared = cache.clear_all()?;
        writeln!(out, "Cleared {cleared} categories")?;
    }
    Ok(())
}
