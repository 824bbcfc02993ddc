//! Request handlers, one module per deployable unit.
//!
//! Each handler follows the same shape: validate the input model, fetch
//! the caller's reference image, patch a clone of the unit's workflow
//! template at its designated node slots, and run the pipeline. Only
//! the slot constants and response shape differ between units.

pub mod character_edit;
pub mod consistent_character;
pub mod light_pattern;

use std::io::Cursor;

use rand::Rng;

use kora_pipeline::InputImage;

use crate::error::AppError;

/// Random default seed, bounded to the engine's 32-bit seed space but
/// carried as i64 to match the wire type.
pub(crate) fn random_seed() -> i64 {
    rand::rng().random_range(0..=u32::MAX as i64)
}

/// Fetch a caller-supplied image URL and normalize it to PNG.
///
/// The engine's image loader accepts several formats, but normalizing
/// here means one upload content type and one decode failure point,
/// surfaced to the caller as a 400 rather than a mid-job engine error.
pub(crate) async fn fetch_input_image(
    http: &reqwest::Client,
    url: &str,
) -> Result<InputImage, AppError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::InputImage(format!("failed to fetch '{url}': {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::InputImage(format!(
            "fetching '{url}' returned status {status}"
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::InputImage(format!("failed to read body of '{url}': {e}")))?;

    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| AppError::InputImage(format!("'{url}' is not a decodable image: {e}")))?;

    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| AppError::InputImage(format!("failed to re-encode input image: {e}")))?;

    Ok(InputImage::with_random_name(png))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_seed_stays_in_u32_range() {
        for _ in 0..100 {
            let seed = random_seed();
            assert!((0..=u32::MAX as i64).contains(&seed));
        }
    }
}
