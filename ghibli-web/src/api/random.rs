//! `GET /api/random`: random showcase images for the landing page

use axum::extract::State;
use axum::Json;
use rand::seq::SliceRandom;

use ghibli_common::parse_filename;
use ghibli_common::types::{GhibliImage, RandomResponse};

use crate::services::placeholder_images;
use crate::AppState;

/// How many showcase images the landing page floats
const SHOWCASE_COUNT: usize = 7;
/// Storage list page cap
const LIST_LIMIT: u32 = 1000;

/// Pick 7 random stills from the bucket. Any storage trouble, including no
/// storage being configured at all, degrades to the bundled placeholder set
/// rather than an error.
pub async fn random_images(State(state): State<AppState>) -> Json<RandomResponse> {
    if !state.store.is_configured() {
        return Json(RandomResponse {
            results: shuffled_placeholders(),
        });
    }

    match state.store.list(LIST_LIMIT).await {
        Ok(keys) => {
            let mut image_keys: Vec<String> = keys
                .into_iter()
                .filter(|k| {
                    let lower = k.to_lowercase();
                    lower.ends_with(".png") || lower.ends_with(".jpg") || lower.ends_with(".jpeg")
                })
                .collect();
            image_keys.shuffle(&mut rand::thread_rng());

            let results = image_keys
                .iter()
                .take(SHOWCASE_COUNT)
                .map(|key| parse_filename(key, 1.0))
                .collect();

            Json(RandomResponse { results })
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to list random images, using fallback");
            Json(RandomResponse {
                results: shuffled_placeholders(),
            })
        }
    }
}

fn shuffled_placeholders() -> Vec<GhibliImage> {
    let mut images = placeholder_images();
    images.shuffle(&mut rand::thread_rng());
    images.truncate(SHOWCASE_COUNT);
    images
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_fallback_yields_seven() {
        assert_eq!(shuffled_placeholders().len(), SHOWCASE_COUNT);
    }
}
