//! Fixed placeholder showcase set
//!
//! Served by `/api/random` when object storage is unreachable or not
//! configured, so the landing page always has something to float.

use ghibli_common::types::GhibliImage;

/// Ocean Waves stills bundled with the front-end under `/placeholders/`
const PLACEHOLDER_FILES: &[(&str, &str)] = &[
    ("A Request.png", "A Request"),
    ("aiRikako.png", "Rikako"),
    ("airporTaku.png", "Taku at Airport"),
    ("Akiko Shimizu.png", "Akiko Shimizu"),
    ("Anxiously Waiting.png", "Anxiously Waiting"),
    ("Awkward.png", "Awkward"),
    ("Back Home.png", "Back Home"),
    ("Being Nosy.png", "Being Nosy"),
    ("Better Late Than Never.png", "Better Late Than Never"),
    ("Candid Rikako.png", "Candid Rikako"),
    ("Catching Up.png", "Catching Up"),
];

/// Build the full placeholder record set.
pub fn placeholder_images() -> Vec<GhibliImage> {
    PLACEHOLDER_FILES
        .iter()
        .map(|(filename, description)| GhibliImage {
            filename: (*filename).to_string(),
            year: 1993,
            movie_name: "Ocean Waves".to_string(),
            description: (*description).to_string(),
            movie_slug: "ocean-waves".to_string(),
            image_url: format!("/placeholders/{}", filename),
            thumbnail_url: format!("/placeholders/{}", filename),
            score: 1.0,
        })
        .collect()
}
