//! Filename parsing
//!
//! Every object key in the corpus follows the shape
//! `"(YEAR) Movie Name/Description.ext"`, e.g.
//! `"(1986) Laputa - Castle in the Sky/Holding Tight.png"`.
//! Parsing is total: malformed keys degrade to a fallback record instead of
//! an error, so a corrupt backend row can never take down a results page.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::image_urls::{full_image_url, thumbnail_url};
use crate::movie_slugs::movie_slug;
use crate::types::{GhibliImage, RawSearchResult};

/// `(YEAR) Movie Name/Description.extension`, year exactly 4 digits
static FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\((\d{4})\)\s+(.+?)/(.+)\.\w+$").expect("filename regex"));

/// Parse one object key plus its relevance score into a [`GhibliImage`].
///
/// Unparseable keys fall back to year 0 / movie "Unknown" with the raw key
/// as the description. Never fails.
pub fn parse_filename(filename: &str, score: f64) -> GhibliImage {
    let Some(caps) = FILENAME_RE.captures(filename) else {
        return GhibliImage {
            filename: filename.to_string(),
            year: 0,
            movie_name: "Unknown".to_string(),
            description: filename.to_string(),
            movie_slug: "unknown".to_string(),
            image_url: full_image_url(filename),
            thumbnail_url: thumbnail_url(filename),
            score,
        };
    };

    // Regex guarantees 4 digits, so the parse cannot fail
    let year: u32 = caps[1].parse().unwrap_or(0);
    let movie_name = caps[2].trim();
    let description = caps[3].trim();

    GhibliImage {
        filename: filename.to_string(),
        year,
        movie_name: movie_name.to_string(),
        description: description.to_string(),
        movie_slug: movie_slug(movie_name),
        image_url: full_image_url(filename),
        thumbnail_url: thumbnail_url(filename),
        score,
    }
}

/// Map a batch of raw backend results into display records
pub fn parse_search_results(results: &[RawSearchResult]) -> Vec<GhibliImage> {
    results
        .iter()
        .map(|r| parse_filename(&r.filename, r.score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_filename_round_trip() {
        let image = parse_filename("(2001) Spirited Away/Chihiro at the Bathhouse.png", 0.8);
        assert_eq!(image.year, 2001);
        assert_eq!(image.movie_name, "Spirited Away");
        assert_eq!(image.description, "Chihiro at the Bathhouse");
        assert_eq!(image.movie_slug, "chihiro");
        assert_eq!(image.score, 0.8);
    }

    #[test]
    fn malformed_filename_falls_back() {
        let image = parse_filename("not-a-valid-name.png", 0.5);
        assert_eq!(image.year, 0);
        assert_eq!(image.movie_name, "Unknown");
        assert_eq!(image.description, "not-a-valid-name.png");
        assert_eq!(image.movie_slug, "unknown");
        assert_eq!(image.score, 0.5);
    }

    #[test]
    fn two_digit_year_is_rejected() {
        let image = parse_filename("(86) Laputa/Holding Tight.png", 0.4);
        assert_eq!(image.year, 0);
        assert_eq!(image.movie_name, "Unknown");
    }

    #[test]
    fn movie_and_description_are_trimmed() {
        let image = parse_filename("(1992)  Porco Rosso/ Flying Low .png", 0.3);
        assert_eq!(image.movie_name, "Porco Rosso");
        assert_eq!(image.description, "Flying Low");
    }

    #[test]
    fn urls_derive_from_the_filename() {
        let image = parse_filename("(2008) Ponyo/Waves.png", 1.0);
        assert_eq!(image.image_url, "/images/(2008)%20Ponyo%2FWaves.png");
        assert_eq!(image.thumbnail_url, "/thumbnails/(2008)%20Ponyo%2FWaves.webp");
    }

    #[test]
    fn batch_mapping_preserves_order() {
        let raw = vec![
            RawSearchResult { filename: "(1988) My Neighbor Totoro/Bus Stop.png".into(), score: 0.9 },
            RawSearchResult { filename: "(1997) Princess Mononoke/Forest.png".into(), score: 0.7 },
        ];
        let images = parse_search_results(&raw);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].movie_slug, "totoro");
        assert_eq!(images[1].movie_slug, "mononoke");
    }
}
