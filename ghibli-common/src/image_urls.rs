//! Image URL helpers
//!
//! Thumbnails are pre-generated 480px WebP served from `/thumbnails/`;
//! full-size originals are PNG served from `/images/`. Both URLs are pure
//! functions of the object key, no I/O.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Matches JS `encodeURIComponent`: everything except A-Z a-z 0-9 - _ . ! ~ * ' ( )
const COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Thumbnail URL for grid display. Thumbnails are `.webp`, originals `.png`.
pub fn thumbnail_url(image_path: &str) -> String {
    let webp_path = replace_png_extension(image_path);
    format!("/thumbnails/{}", utf8_percent_encode(&webp_path, COMPONENT))
}

/// Full-size URL for lightbox display (original PNG)
pub fn full_image_url(image_path: &str) -> String {
    format!("/images/{}", utf8_percent_encode(image_path, COMPONENT))
}

fn replace_png_extension(path: &str) -> String {
    if path.len() >= 4 && path.as_bytes()[path.len() - 4..].eq_ignore_ascii_case(b".png") {
        format!("{}.webp", &path[..path.len() - 4])
    } else {
        path.to_string()
    }
}
