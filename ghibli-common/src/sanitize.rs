//! Search query sanitization
//!
//! Language-model output is messy: markdown fences, "Output:" labels,
//! quoting, filler verbs. This module turns a raw model response into a
//! short search phrase of at most eight words that never starts or ends on
//! a dangling function word. The stage order is load-bearing; each stage
//! operates on the output of the previous one.

use once_cell::sync::Lazy;
use regex::Regex;

/// Words that must never end a phrase (articles, prepositions, conjunctions,
/// copulas). Also used to filter the fallback rebuild.
const DANGLING_WORDS: &[&str] = &[
    "a", "an", "the", "of", "with", "in", "on", "at", "to", "for", "by", "from", "as", "and",
    "or", "but", "is", "are", "was", "were", "that", "which", "who", "being", "this", "its",
];

/// Words that must never start a phrase: the dangling set minus the articles,
/// which are acceptable leads.
fn is_start_dangling(word: &str) -> bool {
    !matches!(word, "a" | "an" | "the") && DANGLING_WORDS.contains(&word)
}

fn is_dangling(word: &str) -> bool {
    DANGLING_WORDS.contains(&word)
}

/// Words that only describe the medium, never the scene
static MEDIUM_WORDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(image|picture|photo|screenshot|photograph|description)\b").unwrap()
});

/// Verbs of showing, useless in a semantic query
static SHOWING_VERBS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(shows?|depicts?|displays?|features?|presents?|contains?|illustrates?)\b")
        .unwrap()
});

static FENCED_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static UNCLOSED_FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```\w*\s*").unwrap());
static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s*").unwrap());
static LIST_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[-*]\s+").unwrap());
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static SURROUNDING_QUOTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^["']|["']$"#).unwrap());
static LABEL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(Output|Query|Search|Search query|Keywords|Result):?\s*").unwrap()
});
static PUNCTUATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s'-]").unwrap());
static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

const MAX_QUERY_WORDS: usize = 8;
const FALLBACK_MAX_WORDS: usize = 6;
const MIN_QUERY_CHARS: usize = 3;

/// Sanitize a raw model response into a short search phrase.
///
/// Returns an empty string only when the input holds nothing but punctuation
/// and stop-words.
pub fn sanitize_query(raw: &str) -> String {
    let mut text = FENCED_BLOCK_RE.replace_all(raw, "").into_owned();
    text = UNCLOSED_FENCE_RE.replace_all(&text, "").into_owned();
    text = BOLD_RE.replace_all(&text, "$1").into_owned();
    text = ITALIC_RE.replace_all(&text, "$1").into_owned();
    text = HEADING_RE.replace_all(&text, "").into_owned();
    text = LIST_MARKER_RE.replace_all(&text, "").into_owned();
    text = LINK_RE.replace_all(&text, "$1").into_owned();
    text = SURROUNDING_QUOTES_RE.replace_all(&text, "").into_owned();
    text = LABEL_PREFIX_RE.replace(&text, "").into_owned();
    text = text.replace('\n', " ");
    text = PUNCTUATION_RE.replace_all(&text, " ").into_owned();
    text = MEDIUM_WORDS_RE.replace_all(&text, "").into_owned();
    text = SHOWING_VERBS_RE.replace_all(&text, "").into_owned();
    text = WHITESPACE_RUN_RE
        .replace_all(&text, " ")
        .to_lowercase()
        .trim()
        .to_string();

    let mut words: Vec<&str> = text.split_whitespace().collect();

    trim_trailing_dangling(&mut words);

    while words.first().is_some_and(|w| is_start_dangling(w)) {
        words.remove(0);
    }

    if words.len() > MAX_QUERY_WORDS {
        words.truncate(MAX_QUERY_WORDS);
        trim_trailing_dangling(&mut words);
    }

    let candidate = words.join(" ");
    if candidate.len() >= MIN_QUERY_CHARS {
        return candidate;
    }

    rebuild_from_raw(raw)
}

fn trim_trailing_dangling(words: &mut Vec<&str>) {
    while words.last().is_some_and(|w| is_dangling(w)) {
        words.pop();
    }
}

/// Last-resort phrase built straight from the raw input when the cleaned
/// candidate came out empty or too short.
fn rebuild_from_raw(raw: &str) -> String {
    const FALLBACK_SKIP: &[&str] = &["image", "picture", "photo", "shows", "depicts"];

    let stripped = NON_WORD_RE.replace_all(raw, " ").to_lowercase();
    let mut words: Vec<&str> = stripped
        .split_whitespace()
        .filter(|w| w.len() > 2 && !is_dangling(w) && !FALLBACK_SKIP.contains(w))
        .take(FALLBACK_MAX_WORDS)
        .collect();

    trim_trailing_dangling(&mut words);
    words.join(" ")
}
