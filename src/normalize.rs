//! Name normalization shared by the extractor, catalogs and the differ.
//!
//! Two forms exist for every scraped name:
//! - the display form: whitespace collapsed and trimmed, casing untouched
//! - the match key: the display form lowercased
//!
//! Catalog deduplication and the diff compare match keys only.

use lazy_static::lazy_static;
use regex::Regex;

/// Navigation labels that selector matches pick up alongside real app links.
pub const SKIP_PHRASES: &[&str] = &[
    "explore",
    "apps",
    "workflows",
    "toolkits",
    "integration",
    "integrations",
    "browse",
    "learn more",
    "view all",
];

/// Names whose cleaned form is shorter than this are dropped as noise.
pub const MIN_NAME_LEN: usize = 2;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("Invalid whitespace regex");
    static ref NON_NAME_CHARS: Regex =
        Regex::new(r"[^\w\s\-+&.]").expect("Invalid name character regex");
}

/// Collapse internal whitespace runs to a single space and trim.
pub fn display_name(raw: &str) -> String {
    WHITESPACE.replace_all(raw, " ").trim().to_string()
}

/// Comparison key: lowercase, internal whitespace collapsed, trimmed.
pub fn match_key(raw: &str) -> String {
    display_name(raw).to_lowercase()
}

/// Stricter form used only to recognise noise: punctuation stripped and
/// `+` spelled out, so "Learn more ›" and "learn more" look alike.
fn noise_form(raw: &str) -> String {
    let key = match_key(raw);
    let stripped = NON_NAME_CHARS.replace_all(&key, "");
    let spelled = stripped.replace('+', " plus ");
    WHITESPACE.replace_all(&spelled, " ").trim().to_string()
}

/// True for empty strings, one-character fragments and navigation labels.
pub fn is_noise(raw: &str) -> bool {
    let cleaned = noise_form(raw);
    cleaned.chars().count() < MIN_NAME_LEN || SKIP_PHRASES.contains(&cleaned.as_str())
}

/// Drop noise and return the display form of everything else, in input order.
pub fn filter_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter(|name| !is_noise(name.as_ref()))
        .map(|name| display_name(name.as_ref()))
        .collect()
}
