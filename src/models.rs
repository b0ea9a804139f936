use serde::Serialize;
use std::collections::HashSet;

use crate::normalize::{display_name, match_key};

/// An application name as scraped from a catalog page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppName {
    /// Display form, original casing preserved
    #[serde(rename = "name")]
    display: String,

    /// Lowercased, whitespace-collapsed form used for matching
    #[serde(rename = "normalized")]
    key: String,
}

impl AppName {
    /// Build from a raw scraped string. Returns None when nothing is left after trimming.
    pub fn new(raw: &str) -> Option<Self> {
        let display = display_name(raw);
        if display.is_empty() {
            return None;
        }
        let key = match_key(&display);
        Some(Self { display, key })
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// The deduplicated set of names scraped from one site
#[derive(Debug, Clone)]
pub struct Catalog {
    source: String,
    url: String,
    names: Vec<AppName>,
    raw_count: usize,
}

impl Catalog {
    /// Build a catalog from raw extracted strings.
    /// Names are deduplicated by match key; the first display form wins and
    /// first-seen order is kept.
    pub fn from_raw<I, S>(source: impl Into<String>, url: impl Into<String>, raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        let mut raw_count = 0;

        for candidate in raw {
            let Some(name) = AppName::new(candidate.as_ref()) else {
                continue;
            };
            raw_count += 1;
            if seen.insert(name.key.clone()) {
                names.push(name);
            }
        }

        Self {
            source: source.into(),
            url: url.into(),
            names,
            raw_count,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn names(&self) -> &[AppName] {
        &self.names
    }

    /// Number of non-empty strings the catalog was built from, before deduplication
    pub fn raw_count(&self) -> usize {
        self.raw_count
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Match keys of every name in the catalog
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(AppName::key)
    }

    pub fn display_names(&self) -> Vec<&str> {
        self.names.iter().map(AppName::display).collect()
    }
}

/// Names present in the source catalog but absent from the reference catalog,
/// in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiffResult {
    missing: Vec<AppName>,
}

impl DiffResult {
    pub fn new(missing: Vec<AppName>) -> Self {
        Self { missing }
    }

    pub fn names(&self) -> &[AppName] {
        &self.missing
    }

    pub fn display_names(&self) -> Vec<&str> {
        self.missing.iter().map(AppName::display).collect()
    }

    pub fn len(&self) -> usize {
        self.missing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_name_forms() {
        let name = AppName::new("  Google   Sheets ").unwrap();
        assert_eq!(name.display(), "Google Sheets");
        assert_eq!(name.key(), "google sheets");
    }

    #[test]
    fn test_app_name_rejects_blank() {
        assert!(AppName::new("").is_none());
        assert!(AppName::new(" \t\n").is_none());
    }

    #[test]
    fn test_catalog_dedupes_by_key_keeping_first_display() {
        let catalog = Catalog::from_raw("pipedream", "https://pipedream.com/explore", ["Slack", "slack ", "Notion"]);
        assert_eq!(catalog.display_names(), vec!["Slack", "Notion"]);
        assert_eq!(catalog.raw_count(), 3);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_catalog_skips_blank_entries() {
        let catalog = Catalog::from_raw("composio", "https://composio.dev/toolkits", ["", "  ", "Gmail"]);
        assert_eq!(catalog.display_names(), vec!["Gmail"]);
        assert_eq!(catalog.raw_count(), 1);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::from_raw("composio", "https://composio.dev/toolkits", Vec::<String>::new());
        assert!(catalog.is_empty());
        assert_eq!(catalog.keys().count(), 0);
    }

    #[test]
    fn test_diff_result_serializes_as_array() {
        let diff = DiffResult::new(vec![AppName::new("Slack").unwrap()]);
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json, serde_json::json!([{"name": "Slack", "normalized": "slack"}]));
    }
}
