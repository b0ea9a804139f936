//! Name extraction from rendered catalog pages.
//!
//! Extraction is a cascade of strategies tried in order:
//! 1. [`SelectorStrategy`]: the site's hand-maintained CSS selectors
//! 2. [`EmbeddedDataStrategy`]: framework hydration blobs (`__NEXT_DATA__`, `__NUXT__`)
//!
//! The first strategy that yields at least one non-noise name wins. When all
//! of them come back empty the page yields an empty list; a zero count is the
//! caller's signal that the selectors have drifted.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::SiteProfile;
use crate::normalize::filter_names;
use crate::parsing_modules::{collect_embedded_blobs, nextjs_parser};
use crate::renderer::PageSnapshot;

/// Outcome of a single strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Names(Vec<String>),
    NoMatch,
}

/// Parsed view of a snapshot shared by all strategies of one extraction pass
pub struct PageDom<'a> {
    pub document: Html,
    pub globals: &'a BTreeMap<String, Value>,
}

impl<'a> PageDom<'a> {
    pub fn new(snapshot: &'a PageSnapshot) -> Self {
        Self {
            document: Html::parse_document(&snapshot.html),
            globals: &snapshot.globals,
        }
    }
}

/// One way of deriving app names from a rendered page
pub trait ExtractionStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn extract(&self, page: &PageDom<'_>) -> Extraction;
}

/// Tries CSS selectors in order and returns the labels of the first selector
/// that matches anything besides noise.
pub struct SelectorStrategy {
    selectors: Vec<(String, Selector)>,
}

impl SelectorStrategy {
    /// Selectors that fail to parse are logged and skipped.
    pub fn new<S: AsRef<str>>(selectors: &[S]) -> Self {
        let selectors = selectors
            .iter()
            .filter_map(|raw| {
                let raw = raw.as_ref();
                match Selector::parse(raw) {
                    Ok(selector) => Some((raw.to_string(), selector)),
                    Err(e) => {
                        tracing::warn!("Skipping invalid selector {:?}: {}", raw, e);
                        None
                    }
                }
            })
            .collect();
        Self { selectors }
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

/// Text content of an element, or its `aria-label` for icon-only links.
fn element_label(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let text = text.trim();
    if !text.is_empty() {
        return Some(text.to_string());
    }
    element
        .value()
        .attr("aria-label")
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
}

impl ExtractionStrategy for SelectorStrategy {
    fn name(&self) -> &'static str {
        "css-selectors"
    }

    fn extract(&self, page: &PageDom<'_>) -> Extraction {
        for (raw, selector) in &self.selectors {
            let labels = page.document.select(selector).filter_map(element_label);
            let names = filter_names(labels);
            if !names.is_empty() {
                tracing::debug!("Selector {:?} matched {} names", raw, names.len());
                return Extraction::Names(names);
            }
        }
        Extraction::NoMatch
    }
}

/// Walks embedded framework data for string fields named like an app name.
pub struct EmbeddedDataStrategy {
    key_hints: Vec<String>,
}

impl EmbeddedDataStrategy {
    pub fn new<S: AsRef<str>>(key_hints: &[S]) -> Self {
        Self {
            key_hints: key_hints
                .iter()
                .map(|hint| hint.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Renderer-captured globals first, then the blobs embedded in the HTML.
    /// Both are walked: a Nuxt 3 page keeps only config on `window.__NUXT__`
    /// while its data sits in the `__NUXT_DATA__` script.
    fn blobs(page: &PageDom<'_>) -> Vec<Value> {
        let mut blobs: Vec<Value> = page
            .globals
            .iter()
            .map(|(name, value)| {
                if name == "__NEXT_DATA__" {
                    nextjs_parser::into_page_props(value.clone())
                } else {
                    value.clone()
                }
            })
            .collect();
        blobs.extend(collect_embedded_blobs(&page.document));
        blobs
    }
}

impl ExtractionStrategy for EmbeddedDataStrategy {
    fn name(&self) -> &'static str {
        "embedded-data"
    }

    fn extract(&self, page: &PageDom<'_>) -> Extraction {
        let mut hits = Vec::new();
        for blob in Self::blobs(page) {
            find_names_in_json(&blob, &self.key_hints, &mut hits);
        }
        let names = filter_names(hits);
        if names.is_empty() {
            Extraction::NoMatch
        } else {
            Extraction::Names(names)
        }
    }
}

/// Collect every string value whose key (case-insensitive) is one of `key_hints`,
/// in document order.
pub fn find_names_in_json(node: &Value, key_hints: &[String], hits: &mut Vec<String>) {
    match node {
        Value::Object(fields) => {
            for (key, value) in fields {
                if let Value::String(text) = value {
                    if key_hints.iter().any(|hint| hint.eq_ignore_ascii_case(key)) {
                        hits.push(text.clone());
                    }
                }
                find_names_in_json(value, key_hints, hits);
            }
        }
        Value::Array(items) => {
            for item in items {
                find_names_in_json(item, key_hints, hits);
            }
        }
        _ => {}
    }
}

/// Ordered strategy cascade for one site
pub struct NameExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl NameExtractor {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Selectors first, embedded data second.
    pub fn for_site(site: &SiteProfile) -> Self {
        Self::new(vec![
            Box::new(SelectorStrategy::new(&site.selectors)),
            Box::new(EmbeddedDataStrategy::new(&site.key_hints)),
        ])
    }

    /// Names from the first strategy that produces any; empty when none do.
    pub fn extract(&self, snapshot: &PageSnapshot) -> Vec<String> {
        let page = PageDom::new(snapshot);
        for strategy in &self.strategies {
            match strategy.extract(&page) {
                Extraction::Names(names) => {
                    tracing::debug!(
                        "Strategy {} extracted {} names from {}",
                        strategy.name(),
                        names.len(),
                        snapshot.url
                    );
                    return names;
                }
                Extraction::NoMatch => {
                    tracing::debug!("Strategy {} found nothing on {}", strategy.name(), snapshot.url);
                }
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pipedream_extractor() -> NameExtractor {
        NameExtractor::for_site(&SiteProfile::pipedream("https://pipedream.com/explore"))
    }

    #[test]
    fn test_selector_fixture() {
        let html = r#"
            <html><body>
              <nav><a href="/explore">Explore</a></nav>
              <a href="/apps/slack">Slack</a>
              <a href="/apps/notion">  Notion </a>
              <a href="/apps/google-sheets"><span>Google</span> <span>Sheets</span></a>
              <a href="/apps">Apps</a>
            </body></html>
        "#;
        let snapshot = PageSnapshot::from_html("https://pipedream.com/explore", html);
        assert_eq!(pipedream_extractor().extract(&snapshot), vec!["Slack", "Notion", "Google Sheets"]);
    }

    #[test]
    fn test_first_matching_selector_wins() {
        let strategy = SelectorStrategy::new(&["a.primary", "a"]);
        let html = r#"<a class="primary">Linear</a><a>Jira</a>"#;
        let snapshot = PageSnapshot::from_html("https://example.com", html);
        let page = PageDom::new(&snapshot);
        assert_eq!(strategy.extract(&page), Extraction::Names(vec!["Linear".to_string()]));
    }

    #[test]
    fn test_selector_matching_only_noise_falls_through() {
        let strategy = SelectorStrategy::new(&["nav a", "a.app"]);
        let html = r#"<nav><a>Browse</a><a>View all</a></nav><a class="app">Zoom</a>"#;
        let snapshot = PageSnapshot::from_html("https://example.com", html);
        let page = PageDom::new(&snapshot);
        assert_eq!(strategy.extract(&page), Extraction::Names(vec!["Zoom".to_string()]));
    }

    #[test]
    fn test_aria_label_fallback() {
        let strategy = SelectorStrategy::new(&["a[href^='/apps/']"]);
        let html = r#"<a href="/apps/figma" aria-label="Figma"><img src="figma.svg"></a>"#;
        let snapshot = PageSnapshot::from_html("https://example.com", html);
        let page = PageDom::new(&snapshot);
        assert_eq!(strategy.extract(&page), Extraction::Names(vec!["Figma".to_string()]));
    }

    #[test]
    fn test_invalid_selector_is_skipped() {
        let strategy = SelectorStrategy::new(&["a[", "a"]);
        assert_eq!(strategy.len(), 1);
    }

    #[test]
    fn test_falls_back_to_next_data() {
        let html = r#"
            <html><body>
              <div id="root"></div>
              <script id="__NEXT_DATA__" type="application/json">
              {"props":{"pageProps":{"apps":[{"name":"Airtable","slug":"airtable"},{"name":"HubSpot"}]}},"page":"/explore"}
              </script>
            </body></html>
        "#;
        let snapshot = PageSnapshot::from_html("https://pipedream.com/explore", html);
        assert_eq!(pipedream_extractor().extract(&snapshot), vec!["Airtable", "HubSpot"]);
    }

    #[test]
    fn test_renderer_globals_take_precedence() {
        let snapshot = PageSnapshot::from_html("https://composio.dev/toolkits", "<html><body></body></html>")
            .with_global("__NUXT__", json!({"state": {"toolkits": [{"toolkitName": "Gmail"}, {"name": "Asana"}]}}));
        let extractor = NameExtractor::for_site(&SiteProfile::composio("https://composio.dev/toolkits"));
        assert_eq!(extractor.extract(&snapshot), vec!["Gmail", "Asana"]);
    }

    #[test]
    fn test_html_blobs_walked_alongside_globals() {
        let html = r#"
            <html><body>
              <script type="application/json" id="__NUXT_DATA__">[{"toolkits":1},[2],{"name":3},"Gmail"]</script>
            </body></html>
        "#;
        let snapshot = PageSnapshot::from_html("https://composio.dev/toolkits", html)
            .with_global("__NUXT__", json!({"config": {"public": {"apiBase": "/api"}}}));
        let extractor = NameExtractor::for_site(&SiteProfile::composio("https://composio.dev/toolkits"));
        assert_eq!(extractor.extract(&snapshot), vec!["Gmail"]);
    }

    #[test]
    fn test_neither_strategy_matches() {
        let snapshot = PageSnapshot::from_html("https://pipedream.com/explore", "<html><body><p>Loading…</p></body></html>");
        assert!(pipedream_extractor().extract(&snapshot).is_empty());
    }

    #[test]
    fn test_empty_html_does_not_panic() {
        let snapshot = PageSnapshot::default();
        assert!(pipedream_extractor().extract(&snapshot).is_empty());
    }

    #[test]
    fn test_find_names_in_json_matches_hints_case_insensitively() {
        let data = json!({
            "Name": "Stripe",
            "items": [{"appName": "Shopify"}, {"label": "ignored"}, {"name": 42}]
        });
        let mut hits = Vec::new();
        find_names_in_json(&data, &["name".to_string(), "appname".to_string()], &mut hits);
        assert_eq!(hits, vec!["Stripe", "Shopify"]);
    }
}
