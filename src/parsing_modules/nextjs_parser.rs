//! Next.js data extraction parser.
//!
//! Next.js embeds page props in a `<script id="__NEXT_DATA__">` tag for
//! client-side hydration:
//!
//! ```html
//! <script id="__NEXT_DATA__" type="application/json">
//! {"props": {"pageProps": {"apps": [{"name": "Slack"}, ...]}}}
//! </script>
//! ```
//!
//! Catalog pages built on Next.js carry their whole app list there, so it
//! survives markup changes that break CSS selectors.

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use serde_json::Value;

lazy_static! {
    static ref NEXT_DATA: Selector =
        Selector::parse(r#"script[id="__NEXT_DATA__"]"#).expect("Invalid __NEXT_DATA__ selector");
}

/// Parse the `__NEXT_DATA__` JSON of a rendered page.
///
/// Returns `None` when the script tag is absent or does not hold valid JSON.
pub fn extract_next_data(document: &Html) -> Option<Value> {
    let element = document.select(&NEXT_DATA).next()?;
    let json_text = element.text().collect::<String>();
    serde_json::from_str::<Value>(json_text.trim()).ok()
}

/// Narrow a `__NEXT_DATA__` document to `props.pageProps`, where page data
/// lives, so build metadata is not walked. Falls back to the whole document.
pub fn into_page_props(next_data: Value) -> Value {
    let props = next_data
        .pointer("/props/pageProps")
        .filter(|props| !props.is_null())
        .cloned();
    props.unwrap_or(next_data)
}
