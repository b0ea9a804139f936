//! Framework-specific parsers for embedded page-state JSON.
//!
//! Client-rendered catalog pages ship the data behind their lists in a
//! hydration blob. When CSS selectors stop matching, these blobs are the
//! fallback source of app records:
//!
//! - **Next.js**: `<script id="__NEXT_DATA__">`
//! - **Nuxt 3**: `<script id="__NUXT_DATA__">` (devalue-flattened payload)
//! - **Nuxt 2**: `window.__NUXT__ = {...}` when the assignment is plain JSON

pub mod nextjs_parser;
pub mod nuxt_parser;

use scraper::Html;
use serde_json::Value;

/// Every embedded data blob found in the document, Next.js first.
pub fn collect_embedded_blobs(document: &Html) -> Vec<Value> {
    let mut blobs = Vec::new();
    blobs.extend(nextjs_parser::extract_next_data(document).map(nextjs_parser::into_page_props));
    blobs.extend(nuxt_parser::extract_nuxt_payload(document));
    blobs.extend(nuxt_parser::extract_nuxt_window_state(document));
    blobs
}
