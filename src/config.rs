// Global configuration constants - single source of truth

pub struct Config;

impl Config {
    // Catalog URLs
    pub const PIPEDREAM_URL: &'static str = "https://pipedream.com/explore";
    pub const COMPOSIO_URL: &'static str = "https://composio.dev/toolkits";

    // Scrolling
    pub const MAX_SCROLLS: u32 = 60;
    pub const PAUSE_MS: u64 = 750;

    // Browser
    pub const NAV_TIMEOUT_SECS: u64 = 60;
    pub const SETTLE_MS: u64 = 1500; // after load, for client-side fetches to land
    pub const WINDOW_WIDTH: u32 = 1280;
    pub const WINDOW_HEIGHT: u32 = 1024;
    pub const USER_AGENT: &'static str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

    // Outputs
    pub const OUTPUT_PATH: &'static str = "apps_missing_from_composio.json";
    pub const REPORT_TITLE: &'static str = "Apps missing from Composio";

    // Page scripts
    pub const SCROLL_SCRIPT: &'static str = "window.scrollTo(0, document.body.scrollHeight)";
    pub const HTML_SCRIPT: &'static str = "document.documentElement.outerHTML";
    pub const GLOBALS_SCRIPT: &'static str = r#"(() => {
        const out = {};
        for (const key of ["__NEXT_DATA__", "__NUXT__"]) {
            try {
                const value = window[key];
                if (value) out[key] = JSON.parse(JSON.stringify(value));
            } catch (e) {}
        }
        return out;
    })()"#;
}

/// Site-specific extraction settings: where to look and what to look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    /// Short catalog name used in logs and reports
    pub source: String,
    pub url: String,
    /// CSS selectors, most specific first
    pub selectors: Vec<String>,
    /// JSON keys that hold an app name inside embedded page data
    pub key_hints: Vec<String>,
}

impl SiteProfile {
    pub fn new(source: &str, url: &str, selectors: &[&str], key_hints: &[&str]) -> Self {
        Self {
            source: source.to_string(),
            url: url.to_string(),
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            key_hints: key_hints.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn pipedream(url: &str) -> Self {
        Self::new(
            "pipedream",
            url,
            &[
                "a[href^='/apps/']",
                "[data-testid*='app'] a",
                "[data-testid*='App'] a",
                "[class*='app'] a",
            ],
            &["name", "app", "appname"],
        )
    }

    pub fn composio(url: &str) -> Self {
        Self::new(
            "composio",
            url,
            &[
                "a[href^='/toolkits/']",
                "[data-testid*='toolkit'] a",
                "[class*='toolkit'] a",
            ],
            &["name", "toolkit", "toolkitname"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_builtin_selectors_parse() {
        for site in [SiteProfile::pipedream(Config::PIPEDREAM_URL), SiteProfile::composio(Config::COMPOSIO_URL)] {
            for raw in &site.selectors {
                assert!(Selector::parse(raw).is_ok(), "{} selector {:?} should parse", site.source, raw);
            }
        }
    }

    #[test]
    fn test_profiles_keep_url() {
        let site = SiteProfile::composio("https://staging.composio.dev/toolkits");
        assert_eq!(site.source, "composio");
        assert_eq!(site.url, "https://staging.composio.dev/toolkits");
        assert!(site.key_hints.contains(&"toolkitname".to_string()));
    }
}
