//! Drives a renderer session over one catalog page and collects its app names.

use std::collections::HashSet;
use std::time::Duration;

use crate::config::{Config, SiteProfile};
use crate::extractor::NameExtractor;
use crate::models::Catalog;
use crate::normalize::match_key;
use crate::renderer::{RenderError, Renderer, RendererLauncher};

/// Lazy-load scrolling behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSettings {
    pub max_scrolls: u32,
    pub pause: Duration,
    /// Stop as soon as a scroll adds no new names
    pub early_stop: bool,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            max_scrolls: Config::MAX_SCROLLS,
            pause: Duration::from_millis(Config::PAUSE_MS),
            early_stop: true,
        }
    }
}

/// Errors that abort the scrape of one catalog
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Could not start a {backend} session for {source_name}: {error}")]
    Launch {
        source_name: String,
        backend: &'static str,
        #[source]
        error: RenderError,
    },

    #[error("Could not load {source_name} catalog at {url}: {error}")]
    NavigationFailure {
        source_name: String,
        url: String,
        #[source]
        error: RenderError,
    },

    #[error("Could not read the {source_name} page: {error}")]
    Snapshot {
        source_name: String,
        #[source]
        error: RenderError,
    },
}

/// Names seen so far, unique by match key, in first-seen order
#[derive(Debug, Default)]
struct NameUnion {
    seen: HashSet<String>,
    names: Vec<String>,
}

impl NameUnion {
    /// Returns how many names were new.
    fn extend(&mut self, names: Vec<String>) -> usize {
        let before = self.names.len();
        for name in names {
            if self.seen.insert(match_key(&name)) {
                self.names.push(name);
            }
        }
        self.names.len() - before
    }
}

/// Scrapes catalogs one at a time, each in its own renderer session
pub struct CatalogScraper<L> {
    launcher: L,
    scroll: ScrollSettings,
}

impl<L: RendererLauncher> CatalogScraper<L> {
    pub fn new(launcher: L, scroll: ScrollSettings) -> Self {
        Self { launcher, scroll }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Load the site, scroll until the list stops growing (or the cap is hit),
    /// and return every name seen along the way.
    ///
    /// The session is closed before returning on every path.
    #[tracing::instrument(skip(self, site), fields(source = %site.source, url = %site.url))]
    pub async fn scrape(&self, site: &SiteProfile) -> Result<Catalog, ScrapeError> {
        let extractor = NameExtractor::for_site(site);

        let mut session = self
            .launcher
            .launch()
            .await
            .map_err(|error| ScrapeError::Launch {
                source_name: site.source.clone(),
                backend: self.launcher.name(),
                error,
            })?;

        let collected = self.collect_names(session.as_mut(), site, &extractor).await;

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close {} session: {}", site.source, e);
        }

        let catalog = Catalog::from_raw(&site.source, &site.url, collected?);
        if catalog.is_empty() {
            tracing::warn!(
                "No app names extracted from {} ({}); selectors may have drifted",
                site.source,
                site.url
            );
        } else {
            tracing::info!("Scraped {} names from {}", catalog.len(), site.source);
        }
        Ok(catalog)
    }

    async fn collect_names(
        &self,
        renderer: &mut dyn Renderer,
        site: &SiteProfile,
        extractor: &NameExtractor,
    ) -> Result<Vec<String>, ScrapeError> {
        renderer
            .navigate(&site.url)
            .await
            .map_err(|error| ScrapeError::NavigationFailure {
                source_name: site.source.clone(),
                url: site.url.clone(),
                error,
            })?;

        let snapshot = renderer.snapshot().await.map_err(|error| ScrapeError::Snapshot {
            source_name: site.source.clone(),
            error,
        })?;

        let mut union = NameUnion::default();
        union.extend(extractor.extract(&snapshot));
        tracing::debug!("Initial load: {} names", union.names.len());

        for scroll in 1..=self.scroll.max_scrolls {
            // Past the first load, renderer hiccups only cut the scroll short.
            if let Err(e) = renderer.scroll_to_bottom().await {
                tracing::warn!("Scroll {} failed on {}, keeping {} names: {}", scroll, site.source, union.names.len(), e);
                break;
            }
            tokio::time::sleep(self.scroll.pause).await;

            let snapshot = match renderer.snapshot().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!("Snapshot after scroll {} failed on {}: {}", scroll, site.source, e);
                    break;
                }
            };

            let added = union.extend(extractor.extract(&snapshot));
            tracing::debug!("Scroll {}: +{} names ({} total)", scroll, added, union.names.len());

            if added == 0 && self.scroll.early_stop {
                tracing::debug!("No growth after scroll {}, stopping", scroll);
                break;
            }
        }

        Ok(union.names)
    }
}
