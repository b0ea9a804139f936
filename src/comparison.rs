//! Scrapes the source and reference catalogs in turn and diffs them.

use crate::catalog_scraper::{CatalogScraper, ScrapeError};
use crate::config::SiteProfile;
use crate::differ::diff_catalogs;
use crate::models::{Catalog, DiffResult};
use crate::renderer::RendererLauncher;

/// Both scraped catalogs and the apps the reference lacks
#[derive(Debug, Clone)]
pub struct Comparison {
    pub source: Catalog,
    pub reference: Catalog,
    pub diff: DiffResult,
}

/// Scrape `source_site`, then `reference_site`, and diff them.
///
/// Sites are scraped one after the other so only one browser is alive at a
/// time. A fatal failure on the source skips the reference entirely.
pub async fn compare<L: RendererLauncher>(
    scraper: &CatalogScraper<L>,
    source_site: &SiteProfile,
    reference_site: &SiteProfile,
) -> Result<Comparison, ScrapeError> {
    let source = scraper.scrape(source_site).await?;
    let reference = scraper.scrape(reference_site).await?;

    let diff = diff_catalogs(&source, &reference);
    tracing::info!(
        "{} of {} {} apps missing from {}",
        diff.len(),
        source.len(),
        source.source(),
        reference.source()
    );

    Ok(Comparison {
        source,
        reference,
        diff,
    })
}
