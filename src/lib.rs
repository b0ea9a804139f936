pub mod browser;
pub mod catalog_scraper;
pub mod cli;
pub mod comparison;
pub mod config;
pub mod differ;
pub mod extractor;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod parsing_modules;
pub mod renderer;
pub mod report;

// Re-export main types for library usage
pub use browser::{BrowserOptions, ChromiumLauncher};
pub use catalog_scraper::{CatalogScraper, ScrapeError, ScrollSettings};
pub use comparison::{compare, Comparison};
pub use config::{Config, SiteProfile};
pub use differ::diff_catalogs;
pub use extractor::{ExtractionStrategy, NameExtractor};
pub use models::{AppName, Catalog, DiffResult};
pub use renderer::{PageSnapshot, RenderError, Renderer, RendererLauncher, ScriptedLauncher, ScriptedRenderer};
pub use report::{write_reports, ReportError, ReportTargets, RunSummary};
