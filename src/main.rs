use catalog_diff::browser::{BrowserOptions, ChromiumLauncher};
use catalog_diff::catalog_scraper::{CatalogScraper, ScrapeError, ScrollSettings};
use catalog_diff::cli::Cli;
use catalog_diff::comparison::{compare, Comparison};
use catalog_diff::config::SiteProfile;
use catalog_diff::logging::init_logging;
use catalog_diff::models::Catalog;
use catalog_diff::report::{write_reports, ReportOutcome, ReportTargets, RunSummary};
use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MainError {
    #[error("Scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("{0} report file(s) could not be written")]
    Reports(usize),
}

impl MainError {
    fn exit_code(&self) -> u8 {
        match self {
            MainError::Reports(_) => 3,
            MainError::Scrape(_) => 4,
        }
    }
}

fn build_scraper(cli: &Cli) -> CatalogScraper<ChromiumLauncher> {
    let launcher = ChromiumLauncher::new(BrowserOptions {
        headless: !cli.show,
        chrome_path: cli.chrome_path.clone(),
        nav_timeout: Duration::from_secs(cli.nav_timeout),
        ..BrowserOptions::default()
    });
    let scroll = ScrollSettings {
        max_scrolls: cli.max_scrolls,
        pause: Duration::from_millis(cli.pause_ms),
        early_stop: !cli.no_early_stop,
    };
    CatalogScraper::new(launcher, scroll)
}

fn count_line(label: &str, catalog: &Catalog) -> String {
    let mut line = format!("{} apps scraped: {}", label, catalog.raw_count());
    if catalog.is_empty() {
        line.push_str(" (warning: zero names extracted, selectors may be stale)");
    }
    line
}

fn print_summary(comparison: &Comparison, outcomes: &[ReportOutcome]) {
    println!("{}", count_line("Pipedream", &comparison.source));
    println!("{}", count_line("Composio", &comparison.reference));
    println!("Missing in Composio: {}", comparison.diff.len());
    for outcome in outcomes.iter().filter(|o| o.result.is_ok()) {
        println!("{} written to: {}", outcome.kind, outcome.path.display());
    }
}

async fn run(cli: Cli) -> Result<(), MainError> {
    let scraper = build_scraper(&cli);
    let comparison = compare(
        &scraper,
        &SiteProfile::pipedream(&cli.pipedream_url),
        &SiteProfile::composio(&cli.composio_url),
    )
    .await?;

    let targets = ReportTargets {
        json: cli.output,
        html: cli.html_report,
        summary: cli.summary,
    };
    let summary = RunSummary::new(&comparison.source, &comparison.reference, &comparison.diff);
    let outcomes = write_reports(&targets, &comparison.diff, &summary);

    print_summary(&comparison, &outcomes);

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        return Err(MainError::Reports(failed));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Terminal output still works if file logging cannot be set up.
    let _guard = match init_logging(cli.log_dir.as_deref()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
