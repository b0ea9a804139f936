use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Scrape the Pipedream and Composio catalogs and list apps missing from Composio.
/// Exit codes: 0=success, 2=invalid arguments, 3=report write error, 4=scrape failed
#[derive(Parser, Debug)]
#[command(name = "catalog_diff")]
#[command(about = "Scrape Pipedream + Composio app catalogs and list apps missing from Composio")]
#[command(version)]
pub struct Cli {
    #[arg(long, default_value = Config::PIPEDREAM_URL, value_parser = parse_http_url, help = "Pipedream catalog page (source)")]
    pub pipedream_url: String,

    #[arg(long, default_value = Config::COMPOSIO_URL, value_parser = parse_http_url, help = "Composio catalog page (reference)")]
    pub composio_url: String,

    #[arg(
        long,
        default_value_t = Config::MAX_SCROLLS,
        help = "Maximum scroll-to-bottom iterations per catalog"
    )]
    pub max_scrolls: u32,

    #[arg(
        long,
        default_value_t = Config::PAUSE_MS,
        help = "Pause after each scroll in milliseconds (gives lazy lists time to load)"
    )]
    pub pause_ms: u64,

    #[arg(short, long, default_value = Config::OUTPUT_PATH, help = "JSON output path")]
    pub output: PathBuf,

    #[arg(long, help = "Write an HTML report to this path")]
    pub html_report: Option<PathBuf>,

    #[arg(long, help = "Write a run summary (per-catalog counts and names) to this path")]
    pub summary: Option<PathBuf>,

    #[arg(long, help = "Run with a visible browser")]
    pub show: bool,

    #[arg(long, help = "Always run --max-scrolls iterations instead of stopping when a scroll adds nothing")]
    pub no_early_stop: bool,

    #[arg(
        long,
        default_value_t = Config::NAV_TIMEOUT_SECS,
        help = "Navigation timeout in seconds"
    )]
    pub nav_timeout: u64,

    #[arg(long, help = "Path to a Chrome/Chromium executable (auto-detected by default)")]
    pub chrome_path: Option<PathBuf>,

    #[arg(long, help = "Also write daily-rotated text and JSON logs to this directory")]
    pub log_dir: Option<PathBuf>,
}

/// Accept only absolute http(s) URLs so typos fail at parse time, not in the browser.
fn parse_http_url(raw: &str) -> Result<String, String> {
    let url = url::Url::parse(raw).map_err(|e| format!("invalid URL {:?}: {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.to_string()),
        other => Err(format!("unsupported URL scheme {:?} (expected http or https)", other)),
    }
}

impl Cli {
    /// Parse CLI arguments so the rest of the program can rely on structured options.
    /// On error, clap prints help and exits with code 2 (usage error).
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
