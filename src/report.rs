//! Report writers: the JSON diff, an optional HTML table, and an optional run summary.
//!
//! Every file is written to a temporary sibling first and renamed into place,
//! so a reader never sees a half-written report.

use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::{Catalog, DiffResult};

/// Errors that can occur while writing a report file
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize report for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ReportError {
    fn io(path: &Path, source: io::Error) -> Self {
        ReportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Per-catalog section of the run summary
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub source: String,
    pub url: String,
    /// Names extracted before normalized deduplication
    pub count: usize,
    pub normalized_count: usize,
    /// Set when nothing was extracted, usually a sign of selector drift
    pub empty: bool,
    pub names: Vec<String>,
}

impl From<&Catalog> for CatalogSummary {
    fn from(catalog: &Catalog) -> Self {
        Self {
            source: catalog.source().to_string(),
            url: catalog.url().to_string(),
            count: catalog.raw_count(),
            normalized_count: catalog.len(),
            empty: catalog.is_empty(),
            names: catalog.display_names().into_iter().map(str::to_string).collect(),
        }
    }
}

/// Everything one run saw, for auditing a diff after the fact
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub source: CatalogSummary,
    pub reference: CatalogSummary,
    pub missing: Vec<String>,
}

impl RunSummary {
    pub fn new(source: &Catalog, reference: &Catalog, diff: &DiffResult) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            source: source.into(),
            reference: reference.into(),
            missing: diff.display_names().into_iter().map(str::to_string).collect(),
        }
    }
}

/// Write `path` atomically: content goes to a temp file in the same
/// directory, which then replaces the target.
fn write_atomically<F>(path: &Path, fill: F) -> Result<(), ReportError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), ReportError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ReportError::io(path, e))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        fill(&mut writer)?;
        writer.flush().map_err(|e| ReportError::io(path, e))?;
    }
    temp.as_file().sync_all().map_err(|e| ReportError::io(path, e))?;
    temp.persist(path).map_err(|e| ReportError::io(path, e.error))?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    write_atomically(path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, value).map_err(|source| ReportError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        writer.write_all(b"\n").map_err(|e| ReportError::io(path, e))
    })
}

/// JSON array of `{"name", "normalized"}` objects, one per missing app.
pub fn write_json_report<P: AsRef<Path>>(path: P, diff: &DiffResult) -> Result<(), ReportError> {
    write_json(path.as_ref(), diff)
}

/// The run summary document.
pub fn write_summary<P: AsRef<Path>>(path: P, summary: &RunSummary) -> Result<(), ReportError> {
    write_json(path.as_ref(), summary)
}

/// Self-contained HTML document with a table of the missing apps.
pub fn write_html_report<P: AsRef<Path>>(path: P, diff: &DiffResult) -> Result<(), ReportError> {
    let path = path.as_ref();
    let html = render_html(diff);
    write_atomically(path, |writer| {
        writer.write_all(html.as_bytes()).map_err(|e| ReportError::io(path, e))
    })
}

pub fn render_html(diff: &DiffResult) -> String {
    let mut rows = String::new();
    for (index, name) in diff.names().iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(
            rows,
            "        <tr><td>{}</td><td>{}</td></tr>",
            index + 1,
            escape_html(name.display())
        );
    }

    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>{title}</title>
    <style>
      body {{ font-family: Arial, sans-serif; margin: 2rem; }}
      table {{ border-collapse: collapse; width: 100%; }}
      th, td {{ border: 1px solid #ddd; padding: 8px; }}
      th {{ background: #f5f5f5; text-align: left; }}
      caption {{ caption-side: bottom; padding-top: 0.75rem; color: #555; }}
    </style>
  </head>
  <body>
    <h1>{title}</h1>
    <p>Count: {count}</p>
    <table>
      <thead>
        <tr><th>#</th><th>App name</th></tr>
      </thead>
      <tbody>
{rows}      </tbody>
      <caption>Generated by {generator}</caption>
    </table>
  </body>
</html>
"#,
        title = Config::REPORT_TITLE,
        count = diff.len(),
        rows = rows,
        generator = env!("CARGO_PKG_NAME"),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Which outputs a run should produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTargets {
    pub json: PathBuf,
    pub html: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Json,
    Html,
    Summary,
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Json => write!(f, "JSON report"),
            ReportKind::Html => write!(f, "HTML report"),
            ReportKind::Summary => write!(f, "Run summary"),
        }
    }
}

/// Result of writing one output
#[derive(Debug)]
pub struct ReportOutcome {
    pub kind: ReportKind,
    pub path: PathBuf,
    pub result: Result<(), ReportError>,
}

/// Write every requested output. A failure never prevents the others from
/// being attempted.
pub fn write_reports(targets: &ReportTargets, diff: &DiffResult, summary: &RunSummary) -> Vec<ReportOutcome> {
    let mut outcomes = vec![ReportOutcome {
        kind: ReportKind::Json,
        path: targets.json.clone(),
        result: write_json_report(&targets.json, diff),
    }];

    if let Some(path) = &targets.html {
        outcomes.push(ReportOutcome {
            kind: ReportKind::Html,
            path: path.clone(),
            result: write_html_report(path, diff),
        });
    }

    if let Some(path) = &targets.summary {
        outcomes.push(ReportOutcome {
            kind: ReportKind::Summary,
            path: path.clone(),
            result: write_summary(path, summary),
        });
    }

    for outcome in &outcomes {
        match &outcome.result {
            Ok(()) => tracing::info!("{} written to {}", outcome.kind, outcome.path.display()),
            Err(e) => tracing::error!("{} not written: {}", outcome.kind, e),
        }
    }

    outcomes
}
