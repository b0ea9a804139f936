//! Page renderer capability so catalog scraping can run against a real browser
//! or against prerecorded snapshots.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Rendered DOM state captured from a page
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    /// URL the page reported when the snapshot was taken
    pub url: String,

    /// Serialized DOM (`document.documentElement.outerHTML`)
    pub html: String,

    /// Framework globals read from `window` (e.g. `__NEXT_DATA__`), keyed by name
    pub globals: BTreeMap<String, Value>,
}

impl PageSnapshot {
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            globals: BTreeMap::new(),
        }
    }

    pub fn with_global(mut self, name: impl Into<String>, value: Value) -> Self {
        self.globals.insert(name.into(), value);
        self
    }
}

/// Errors a renderer session can report
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Page script failed: {0}")]
    Script(String),

    #[error("Renderer session is closed")]
    Closed,
}

/// One browser session bound to a single page.
#[async_trait]
pub trait Renderer: Send {
    /// Load `url` and wait for the page to settle.
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError>;

    /// Scroll to the bottom of the document so lazy lists load more items.
    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError>;

    /// Capture the current DOM and framework data blobs.
    async fn snapshot(&mut self) -> Result<PageSnapshot, RenderError>;

    /// Release the session. Must be safe to call more than once.
    async fn close(&mut self) -> Result<(), RenderError>;
}

/// Acquires a fresh renderer session for each catalog scrape.
#[async_trait]
pub trait RendererLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn Renderer>, RenderError>;

    /// Human-readable name so logs identify the backend.
    fn name(&self) -> &'static str;
}

/// Renderer that replays prerecorded snapshots: the first snapshot after
/// navigation, then one more per scroll (the last one repeats).
#[derive(Debug, Clone, Default)]
pub struct ScriptedRenderer {
    stages: Vec<PageSnapshot>,
    position: usize,
    navigation_error: Option<String>,
    /// Zero-based snapshot call that fails
    snapshot_failure: Option<usize>,
    /// One-based scroll that fails
    scroll_failure: Option<usize>,
    snapshots_taken: usize,
    scrolls_done: usize,
    navigated: bool,
    closed: bool,
    close_counter: Arc<AtomicUsize>,
    scroll_counter: Arc<AtomicUsize>,
}

impl ScriptedRenderer {
    pub fn new(stages: Vec<PageSnapshot>) -> Self {
        Self {
            stages,
            ..Self::default()
        }
    }

    /// A session whose navigation always fails with `reason`.
    pub fn failing_navigation(reason: impl Into<String>) -> Self {
        Self {
            navigation_error: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Fail the `nth` snapshot (0 is the one taken right after navigation).
    pub fn fail_snapshot_at(mut self, nth: usize) -> Self {
        self.snapshot_failure = Some(nth);
        self
    }

    /// Fail the `nth` scroll, counting from 1.
    pub fn fail_scroll_at(mut self, nth: usize) -> Self {
        self.scroll_failure = Some(nth);
        self
    }

    fn ensure_open(&self) -> Result<(), RenderError> {
        if self.closed {
            Err(RenderError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.ensure_open()?;
        if let Some(reason) = &self.navigation_error {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                reason: reason.clone(),
            });
        }
        self.navigated = true;
        self.position = 0;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        self.ensure_open()?;
        self.scroll_counter.fetch_add(1, Ordering::SeqCst);
        self.scrolls_done += 1;
        if self.scroll_failure == Some(self.scrolls_done) {
            return Err(RenderError::Script(format!("scroll {} failed", self.scrolls_done)));
        }
        if self.position + 1 < self.stages.len() {
            self.position += 1;
        }
        Ok(())
    }

    async fn snapshot(&mut self) -> Result<PageSnapshot, RenderError> {
        self.ensure_open()?;
        if !self.navigated {
            return Err(RenderError::Script("snapshot before navigation".to_string()));
        }
        let nth = self.snapshots_taken;
        self.snapshots_taken += 1;
        if self.snapshot_failure == Some(nth) {
            return Err(RenderError::Script(format!("snapshot {} failed", nth)));
        }
        Ok(self.stages.get(self.position).cloned().unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        if !self.closed {
            self.closed = true;
            self.close_counter.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Hands out queued [`ScriptedRenderer`] sessions in order and counts how many
/// were launched, scrolled and closed.
#[derive(Debug, Default)]
pub struct ScriptedLauncher {
    sessions: Mutex<VecDeque<ScriptedRenderer>>,
    launched: AtomicUsize,
    closed: Arc<AtomicUsize>,
    scrolls: Arc<AtomicUsize>,
}

impl ScriptedLauncher {
    pub fn new(sessions: Vec<ScriptedRenderer>) -> Self {
        Self {
            sessions: Mutex::new(sessions.into()),
            ..Self::default()
        }
    }

    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RendererLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn Renderer>, RenderError> {
        let mut session = self
            .sessions
            .lock()
            .pop_front()
            .ok_or_else(|| RenderError::Launch("no scripted session left".to_string()))?;
        session.close_counter = Arc::clone(&self.closed);
        session.scroll_counter = Arc::clone(&self.scrolls);
        self.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(session))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_renderer_advances_per_scroll() {
        let mut renderer = ScriptedRenderer::new(vec![
            PageSnapshot::from_html("https://example.com", "<p>one</p>"),
            PageSnapshot::from_html("https://example.com", "<p>two</p>"),
        ]);
        renderer.navigate("https://example.com").await.unwrap();
        assert!(renderer.snapshot().await.unwrap().html.contains("one"));

        renderer.scroll_to_bottom().await.unwrap();
        assert!(renderer.snapshot().await.unwrap().html.contains("two"));

        // Last stage repeats once the script runs out.
        renderer.scroll_to_bottom().await.unwrap();
        assert!(renderer.snapshot().await.unwrap().html.contains("two"));
    }

    #[tokio::test]
    async fn test_scripted_renderer_navigation_failure() {
        let mut renderer = ScriptedRenderer::failing_navigation("net::ERR_NAME_NOT_RESOLVED");
        let err = renderer.navigate("https://nowhere.invalid").await.unwrap_err();
        assert!(matches!(err, RenderError::Navigation { .. }));
    }

    #[tokio::test]
    async fn test_scripted_failures_hit_the_requested_call() {
        let mut renderer = ScriptedRenderer::new(vec![PageSnapshot::default()])
            .fail_snapshot_at(1)
            .fail_scroll_at(2);
        renderer.navigate("https://example.com").await.unwrap();
        assert!(renderer.snapshot().await.is_ok());
        assert!(matches!(renderer.snapshot().await, Err(RenderError::Script(_))));
        assert!(renderer.snapshot().await.is_ok());

        assert!(renderer.scroll_to_bottom().await.is_ok());
        assert!(matches!(renderer.scroll_to_bottom().await, Err(RenderError::Script(_))));
    }

    #[tokio::test]
    async fn test_closed_renderer_rejects_calls() {
        let mut renderer = ScriptedRenderer::new(vec![PageSnapshot::default()]);
        renderer.close().await.unwrap();
        renderer.close().await.unwrap();
        assert!(matches!(renderer.navigate("https://example.com").await, Err(RenderError::Closed)));
    }

    #[tokio::test]
    async fn test_launcher_counts_sessions() {
        let launcher = ScriptedLauncher::new(vec![ScriptedRenderer::new(vec![PageSnapshot::default()])]);
        let mut session = launcher.launch().await.unwrap();
        session.close().await.unwrap();
        assert_eq!(launcher.launched(), 1);
        assert_eq!(launcher.closed(), 1);
        assert!(launcher.launch().await.is_err());
    }
}
