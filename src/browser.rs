//! Headless Chromium renderer driven over the DevTools protocol.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::config::Config;
use crate::renderer::{PageSnapshot, RenderError, Renderer, RendererLauncher};

/// How to start Chromium
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub nav_timeout: Duration,
    pub settle: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            nav_timeout: Duration::from_secs(Config::NAV_TIMEOUT_SECS),
            settle: Duration::from_millis(Config::SETTLE_MS),
        }
    }
}

/// Launches one Chromium process per catalog scrape
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
    options: BrowserOptions,
}

impl ChromiumLauncher {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }

    fn browser_config(&self, profile_dir: &TempDir) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .window_size(Config::WINDOW_WIDTH, Config::WINDOW_HEIGHT)
            .user_data_dir(profile_dir.path())
            .request_timeout(self.options.nav_timeout)
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={}", Config::USER_AGENT));

        if !self.options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.options.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(RenderError::Launch)
    }
}

#[async_trait]
impl RendererLauncher for ChromiumLauncher {
    #[tracing::instrument(skip(self), fields(headless = self.options.headless))]
    async fn launch(&self) -> Result<Box<dyn Renderer>, RenderError> {
        let profile_dir = tempfile::Builder::new()
            .prefix("catalog-diff-profile-")
            .tempdir()
            .map_err(|e| RenderError::Launch(format!("cannot create profile dir: {}", e)))?;
        let config = self.browser_config(&profile_dir)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // The handler must be polled for any CDP command to complete.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(RenderError::Launch(format!("cannot open page: {}", e)));
            }
        };

        tracing::info!("Chromium launched");
        Ok(Box::new(ChromiumRenderer {
            browser: Some(browser),
            page: Some(page),
            handler_task: Some(handler_task),
            profile_dir: Some(profile_dir),
            nav_timeout: self.options.nav_timeout,
            settle: self.options.settle,
        }))
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// A live Chromium session bound to a single tab
pub struct ChromiumRenderer {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    // Deleted on close or drop
    profile_dir: Option<TempDir>,
    nav_timeout: Duration,
    settle: Duration,
}

impl ChromiumRenderer {
    fn page(&self) -> Result<&Page, RenderError> {
        self.page.as_ref().ok_or(RenderError::Closed)
    }

    async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T, RenderError> {
        let page = self.page()?;
        let result = timeout(self.nav_timeout, page.evaluate(script))
            .await
            .map_err(|_| RenderError::Timeout(self.nav_timeout.as_secs()))?
            .map_err(|e| RenderError::Script(e.to_string()))?;
        result
            .into_value::<T>()
            .map_err(|e| RenderError::Script(e.to_string()))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    #[tracing::instrument(skip(self))]
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        let page = self.page()?;
        timeout(self.nav_timeout, page.goto(url))
            .await
            .map_err(|_| RenderError::Timeout(self.nav_timeout.as_secs()))?
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        tokio::time::sleep(self.settle).await;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        let page = self.page()?;
        timeout(self.nav_timeout, page.evaluate(Config::SCROLL_SCRIPT))
            .await
            .map_err(|_| RenderError::Timeout(self.nav_timeout.as_secs()))?
            .map_err(|e| RenderError::Script(e.to_string()))?;
        Ok(())
    }

    async fn snapshot(&mut self) -> Result<PageSnapshot, RenderError> {
        let html: String = self.evaluate(Config::HTML_SCRIPT).await?;
        // Globals are best effort: a page without them still has HTML to parse.
        let globals = match self.evaluate::<BTreeMap<String, Value>>(Config::GLOBALS_SCRIPT).await {
            Ok(globals) => globals,
            Err(e) => {
                tracing::debug!("Could not read framework globals: {}", e);
                BTreeMap::new()
            }
        };
        let url = self.page()?.url().await.ok().flatten().unwrap_or_default();

        Ok(PageSnapshot { url, html, globals })
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.page = None;
        let result = match self.browser.take() {
            Some(mut browser) => {
                let closed = browser.close().await.map(|_| ());
                let _ = browser.wait().await;
                closed.map_err(|e| RenderError::Script(format!("close failed: {}", e)))
            }
            None => Ok(()),
        };
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
        drop(self.profile_dir.take());
        tracing::debug!("Chromium session closed");
        result
    }
}

impl Drop for ChromiumRenderer {
    fn drop(&mut self) {
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}
