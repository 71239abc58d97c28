//! Chromium-backed browsing surface
//!
//! Each [`ChromeSurface`] owns one launched Chromium process, its CDP event
//! handler loop, and a single page. The engine runs two of these at most: the
//! main search surface and the enrichment worker's surface.

use crate::browser::{BrowseError, BrowseResult, Surface};
use crate::session::Cookie;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, TimeSinceEpoch};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

/// How often element waits re-check the document
const WAIT_POLL: Duration = Duration::from_millis(250);

/// Settle delay after a history navigation
const HISTORY_SETTLE: Duration = Duration::from_millis(300);

/// Browser launch options, derived from the `[browser]` config section
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Launch without a visible window
    pub headless: bool,

    /// Explicit Chromium/Chrome binary path
    pub chrome_binary: Option<String>,
}

pub struct ChromeSurface {
    browser: tokio::sync::Mutex<Browser>,
    handler_task: Mutex<Option<JoinHandle<()>>>,
    page: Page,
    user_data_dir: PathBuf,
}

impl ChromeSurface {
    /// Launches a Chromium process and opens a blank page.
    ///
    /// Runs sandboxless with an isolated temporary user-data directory, which
    /// is removed again on [`Surface::close`].
    pub async fn launch(options: &LaunchOptions) -> BrowseResult<Self> {
        let mut config_builder = BrowserConfig::builder();
        config_builder = config_builder.no_sandbox();

        let user_data_dir = unique_user_data_dir()?;
        config_builder = config_builder.user_data_dir(&user_data_dir);

        if !options.headless {
            tracing::info!("Launching browser in visible mode");
            config_builder = config_builder.with_head();
        } else {
            tracing::info!("Launching browser in headless mode");
        }

        if let Some(binary) = &options.chrome_binary {
            tracing::info!("Using configured Chrome binary: {}", binary);
            config_builder = config_builder.chrome_executable(binary);
        }

        let (browser, mut handler) = Browser::launch(
            config_builder
                .build()
                .map_err(|e| BrowseError::Launch(format!("Failed to build browser config: {}", e)))?,
        )
        .await
        .map_err(|e| BrowseError::Launch(e.to_string()))?;

        // Drive the CDP event stream until the browser goes away
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error (ignoring): {}", e);
                }
            }
            tracing::debug!("Browser handler task ended");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowseError::Launch(format!("Failed to create page: {}", e)))?;

        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
            handler_task: Mutex::new(Some(handler_task)),
            page,
            user_data_dir,
        })
    }
}

#[async_trait]
impl Surface for ChromeSurface {
    async fn goto(&self, url: &str) -> BrowseResult<()> {
        tracing::debug!("Navigating to: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowseError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn current_url(&self) -> BrowseResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| BrowseError::Protocol(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn content(&self) -> BrowseResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| BrowseError::Protocol(e.to_string()))
    }

    async fn click(&self, selector: &str) -> BrowseResult<bool> {
        match self.page.find_element(selector).await {
            Ok(element) => {
                element
                    .click()
                    .await
                    .map_err(|e| BrowseError::Protocol(format!("click failed: {}", e)))?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn click_nth(&self, selector: &str, index: usize) -> BrowseResult<bool> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .unwrap_or_default();

        match elements.into_iter().nth(index) {
            Some(element) => {
                element
                    .click()
                    .await
                    .map_err(|e| BrowseError::Protocol(format!("click failed: {}", e)))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn type_text(&self, selector: &str, text: &str) -> BrowseResult<bool> {
        match self.page.find_element(selector).await {
            Ok(element) => {
                element
                    .click()
                    .await
                    .map_err(|e| BrowseError::Protocol(format!("focus failed: {}", e)))?
                    .type_str(text)
                    .await
                    .map_err(|e| BrowseError::Protocol(format!("typing failed: {}", e)))?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> BrowseResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(WAIT_POLL).await;
        }
    }

    async fn cookies(&self) -> BrowseResult<Vec<Cookie>> {
        let cookies = self
            .page
            .get_cookies()
            .await
            .map_err(|e| BrowseError::Protocol(format!("get cookies failed: {}", e)))?;

        Ok(cookies
            .into_iter()
            .map(|c| Cookie {
                name: c.name,
                value: c.value,
                domain: Some(c.domain),
                path: Some(c.path),
                expires: Some(c.expires),
                http_only: Some(c.http_only),
                secure: Some(c.secure),
            })
            .collect())
    }

    async fn set_cookies(&self, cookies: Vec<Cookie>) -> BrowseResult<()> {
        let mut params = Vec::with_capacity(cookies.len());
        for cookie in cookies {
            let mut builder = CookieParam::builder()
                .name(cookie.name)
                .value(cookie.value);
            if let Some(domain) = cookie.domain {
                builder = builder.domain(domain);
            }
            if let Some(path) = cookie.path {
                builder = builder.path(path);
            }
            if let Some(expires) = cookie.expires {
                builder = builder.expires(TimeSinceEpoch::new(expires));
            }
            if let Some(http_only) = cookie.http_only {
                builder = builder.http_only(http_only);
            }
            if let Some(secure) = cookie.secure {
                builder = builder.secure(secure);
            }
            params.push(
                builder
                    .build()
                    .map_err(|e| BrowseError::Protocol(format!("bad cookie: {}", e)))?,
            );
        }

        self.page
            .set_cookies(params)
            .await
            .map_err(|e| BrowseError::Protocol(format!("set cookies failed: {}", e)))?;
        Ok(())
    }

    async fn popup_url(&self) -> BrowseResult<Option<String>> {
        let pages = {
            let browser = self.browser.lock().await;
            browser
                .pages()
                .await
                .map_err(|e| BrowseError::Protocol(format!("list pages failed: {}", e)))?
        };

        for page in pages {
            if page.target_id() == self.page.target_id() {
                continue;
            }
            let url = page.url().await.unwrap_or_default().unwrap_or_default();
            if let Err(e) = page.close().await {
                tracing::debug!("Failed to close popup page: {}", e);
            }
            if !url.is_empty() && url != "about:blank" {
                return Ok(Some(url));
            }
        }

        Ok(None)
    }

    async fn back(&self) -> BrowseResult<()> {
        self.page
            .evaluate("history.back();")
            .await
            .map_err(|e| BrowseError::Navigation(format!("history back failed: {}", e)))?;
        tokio::time::sleep(HISTORY_SETTLE).await;
        Ok(())
    }

    async fn close(&self) -> BrowseResult<()> {
        {
            let mut browser = self.browser.lock().await;
            browser
                .close()
                .await
                .map_err(|e| BrowseError::Protocol(format!("close failed: {}", e)))?;
        }

        let handler = self.handler_task.lock().unwrap().take();
        if let Some(handler) = handler {
            if let Err(e) = handler.await {
                tracing::debug!("Browser handler task failed to join: {}", e);
            }
        }

        if let Err(e) = std::fs::remove_dir_all(&self.user_data_dir) {
            tracing::debug!(
                "Failed to clean up user-data dir {}: {}",
                self.user_data_dir.display(),
                e
            );
        }

        Ok(())
    }
}

/// Creates an isolated per-launch user-data directory under the system temp dir.
fn unique_user_data_dir() -> BrowseResult<PathBuf> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| BrowseError::Launch(format!("System clock error: {}", e)))?
        .as_nanos();
    let unique = format!("jobscout-chromium-profile-{}-{}", std::process::id(), nanos);
    let path = std::env::temp_dir().join(unique);
    std::fs::create_dir_all(&path).map_err(|e| BrowseError::Launch(e.to_string()))?;
    tracing::debug!("Using isolated user data dir: {}", path.display());
    Ok(path)
}
