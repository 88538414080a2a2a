//! Headless Chromium renderer over the DevTools protocol.

use crate::error::RenderError;
use crate::renderer::{Locator, NavigationResult, RenderContext, Renderer};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const VIEWPORT_WIDTH: u32 = 1920;
const VIEWPORT_HEIGHT: u32 = 1080;

/// Interval between DOM checks while waiting for an element.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser launch settings.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Show the browser window instead of running headless.
    pub headful: bool,
    /// Explicit Chrome/Chromium binary; auto-detected when `None`.
    pub chrome_path: Option<PathBuf>,
}

/// A launched Chromium process handing out one tab per context.
pub struct ChromiumRenderer {
    browser: Mutex<Browser>,
    handler: Mutex<Option<JoinHandle<()>>>,
}

impl ChromiumRenderer {
    /// Launch the browser and start driving its CDP event loop.
    pub async fn launch(options: &LaunchOptions) -> Result<Self, RenderError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
            .viewport(Viewport {
                width: VIEWPORT_WIDTH,
                height: VIEWPORT_HEIGHT,
                ..Viewport::default()
            })
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if options.headful {
            builder = builder.with_head();
        }
        if let Some(path) = &options.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(RenderError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Browser(format!("launch failed: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("cdp handler: {e}");
                }
            }
        });

        info!("chromium launched (headless: {})", !options.headful);

        Ok(Self {
            browser: Mutex::new(browser),
            handler: Mutex::new(Some(handler)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>, RenderError> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Browser(format!("opening tab: {e}")))?;
        Ok(Box::new(ChromiumContext { page }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            warn!("closing browser: {e}");
        }
        match browser.wait().await {
            Ok(status) => debug!("browser exited: {status:?}"),
            Err(e) => warn!("waiting for browser exit: {e}"),
        }
        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }
        Ok(())
    }
}

/// One browser tab.
struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult, RenderError> {
        let start = Instant::now();
        let nav_err = |reason: String| RenderError::Navigation {
            url: url.to_string(),
            reason,
        };

        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };
        match tokio::time::timeout(Duration::from_millis(timeout_ms), load).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(nav_err(e.to_string())),
            Err(_) => return Err(nav_err(format!("timed out after {timeout_ms}ms"))),
        }

        let final_url = self
            .page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        Ok(NavigationResult {
            final_url,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn wait_for(&self, locator: Locator, timeout: Duration) -> Result<(), RenderError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(locator.as_str()).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(RenderError::NotFound {
                    locator: locator.to_string(),
                    timeout_secs: timeout.as_secs(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn content(&self) -> Result<String, RenderError> {
        self.page
            .content()
            .await
            .map_err(|e| RenderError::Browser(format!("reading DOM: {e}")))
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        self.page
            .close()
            .await
            .map_err(|e| RenderError::Browser(format!("closing tab: {e}")))
    }
}
