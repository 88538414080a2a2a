//! Replay renderer serving previously captured HTML.
//!
//! Used for offline re-extraction (`--replay DIR`) and as the test double for
//! the whole pipeline. Pages are static, so waits resolve immediately.

use crate::error::RenderError;
use crate::renderer::{Locator, NavigationResult, RenderContext, Renderer};
use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Name of the manifest mapping URLs to HTML files inside a replay directory.
pub const MANIFEST: &str = "pages.json";

/// Serves a fixed URL → HTML map.
#[derive(Default)]
pub struct SnapshotRenderer {
    pages: Arc<HashMap<String, String>>,
    open: Arc<AtomicUsize>,
    opened_total: Arc<AtomicUsize>,
}

impl SnapshotRenderer {
    pub fn new(pages: HashMap<String, String>) -> Self {
        Self {
            pages: Arc::new(pages),
            ..Self::default()
        }
    }

    /// Load `dir/pages.json` (`{"<url>": "<file>.html", ...}`) and every file it names.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let manifest_path = dir.join(MANIFEST);
        let manifest = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("reading {}", manifest_path.display()))?;
        let entries: HashMap<String, String> = serde_json::from_str(&manifest)
            .with_context(|| format!("parsing {}", manifest_path.display()))?;

        let mut pages = HashMap::with_capacity(entries.len());
        for (url, file) in entries {
            let path = dir.join(&file);
            let html = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            pages.insert(url, html);
        }
        Ok(Self::new(pages))
    }

    /// Contexts created and not yet closed.
    pub fn open_contexts(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Contexts created over the renderer's lifetime.
    pub fn contexts_created(&self) -> usize {
        self.opened_total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for SnapshotRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>, RenderError> {
        self.open.fetch_add(1, Ordering::SeqCst);
        self.opened_total.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SnapshotContext {
            pages: Arc::clone(&self.pages),
            open: Arc::clone(&self.open),
            current: None,
        }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        Ok(())
    }
}

struct SnapshotContext {
    pages: Arc<HashMap<String, String>>,
    open: Arc<AtomicUsize>,
    current: Option<(String, String)>,
}

impl SnapshotContext {
    fn loaded(&self) -> Result<&(String, String), RenderError> {
        self.current
            .as_ref()
            .ok_or_else(|| RenderError::Browser("no page loaded".to_string()))
    }
}

fn has_match(html: &str, locator: Locator) -> bool {
    let Ok(selector) = Selector::parse(locator.as_str()) else {
        return false;
    };
    Html::parse_document(html).select(&selector).next().is_some()
}

#[async_trait]
impl RenderContext for SnapshotContext {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult, RenderError> {
        let html = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| RenderError::Navigation {
                url: url.to_string(),
                reason: "no snapshot for url".to_string(),
            })?;
        self.current = Some((url.to_string(), html));
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 0,
        })
    }

    async fn wait_for(&self, locator: Locator, timeout: Duration) -> Result<(), RenderError> {
        let (_, html) = self.loaded()?;
        if has_match(html, locator) {
            Ok(())
        } else {
            Err(RenderError::NotFound {
                locator: locator.to_string(),
                timeout_secs: timeout.as_secs(),
            })
        }
    }

    async fn content(&self) -> Result<String, RenderError> {
        Ok(self.loaded()?.1.clone())
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        Ok(())
    }
}

impl Drop for SnapshotContext {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}
