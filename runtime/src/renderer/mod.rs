//! Browser rendering abstraction.
//!
//! A [`Renderer`] owns the browser; each [`RenderContext`] is a single-use tab
//! handed to exactly one task. Contexts are never shared across tasks.

pub mod chromium;
pub mod snapshot;

use crate::error::RenderError;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Structural element locator (a CSS selector).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator(&'static str);

impl Locator {
    pub const fn css(selector: &'static str) -> Self {
        Self(selector)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Outcome of a successful navigation.
#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub final_url: String,
    pub load_time_ms: u64,
}

/// Produces fresh, isolated rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a new context (one browser tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>, RenderError>;

    /// Tear down the browser. Contexts still open are abandoned.
    async fn shutdown(&self) -> Result<(), RenderError>;
}

/// A single-use page context.
#[async_trait]
pub trait RenderContext: Send {
    /// Load `url` and wait for the document to settle.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult, RenderError>;

    /// Block until `locator` matches at least one element, or fail with
    /// [`RenderError::NotFound`] once `timeout` elapses.
    async fn wait_for(&self, locator: Locator, timeout: Duration) -> Result<(), RenderError>;

    /// Serialized DOM of the current page, as rendered.
    async fn content(&self) -> Result<String, RenderError>;

    /// Close the context and release its browser resources.
    async fn close(self: Box<Self>) -> Result<(), RenderError>;
}
