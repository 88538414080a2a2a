//! Parsed DOM snapshot of a rendered page.

use crate::renderer::Locator;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

/// A value pulled off a page, or a stand-in used because it was absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<T> {
    Found(T),
    Defaulted(T),
}

impl<T> Extracted<T> {
    pub fn is_defaulted(&self) -> bool {
        matches!(self, Extracted::Defaulted(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Extracted::Found(v) | Extracted::Defaulted(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Extracted::Found(v) | Extracted::Defaulted(v) => v,
        }
    }
}

/// Use `value` when present, otherwise fall back to `default()`.
pub fn extract_or_default<T>(value: Option<T>, default: impl FnOnce() -> T) -> Extracted<T> {
    match value {
        Some(v) => Extracted::Found(v),
        None => Extracted::Defaulted(default()),
    }
}

/// A rendered document. Not `Send`: build, read and drop it between awaits.
pub struct RenderedPage {
    url: Option<Url>,
    html: Html,
}

fn selector(locator: Locator) -> Option<Selector> {
    match Selector::parse(locator.as_str()) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("invalid locator {locator}: {e}");
            None
        }
    }
}

impl RenderedPage {
    /// Parse serialized DOM captured at `url`.
    pub fn parse(url: &str, html: &str) -> Self {
        Self {
            url: Url::parse(url).ok(),
            html: Html::parse_document(html),
        }
    }

    /// Every element matching `locator`, in document order.
    pub fn find_all(&self, locator: Locator) -> Vec<ElementRef<'_>> {
        match selector(locator) {
            Some(sel) => self.html.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    /// First element matching `locator`.
    pub fn find_first(&self, locator: Locator) -> Option<ElementRef<'_>> {
        let sel = selector(locator)?;
        self.html.select(&sel).next()
    }

    /// Text of the first element matching `locator`.
    pub fn text_of(&self, locator: Locator) -> Option<String> {
        text(self.find_first(locator))
    }

    /// Resolve an element's `href` to an absolute URL.
    pub fn absolute_href(&self, element: ElementRef<'_>) -> Option<String> {
        let href = element.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }
        match &self.url {
            Some(base) => base.join(href).ok().map(|u| u.to_string()),
            None => Url::parse(href).ok().map(|u| u.to_string()),
        }
    }
}

/// First descendant of `element` matching `locator`.
pub fn find_within<'a>(element: ElementRef<'a>, locator: Locator) -> Option<ElementRef<'a>> {
    let sel = selector(locator)?;
    element.select(&sel).next()
}

/// Visible text of an element with whitespace collapsed. `None` for a
/// missing element; never fails.
///
/// Text nodes are concatenated as rendered: a comment between two nodes
/// (`4<!-- -->.<!-- -->2`) does not introduce a space.
pub fn text(element: Option<ElementRef<'_>>) -> Option<String> {
    let element = element?;
    let joined: String = element.text().collect();
    Some(joined.split_whitespace().collect::<Vec<_>>().join(" "))
}
