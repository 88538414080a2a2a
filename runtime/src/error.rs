//! Error taxonomy for rendering, parsing, storage and per-record scraping.

use thiserror::Error;

/// Failures raised by a browser rendering context.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The page failed to load (network error, bad URL, navigation timeout).
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// An expected element never appeared within the wait budget.
    #[error("element `{locator}` not found after {timeout_secs}s")]
    NotFound { locator: String, timeout_secs: u64 },

    /// The browser itself misbehaved (launch failure, dead CDP connection).
    #[error("browser error: {0}")]
    Browser(String),
}

impl RenderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RenderError::NotFound { .. })
    }
}

/// A value was present on the page but not in the expected shape.
///
/// Never propagated past a single field: callers turn it into `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty value")]
    Empty,
    #[error("malformed value: {0:?}")]
    Malformed(String),
}

/// Failures at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("creating database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned by a panicking writer")]
    LockPoisoned,
}

/// A per-record scrape failure. Caught at the task boundary and counted.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no numeric player id in {0}")]
    MissingPlayerId(String),

    #[error("no league title on {0}")]
    MissingLeagueName(String),

    #[error("no player name on {0}")]
    MissingPlayerName(String),
}
