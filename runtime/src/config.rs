//! Run configuration: source leagues, worker count and wait budgets.

use std::time::Duration;

/// League overview pages scraped when none are given.
pub const DEFAULT_LEAGUES: &[&str] = &[
    "https://www.fotmob.com/leagues/53/overview/ligue-1",
    "https://www.fotmob.com/leagues/47/overview/premier-league",
    "https://www.fotmob.com/leagues/87/overview/laliga",
    "https://www.fotmob.com/leagues/54/overview/bundesliga",
    "https://www.fotmob.com/leagues/55/overview/serie-a",
];

/// Concurrent browser contexts per worker stage.
pub const DEFAULT_WORKERS: usize = 3;

/// Upper bounds on every blocking browser operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub navigation: Duration,
    /// Team table on a league overview page.
    pub league_table: Duration,
    /// First player link on a squad page.
    pub squad_links: Duration,
    /// Name header on a player profile.
    pub player_name: Duration,
    /// Season statistics block; often legitimately absent.
    pub player_stats: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            league_table: Duration::from_secs(10),
            squad_links: Duration::from_secs(10),
            player_name: Duration::from_secs(10),
            player_stats: Duration::from_secs(5),
        }
    }
}

impl Timeouts {
    pub fn navigation_ms(&self) -> u64 {
        self.navigation.as_millis() as u64
    }
}

/// Everything a pipeline run needs besides its renderer and store.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub league_urls: Vec<String>,
    pub max_workers: usize,
    pub timeouts: Timeouts,
}

impl ScrapeConfig {
    /// Build a config, clamping the worker count to at least 1.
    pub fn new(league_urls: Vec<String>, max_workers: usize) -> Self {
        Self {
            league_urls,
            max_workers: max_workers.max(1),
            timeouts: Timeouts::default(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_LEAGUES.iter().map(|u| u.to_string()).collect(),
            DEFAULT_WORKERS,
        )
    }
}
