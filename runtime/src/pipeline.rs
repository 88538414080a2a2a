//! Run coordinator: leagues, then teams, then players.
//!
//! Stages run strictly in sequence and share one context pool. A stage that
//! produces nothing halts the run before the next one starts.

use crate::config::ScrapeConfig;
use crate::pool::PoolManager;
use crate::renderer::Renderer;
use crate::scrape::{BatchSummary, LeagueCollector, PlayerExtractor, TeamCollector};
use crate::store::{Store, StoreCounts};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Why a run stopped before extracting players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    NoTeams,
    NoPlayers,
}

impl std::fmt::Display for HaltReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HaltReason::NoTeams => f.write_str("no teams found"),
            HaltReason::NoPlayers => f.write_str("no players found"),
        }
    }
}

/// What one run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub leagues: usize,
    pub team_links: usize,
    pub player_links: usize,
    pub players: BatchSummary,
    pub halted: Option<HaltReason>,
    /// Row totals after the run; absent when the store could not be read.
    pub counts: Option<StoreCounts>,
    #[serde(skip)]
    pub elapsed: Duration,
}

pub struct Pipeline {
    pool: Arc<PoolManager>,
    store: Arc<Store>,
    config: ScrapeConfig,
}

impl Pipeline {
    pub fn new(renderer: Arc<dyn Renderer>, store: Arc<Store>, config: ScrapeConfig) -> Self {
        let pool = Arc::new(PoolManager::new(renderer, config.max_workers));
        Self {
            pool,
            store,
            config,
        }
    }

    pub async fn run(&self) -> RunSummary {
        let start = Instant::now();
        let timeouts = self.config.timeouts;
        let mut summary = RunSummary {
            leagues: self.config.league_urls.len(),
            team_links: 0,
            player_links: 0,
            players: BatchSummary::default(),
            halted: None,
            counts: None,
            elapsed: Duration::ZERO,
        };

        let leagues = LeagueCollector::new(Arc::clone(&self.pool), Arc::clone(&self.store), timeouts);
        let team_links = leagues.collect(&self.config.league_urls).await;
        summary.team_links = team_links.len();

        if team_links.is_empty() {
            error!("no teams found, stopping");
            summary.halted = Some(HaltReason::NoTeams);
        } else {
            let teams = TeamCollector::new(Arc::clone(&self.pool), timeouts);
            let player_links = teams.collect(team_links).await;
            summary.player_links = player_links.len();

            if player_links.is_empty() {
                error!("no players found, stopping");
                summary.halted = Some(HaltReason::NoPlayers);
            } else {
                let players =
                    PlayerExtractor::new(Arc::clone(&self.pool), Arc::clone(&self.store), timeouts);
                summary.players = players.extract_all(player_links).await;
            }
        }

        summary.counts = match self.store.counts() {
            Ok(counts) => Some(counts),
            Err(e) => {
                warn!("reading row counts: {e}");
                None
            }
        };
        summary.elapsed = start.elapsed();
        info!(
            "run finished in {:.1}s: {} succeeded, {} failed",
            summary.elapsed.as_secs_f64(),
            summary.players.succeeded,
            summary.players.failed
        );
        summary
    }
}
