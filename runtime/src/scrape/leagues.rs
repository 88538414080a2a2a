//! League stage: overview pages → League and Club rows plus squad links.

use crate::config::Timeouts;
use crate::error::ScrapeError;
use crate::extraction::page::{find_within, text};
use crate::extraction::selectors::{LEAGUE_TABLE, LEAGUE_TABLE_LINKS, LEAGUE_TITLE, TEAM_NAME, TEAM_URL_PREFIX};
use crate::extraction::{extract_or_default, Extracted, RenderedPage};
use crate::pool::{ContextHandle, PoolManager};
use crate::store::Store;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Club name recorded when a team link carries no readable name.
pub const UNKNOWN_TEAM: &str = "Unknown Team";

/// A team entry found in a league table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamLink {
    pub name: Extracted<String>,
    pub squad_url: String,
}

/// What a league overview page yields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeagueListing {
    pub name: Option<String>,
    pub teams: Vec<TeamLink>,
}

/// Squad page of a team: the `overview` path segment becomes `squad`.
pub fn squad_url(team_url: &str) -> String {
    team_url.replace("overview", "squad")
}

/// Extract the league title and team links from a rendered overview page.
pub fn parse_league_page(page_url: &str, html: &str) -> LeagueListing {
    let page = RenderedPage::parse(page_url, html);
    let name = page.text_of(LEAGUE_TITLE).filter(|n| !n.is_empty());

    let teams = page
        .find_all(LEAGUE_TABLE_LINKS)
        .into_iter()
        .filter_map(|anchor| {
            let href = page.absolute_href(anchor)?;
            if !href.starts_with(TEAM_URL_PREFIX) {
                return None;
            }
            let team_name = text(find_within(anchor, TEAM_NAME)).filter(|n| !n.is_empty());
            Some(TeamLink {
                name: extract_or_default(team_name, || UNKNOWN_TEAM.to_string()),
                squad_url: squad_url(&href),
            })
        })
        .collect();

    LeagueListing { name, teams }
}

/// Walks the configured league pages one after another.
pub struct LeagueCollector {
    pool: Arc<PoolManager>,
    store: Arc<Store>,
    timeouts: Timeouts,
}

impl LeagueCollector {
    pub fn new(pool: Arc<PoolManager>, store: Arc<Store>, timeouts: Timeouts) -> Self {
        Self {
            pool,
            store,
            timeouts,
        }
    }

    /// Collect squad URLs across all leagues.
    ///
    /// A league that fails to load or has no team table is skipped. A store
    /// failure stops the stage and returns what was gathered so far.
    pub async fn collect(&self, league_urls: &[String]) -> Vec<String> {
        info!("collecting team links from {} leagues", league_urls.len());
        let mut squad_urls = Vec::new();

        for url in league_urls {
            match self.collect_league(url).await {
                Ok(links) => squad_urls.extend(links),
                Err(ScrapeError::Store(e)) => {
                    error!("store failure while collecting {url}: {e}");
                    break;
                }
                Err(e) => warn!("skipping league {url}: {e}"),
            }
        }

        info!("found {} team links", squad_urls.len());
        squad_urls
    }

    async fn collect_league(&self, url: &str) -> Result<Vec<String>, ScrapeError> {
        let mut handle = self.pool.acquire(url).await?;
        let result = self.scrape(&mut handle, url).await;
        handle.release().await;
        result
    }

    async fn scrape(&self, handle: &mut ContextHandle, url: &str) -> Result<Vec<String>, ScrapeError> {
        let context = handle.context_mut();
        let nav = context.navigate(url, self.timeouts.navigation_ms()).await?;
        debug!("loaded {} in {}ms", nav.final_url, nav.load_time_ms);
        context.wait_for(LEAGUE_TABLE, self.timeouts.league_table).await?;
        let html = context.content().await?;

        let listing = parse_league_page(url, &html);
        let name = listing
            .name
            .ok_or_else(|| ScrapeError::MissingLeagueName(url.to_string()))?;

        let (league, created) = self.store.get_or_create_league(&name)?;
        if created {
            info!("new league: {name}");
        }

        let mut links = Vec::with_capacity(listing.teams.len());
        for team in listing.teams {
            if team.name.is_defaulted() {
                debug!("no team name for {}, using {UNKNOWN_TEAM}", team.squad_url);
            }
            self.store.get_or_create_club(team.name.value(), &league)?;
            links.push(team.squad_url);
        }

        info!("{name}: {} teams", links.len());
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::snapshot::SnapshotRenderer;
    use std::collections::HashMap;

    const LIGUE_1: &str = "https://www.fotmob.com/leagues/53/overview/ligue-1";
    const LIGUE_2: &str = "https://www.fotmob.com/leagues/110/overview/ligue-2";

    fn league_html(title: &str, teams: &[(&str, Option<&str>)]) -> String {
        let rows: String = teams
            .iter()
            .map(|(href, name)| match name {
                Some(n) => format!(r#"<a href="{href}"><span class="TeamName">{n}</span></a>"#),
                None => format!(r#"<a href="{href}"><img/></a>"#),
            })
            .collect();
        format!(
            r#"<html><body>
                <h1 class="css-4ow769-TeamOrLeagueName">{title}</h1>
                <div class="TableContainer">{rows}<a href="/news/123">news</a></div>
            </body></html>"#
        )
    }

    #[test]
    fn test_parse_league_page() {
        let html = league_html(
            "Ligue 1",
            &[
                ("/teams/9830/overview/nantes", Some("Nantes")),
                ("https://www.fotmob.com/teams/8592/overview/marseille", None),
            ],
        );
        let listing = parse_league_page(LIGUE_1, &html);
        assert_eq!(listing.name.as_deref(), Some("Ligue 1"));
        assert_eq!(listing.teams.len(), 2);
        assert_eq!(
            listing.teams[0],
            TeamLink {
                name: Extracted::Found("Nantes".to_string()),
                squad_url: "https://www.fotmob.com/teams/9830/squad/nantes".to_string(),
            }
        );
        assert_eq!(listing.teams[1].name, Extracted::Defaulted(UNKNOWN_TEAM.to_string()));
    }

    #[tokio::test]
    async fn test_collect_skips_bad_league() {
        let mut pages = HashMap::new();
        pages.insert(
            LIGUE_1.to_string(),
            league_html("Ligue 1", &[("/teams/9830/overview/nantes", Some("Nantes"))]),
        );
        pages.insert(
            LIGUE_2.to_string(),
            league_html("Ligue 2", &[("/teams/9831/overview/nantes", Some("Nantes"))]),
        );
        pages.insert(
            "https://www.fotmob.com/leagues/1/overview/empty".to_string(),
            "<html><body>maintenance</body></html>".to_string(),
        );
        let renderer = Arc::new(SnapshotRenderer::new(pages));
        let pool = Arc::new(PoolManager::new(renderer.clone(), 1));
        let store = Arc::new(Store::open_in_memory().unwrap());
        let collector = LeagueCollector::new(pool, store.clone(), Timeouts::default());

        let urls = vec![
            LIGUE_1.to_string(),
            "https://www.fotmob.com/leagues/1/overview/empty".to_string(),
            "https://www.fotmob.com/leagues/404/overview/missing".to_string(),
            LIGUE_2.to_string(),
        ];
        let links = collector.collect(&urls).await;

        assert_eq!(
            links,
            vec![
                "https://www.fotmob.com/teams/9830/squad/nantes".to_string(),
                "https://www.fotmob.com/teams/9831/squad/nantes".to_string(),
            ]
        );
        let counts = store.counts().unwrap();
        assert_eq!((counts.leagues, counts.clubs), (2, 2));
        assert_eq!(renderer.open_contexts(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_links_collected_so_far() {
        const LIGUE_3: &str = "https://www.fotmob.com/leagues/8970/overview/national";
        let mut pages = HashMap::new();
        pages.insert(
            LIGUE_1.to_string(),
            league_html("Ligue 1", &[("/teams/9830/overview/nantes", Some("Nantes"))]),
        );
        pages.insert(
            LIGUE_2.to_string(),
            league_html("Ligue 2", &[("/teams/9831/overview/nantes", Some("Nantes"))]),
        );
        pages.insert(
            LIGUE_3.to_string(),
            league_html("National", &[("/teams/4242/overview/sedan", Some("Sedan"))]),
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("footgraph.db");
        let store = Arc::new(Store::open(&path).unwrap());
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_ligue_2 BEFORE INSERT ON leagues
                 WHEN NEW.name = 'Ligue 2'
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();

        let renderer = Arc::new(SnapshotRenderer::new(pages));
        let pool = Arc::new(PoolManager::new(renderer.clone(), 1));
        let collector = LeagueCollector::new(pool.clone(), store.clone(), Timeouts::default());

        let urls = vec![LIGUE_1.to_string(), LIGUE_2.to_string(), LIGUE_3.to_string()];
        let links = collector.collect(&urls).await;

        assert_eq!(links, vec!["https://www.fotmob.com/teams/9830/squad/nantes".to_string()]);
        assert_eq!(renderer.contexts_created(), 2);
        assert_eq!(renderer.open_contexts(), 0);
        assert_eq!(pool.active(), 0);
        let counts = store.counts().unwrap();
        assert_eq!((counts.leagues, counts.clubs), (1, 1));
    }
}
