//! Team stage: squad pages → player profile links, on a bounded pool.

use super::fan_out;
use crate::config::Timeouts;
use crate::error::ScrapeError;
use crate::extraction::selectors::{PLAYER_URL_PREFIX, SQUAD_PLAYER_LINK};
use crate::extraction::RenderedPage;
use crate::pool::PoolManager;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Player profile links on a rendered squad page, in document order.
pub fn parse_squad_page(page_url: &str, html: &str) -> Vec<String> {
    let page = RenderedPage::parse(page_url, html);
    page.find_all(SQUAD_PLAYER_LINK)
        .into_iter()
        .filter_map(|anchor| page.absolute_href(anchor))
        .filter(|href| href.starts_with(PLAYER_URL_PREFIX))
        .collect()
}

pub struct TeamCollector {
    pool: Arc<PoolManager>,
    timeouts: Timeouts,
}

impl TeamCollector {
    pub fn new(pool: Arc<PoolManager>, timeouts: Timeouts) -> Self {
        Self { pool, timeouts }
    }

    /// Gather player links from every squad page.
    ///
    /// Returns once every team task has finished. A team that fails
    /// contributes nothing; its siblings are unaffected.
    pub async fn collect(&self, squad_urls: Vec<String>) -> Vec<String> {
        info!(
            "collecting player links from {} teams with {} workers",
            squad_urls.len(),
            self.pool.max_contexts()
        );
        let pool = Arc::clone(&self.pool);
        let timeouts = self.timeouts;

        let outcomes = fan_out(squad_urls, move |url, _| {
            let pool = Arc::clone(&pool);
            async move {
                match scrape_team(&pool, &url, &timeouts).await {
                    Ok(links) => {
                        info!("found {} players for {url}", links.len());
                        links
                    }
                    Err(e) => {
                        warn!("team {url} failed: {e}");
                        Vec::new()
                    }
                }
            }
        })
        .await;

        let player_links: Vec<String> = outcomes
            .into_iter()
            .flat_map(|(_, links)| links.unwrap_or_default())
            .collect();
        info!("found {} player links", player_links.len());
        player_links
    }
}

async fn scrape_team(pool: &PoolManager, url: &str, timeouts: &Timeouts) -> Result<Vec<String>, ScrapeError> {
    let mut handle = pool.acquire(url).await?;
    let result = async {
        let context = handle.context_mut();
        let nav = context.navigate(url, timeouts.navigation_ms()).await?;
        debug!("loaded {} in {}ms", nav.final_url, nav.load_time_ms);
        context.wait_for(SQUAD_PLAYER_LINK, timeouts.squad_links).await?;
        let html = context.content().await?;
        Ok::<_, ScrapeError>(parse_squad_page(url, &html))
    }
    .await;
    handle.release().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::snapshot::SnapshotRenderer;
    use std::collections::HashMap;

    fn squad_html(player_ids: &[u32]) -> String {
        let links: String = player_ids
            .iter()
            .map(|id| {
                format!(r#"<a class="css-9pqpod-SquadPlayerLink" href="/players/{id}/player-{id}">P{id}</a>"#)
            })
            .collect();
        format!(
            r#"<html><body>{links}
                <a class="css-9pqpod-SquadPlayerLink" href="/teams/1/overview/x">coach</a>
            </body></html>"#
        )
    }

    fn squad_url(team: usize) -> String {
        format!("https://www.fotmob.com/teams/{team}/squad/team-{team}")
    }

    #[test]
    fn test_parse_squad_page_keeps_player_links() {
        let links = parse_squad_page(&squad_url(1), &squad_html(&[30981, 701154]));
        assert_eq!(
            links,
            vec![
                "https://www.fotmob.com/players/30981/player-30981".to_string(),
                "https://www.fotmob.com/players/701154/player-701154".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_fan_in_completeness_across_pool_sizes() {
        // Team i lists i + 1 players; team 3 has no page and team 5 has no squad.
        let mut pages = HashMap::new();
        let mut expected = 0;
        for team in 0..8 {
            if team == 3 {
                continue;
            }
            let html = if team == 5 {
                "<html><body>no squad yet</body></html>".to_string()
            } else {
                let ids: Vec<u32> = (0..=team as u32).map(|p| 1000 * team as u32 + p).collect();
                expected += ids.len();
                squad_html(&ids)
            };
            pages.insert(squad_url(team), html);
        }
        let urls: Vec<String> = (0..8).map(squad_url).collect();

        for workers in 1..=5 {
            let renderer = Arc::new(SnapshotRenderer::new(pages.clone()));
            let pool = Arc::new(PoolManager::new(renderer.clone(), workers));
            let collector = TeamCollector::new(pool.clone(), Timeouts::default());

            let links = collector.collect(urls.clone()).await;
            assert_eq!(links.len(), expected, "workers = {workers}");
            assert_eq!(renderer.contexts_created(), 8);
            assert_eq!(renderer.open_contexts(), 0);
            assert_eq!(pool.active(), 0);
        }
    }
}
