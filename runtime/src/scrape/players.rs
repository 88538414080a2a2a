//! Player stage: profile pages → Player and Data rows, on a bounded pool.
//!
//! Each task renders one profile, upserts the player's biography, then tries
//! the season statistics block. Statistics are optional: a profile without
//! them still counts as a success. Any failure before the player upsert
//! counts against that player only.

use super::fan_out;
use crate::config::Timeouts;
use crate::error::ScrapeError;
use crate::extraction::page::{find_within, text};
use crate::extraction::selectors::{
    BIO_STAT, BIO_STAT_TITLE, BIO_STAT_VALUE, PLAYER_NAME, PLAYER_POSITIONS, PLAYER_TEAM,
    STAT_ITEM, STAT_ITEM_TITLE, STAT_ITEM_VALUE,
};
use crate::extraction::{stat_labels, RenderedPage};
use crate::model::{PlayerFields, PlayerStats};
use crate::parse;
use crate::pool::{ContextHandle, PoolManager};
use crate::store::Store;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Biography read off a profile page, before club resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerProfile {
    pub name: Option<String>,
    /// Club display name with any loan qualifier removed.
    pub club: Option<String>,
    pub position: String,
    pub country: Option<String>,
    pub shirt_number: Option<i64>,
    pub age: Option<i64>,
    pub height: Option<i64>,
    pub market_value: Option<i64>,
    pub preferred_foot: Option<String>,
}

impl PlayerProfile {
    fn into_fields(self, name: String, club_id: Option<i64>) -> PlayerFields {
        PlayerFields {
            name,
            club_id,
            position: self.position,
            country: self.country,
            shirt_number: self.shirt_number,
            age: self.age,
            height: self.height,
            market_value: self.market_value,
            preferred_foot: self.preferred_foot,
        }
    }
}

/// Extract the biography from a rendered profile page.
pub fn parse_profile(page_url: &str, html: &str) -> PlayerProfile {
    let page = RenderedPage::parse(page_url, html);
    let mut profile = PlayerProfile {
        name: page.text_of(PLAYER_NAME).filter(|n| !n.is_empty()),
        club: page
            .text_of(PLAYER_TEAM)
            .map(|c| parse::strip_loan_suffix(&c).to_string())
            .filter(|c| !c.is_empty()),
        position: page
            .find_all(PLAYER_POSITIONS)
            .into_iter()
            .filter_map(|p| text(Some(p)))
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        ..PlayerProfile::default()
    };

    for stat in page.find_all(BIO_STAT) {
        let title = text(find_within(stat, BIO_STAT_TITLE)).unwrap_or_default();
        let Some(value) = text(find_within(stat, BIO_STAT_VALUE)) else {
            continue;
        };
        match title.as_str() {
            "Height" => profile.height = parse::leading_int(&value).ok(),
            "Shirt" => profile.shirt_number = parse::shirt_number(&value).ok(),
            "Preferred foot" => profile.preferred_foot = Some(value),
            "Country" => profile.country = Some(value),
            "Market value" => profile.market_value = parse::market_value(&value).ok(),
            _ if value.contains("years") => profile.age = parse::leading_int(&value).ok(),
            _ => debug!("ignoring bio stat {title:?}"),
        }
    }

    profile
}

/// Map every recognised stat item on the page into Data fields.
///
/// Unknown labels and unparsable values leave their fields unset.
pub fn parse_stats(page_url: &str, html: &str) -> PlayerStats {
    let page = RenderedPage::parse(page_url, html);
    let mut stats = PlayerStats::new();
    for item in page.find_all(STAT_ITEM) {
        let (Some(label), Some(raw)) = (
            text(find_within(item, STAT_ITEM_TITLE)),
            text(find_within(item, STAT_ITEM_VALUE)),
        ) else {
            continue;
        };
        let Ok(value) = parse::stat_value(&raw) else {
            debug!("unparsable value {raw:?} for {label:?}");
            continue;
        };
        if !stat_labels::apply(&mut stats, &label, value) {
            debug!("unmapped stat label {label:?}");
        }
    }
    stats
}

/// How a successfully processed player ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerOutcome {
    /// Player and statistics written.
    Updated,
    /// Player written; the statistics block was absent or unreadable.
    NoStats,
}

/// Counts for one extraction batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Successes whose statistics were not written.
    pub no_stats: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    fn record(&mut self, outcome: Option<PlayerOutcome>) {
        match outcome {
            Some(PlayerOutcome::Updated) => self.succeeded += 1,
            Some(PlayerOutcome::NoStats) => {
                self.succeeded += 1;
                self.no_stats += 1;
            }
            None => self.failed += 1,
        }
    }
}

pub struct PlayerExtractor {
    pool: Arc<PoolManager>,
    store: Arc<Store>,
    timeouts: Timeouts,
}

impl PlayerExtractor {
    pub fn new(pool: Arc<PoolManager>, store: Arc<Store>, timeouts: Timeouts) -> Self {
        Self {
            pool,
            store,
            timeouts,
        }
    }

    /// Extract every player and wait for the whole batch.
    pub async fn extract_all(&self, player_urls: Vec<String>) -> BatchSummary {
        let total = player_urls.len();
        info!(
            "extracting {total} players with {} workers",
            self.pool.max_contexts()
        );
        let pool = Arc::clone(&self.pool);
        let store = Arc::clone(&self.store);
        let timeouts = self.timeouts;

        let outcomes = fan_out(player_urls, move |url, index| {
            let pool = Arc::clone(&pool);
            let store = Arc::clone(&store);
            async move {
                let slug = parse::slug(&url).to_string();
                info!("processing player {index}/{total}: {slug}");
                match extract_player(&pool, &store, &url, &timeouts).await {
                    Ok(outcome) => Some(outcome),
                    Err(e) => {
                        warn!("player {slug} failed: {e}");
                        None
                    }
                }
            }
        })
        .await;

        let mut summary = BatchSummary::default();
        for (_, outcome) in outcomes {
            summary.record(outcome.flatten());
        }
        info!(
            "players done: {} succeeded, {} failed, {} without stats",
            summary.succeeded, summary.failed, summary.no_stats
        );
        summary
    }
}

async fn extract_player(
    pool: &PoolManager,
    store: &Store,
    url: &str,
    timeouts: &Timeouts,
) -> Result<PlayerOutcome, ScrapeError> {
    let mut handle = pool.acquire(url).await?;
    let result = scrape_player(&mut handle, store, url, timeouts).await;
    handle.release().await;
    result
}

async fn scrape_player(
    handle: &mut ContextHandle,
    store: &Store,
    url: &str,
    timeouts: &Timeouts,
) -> Result<PlayerOutcome, ScrapeError> {
    let context = handle.context_mut();
    let nav = context.navigate(url, timeouts.navigation_ms()).await?;
    debug!("loaded {} in {}ms", nav.final_url, nav.load_time_ms);
    context.wait_for(PLAYER_NAME, timeouts.player_name).await?;
    let html = context.content().await?;

    let profile = parse_profile(url, &html);
    let fotmob_id =
        parse::player_id_from_url(url).ok_or_else(|| ScrapeError::MissingPlayerId(url.to_string()))?;
    let name = profile
        .name
        .clone()
        .ok_or_else(|| ScrapeError::MissingPlayerName(url.to_string()))?;

    let club_id = match profile.club.as_deref() {
        Some(club) => match store.get_club_by_name(club)? {
            Some(found) => Some(found.id),
            None => {
                info!("{club} not found, leaving club unset for {name}");
                None
            }
        },
        None => None,
    };
    let player = store.upsert_player(fotmob_id, &profile.into_fields(name, club_id))?;

    match context.wait_for(STAT_ITEM, timeouts.player_stats).await {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            info!("no stats available for {}", player.fields.name);
            return Ok(PlayerOutcome::NoStats);
        }
        Err(e) => {
            warn!("stats for {} unreadable: {e}", player.fields.name);
            return Ok(PlayerOutcome::NoStats);
        }
    }

    let html = match context.content().await {
        Ok(html) => html,
        Err(e) => {
            warn!("stats for {} unreadable: {e}", player.fields.name);
            return Ok(PlayerOutcome::NoStats);
        }
    };
    let stats = parse_stats(url, &html);
    store.upsert_data(&player, &stats)?;

    info!("{} scraped and updated ({} stats)", player.fields.name, stats.len());
    Ok(PlayerOutcome::Updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataField, StatValue};
    use crate::renderer::snapshot::SnapshotRenderer;
    use std::collections::HashMap;

    fn profile_html(name: &str, club: &str, bio: &[(&str, &str)], stats: &[(&str, &str)]) -> String {
        let bio: String = bio
            .iter()
            .map(|(title, value)| {
                format!(
                    r#"<div class="css-1ddf6bb-PlayerBioStatCSS">
                         <div class="css-10h4hmz-StatTitleCSS">{title}</div>
                         <div class="css-to3w1c-StatValueCSS">{value}</div>
                       </div>"#
                )
            })
            .collect();
        let stats: String = stats
            .iter()
            .map(|(title, value)| {
                format!(
                    r#"<div class="css-1v73fp6-StatItemCSS">
                         <div class="css-2duihq-StatTitle">{title}</div>
                         <div class="css-jb6lgd-StatValue">{value}</div>
                       </div>"#
                )
            })
            .collect();
        format!(
            r#"<html><body>
                <h1 class="css-zt63wq-PlayerNameCSS">{name}</h1>
                <div class="css-14k6s2u-TeamCSS">{club}</div>
                <div class="css-1g41csj-PositionsCSS">ST</div>
                <div class="css-1g41csj-PositionsCSS">LW</div>
                {bio}
                <section>{stats}</section>
            </body></html>"#
        )
    }

    fn player_url(id: &str, slug: &str) -> String {
        format!("https://www.fotmob.com/players/{id}/{slug}")
    }

    fn extractor(pages: HashMap<String, String>, store: Arc<Store>, workers: usize) -> PlayerExtractor {
        let renderer = Arc::new(SnapshotRenderer::new(pages));
        let pool = Arc::new(PoolManager::new(renderer, workers));
        PlayerExtractor::new(pool, store, Timeouts::default())
    }

    #[test]
    fn test_parse_profile() {
        let html = profile_html(
            "Moses Simon",
            "Nantes (on loan)",
            &[
                ("Height", "168 cm"),
                ("Shirt", "27"),
                ("Preferred foot", "Right"),
                ("Country", "Nigeria"),
                ("Market value", "€4.5M"),
                ("12 Jul 1995", "29 years"),
            ],
            &[],
        );
        let profile = parse_profile(&player_url("574574", "moses-simon"), &html);
        assert_eq!(profile.name.as_deref(), Some("Moses Simon"));
        assert_eq!(profile.club.as_deref(), Some("Nantes"));
        assert_eq!(profile.position, "ST, LW");
        assert_eq!(profile.height, Some(168));
        assert_eq!(profile.shirt_number, Some(27));
        assert_eq!(profile.preferred_foot.as_deref(), Some("Right"));
        assert_eq!(profile.country.as_deref(), Some("Nigeria"));
        assert_eq!(profile.market_value, Some(4_500_000));
        assert_eq!(profile.age, Some(29));
    }

    #[test]
    fn test_parse_profile_bad_values_are_unset() {
        let html = profile_html(
            "X",
            "Y",
            &[("Height", "unknown"), ("Shirt", "-"), ("Market value", "N/A")],
            &[],
        );
        let profile = parse_profile(&player_url("1", "x"), &html);
        assert_eq!(profile.height, None);
        assert_eq!(profile.shirt_number, None);
        assert_eq!(profile.market_value, None);
        assert_eq!(profile.age, None);
    }

    #[test]
    fn test_parse_stats() {
        let html = profile_html(
            "X",
            "Y",
            &[],
            &[
                ("Goals", "12"),
                ("Expected goals (xG)", "10,4"),
                ("Pass accuracy", "87%"),
                ("Shots", ""),
                ("Something new", "3"),
                ("xG on target (<!-- -->xGOT<!-- -->)", "4<!-- -->.<!-- -->2"),
            ],
        );
        let stats = parse_stats(&player_url("1", "x"), &html);
        assert_eq!(stats.get(DataField::Goals), Some(StatValue::Int(12)));
        assert_eq!(stats.get(DataField::ExpectedGoals), Some(StatValue::Float(10.4)));
        assert_eq!(stats.get(DataField::PassAccuracy), Some(StatValue::Int(87)));
        assert_eq!(stats.get(DataField::GkPassAccuracy), Some(StatValue::Int(87)));
        assert_eq!(stats.get(DataField::XgOnTarget), Some(StatValue::Float(4.2)));
        assert_eq!(stats.get(DataField::Shots), None);
        assert_eq!(stats.len(), 5);
    }

    #[tokio::test]
    async fn test_rerun_overwrites_single_row() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let url = player_url("701154", "kylian-mbappe");

        let first = profile_html(
            "Kylian Mbappe",
            "Real Madrid",
            &[("Market value", "€180M"), ("Height", "178 cm")],
            &[("Goals", "30"), ("Assists", "8")],
        );
        let summary = extractor(HashMap::from([(url.clone(), first)]), store.clone(), 2)
            .extract_all(vec![url.clone()])
            .await;
        assert_eq!(summary.succeeded, 1);

        let second = profile_html(
            "Kylian Mbappe",
            "Real Madrid",
            &[("Market value", "€170M")],
            &[("Goals", "31")],
        );
        let summary = extractor(HashMap::from([(url.clone(), second)]), store.clone(), 2)
            .extract_all(vec![url])
            .await;
        assert_eq!(summary.succeeded, 1);

        let counts = store.counts().unwrap();
        assert_eq!((counts.players, counts.data), (1, 1));
        let player = store.get_player(701154).unwrap().unwrap();
        assert_eq!(player.fields.market_value, Some(170_000_000));
        assert_eq!(player.fields.height, None);
        let data = store.get_data(&player).unwrap().unwrap();
        assert_eq!(data.stats.get(DataField::Goals), Some(StatValue::Int(31)));
        assert_eq!(data.stats.get(DataField::Assists), None);
    }

    #[tokio::test]
    async fn test_failed_player_does_not_stop_batch() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let mut pages = HashMap::new();
        let mut urls = Vec::new();
        for i in 1..=10 {
            // The fourth link has no numeric id segment.
            let url = if i == 4 {
                player_url("not-an-id", "broken")
            } else {
                player_url(&(1000 + i).to_string(), &format!("player-{i}"))
            };
            pages.insert(
                url.clone(),
                profile_html(&format!("Player {i}"), "Nowhere FC", &[], &[("Goals", "1")]),
            );
            urls.push(url);
        }

        let summary = extractor(pages, store.clone(), 3).extract_all(urls).await;
        assert_eq!(summary.succeeded, 9);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 10);
        assert_eq!(store.counts().unwrap().players, 9);
    }

    #[tokio::test]
    async fn test_duplicate_ids_converge() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let mut pages = HashMap::new();
        let mut urls = Vec::new();
        for slug in ["lionel-messi", "messi", "leo-messi", "l-messi", "lm10"] {
            let url = player_url("30981", slug);
            pages.insert(url.clone(), profile_html("Lionel Messi", "Inter Miami", &[], &[("Goals", "20")]));
            urls.push(url.clone());
            urls.push(url);
        }

        let summary = extractor(pages, store.clone(), 4).extract_all(urls).await;
        assert_eq!(summary.succeeded, 10);
        let counts = store.counts().unwrap();
        assert_eq!((counts.players, counts.data), (1, 1));
    }

    #[tokio::test]
    async fn test_club_resolution_and_missing_stats() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let (league, _) = store.get_or_create_league("Ligue 1").unwrap();
        let (nantes, _) = store.get_or_create_club("Nantes", &league).unwrap();

        let loaned = player_url("574574", "moses-simon");
        let unknown = player_url("12", "someone");
        let pages = HashMap::from([
            (loaned.clone(), profile_html("Moses Simon", "Nantes (on loan)", &[], &[])),
            (unknown.clone(), profile_html("Someone", "Atlantis FC", &[], &[("Goals", "2")])),
        ]);

        let summary = extractor(pages, store.clone(), 2)
            .extract_all(vec![loaned, unknown])
            .await;
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.no_stats, 1);

        let simon = store.get_player(574574).unwrap().unwrap();
        assert_eq!(simon.fields.club_id, Some(nantes.id));
        assert!(store.get_data(&simon).unwrap().is_none());

        let someone = store.get_player(12).unwrap().unwrap();
        assert_eq!(someone.fields.club_id, None);
        assert!(store.get_data(&someone).unwrap().is_some());
    }
}
