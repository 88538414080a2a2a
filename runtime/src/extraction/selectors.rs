//! Structural locators and URL patterns for the source site.

use crate::renderer::Locator;

/// Absolute prefix of team profile links.
pub const TEAM_URL_PREFIX: &str = "https://www.fotmob.com/teams/";

/// Absolute prefix of player profile links.
pub const PLAYER_URL_PREFIX: &str = "https://www.fotmob.com/players/";

// League overview page.
pub const LEAGUE_TABLE: Locator = Locator::css(".TableContainer");
pub const LEAGUE_TABLE_LINKS: Locator = Locator::css(".TableContainer a");
pub const LEAGUE_TITLE: Locator = Locator::css(".css-4ow769-TeamOrLeagueName");
pub const TEAM_NAME: Locator = Locator::css(".TeamName");

// Squad page.
pub const SQUAD_PLAYER_LINK: Locator = Locator::css(".css-9pqpod-SquadPlayerLink");

// Player profile page.
pub const PLAYER_NAME: Locator = Locator::css(".css-zt63wq-PlayerNameCSS");
pub const PLAYER_TEAM: Locator = Locator::css(".css-14k6s2u-TeamCSS");
pub const PLAYER_POSITIONS: Locator = Locator::css(".css-1g41csj-PositionsCSS");
pub const BIO_STAT: Locator = Locator::css("[class*='PlayerBioStatCSS']");
pub const BIO_STAT_TITLE: Locator = Locator::css(".css-10h4hmz-StatTitleCSS");
pub const BIO_STAT_VALUE: Locator = Locator::css(".css-to3w1c-StatValueCSS");
pub const STAT_ITEM: Locator = Locator::css(".css-1v73fp6-StatItemCSS");
pub const STAT_ITEM_TITLE: Locator = Locator::css(".css-2duihq-StatTitle");
pub const STAT_ITEM_VALUE: Locator = Locator::css(".css-jb6lgd-StatValue");

#[cfg(test)]
pub(crate) const ALL: &[Locator] = &[
    LEAGUE_TABLE,
    LEAGUE_TABLE_LINKS,
    LEAGUE_TITLE,
    TEAM_NAME,
    SQUAD_PLAYER_LINK,
    PLAYER_NAME,
    PLAYER_TEAM,
    PLAYER_POSITIONS,
    BIO_STAT,
    BIO_STAT_TITLE,
    BIO_STAT_VALUE,
    STAT_ITEM,
    STAT_ITEM_TITLE,
    STAT_ITEM_VALUE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locators_parse() {
        for locator in ALL {
            assert!(
                scraper::Selector::parse(locator.as_str()).is_ok(),
                "bad selector {locator}"
            );
        }
    }
}
