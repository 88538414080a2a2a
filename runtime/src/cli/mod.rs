//! CLI subcommand implementations for the footgraph binary.

pub mod fields_cmd;
pub mod output;
pub mod players_cmd;
pub mod scatter_cmd;
pub mod scrape_cmd;

use crate::config::DEFAULT_WORKERS;
use crate::store::query::{PlayerFilter, Range};
use clap::Args;
use std::path::PathBuf;

/// Options for `footgraph scrape`.
#[derive(Debug, Clone, Args)]
pub struct ScrapeArgs {
    /// Concurrent browser contexts (values below 1 are raised to 1).
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub max_workers: usize,

    /// League overview URL; repeat for several. Defaults to the top five leagues.
    #[arg(long = "league", value_name = "URL")]
    pub leagues: Vec<String>,

    /// Chrome/Chromium binary to launch.
    #[arg(long, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Show the browser window.
    #[arg(long)]
    pub headful: bool,

    /// Serve pages from a captured directory (`pages.json` + HTML files)
    /// instead of launching a browser.
    #[arg(long, value_name = "DIR")]
    pub replay: Option<PathBuf>,
}

/// Player filters shared by `players` and `scatter`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[arg(long = "league-id", value_name = "ID")]
    pub league_ids: Vec<i64>,

    #[arg(long = "club-id", value_name = "ID")]
    pub club_ids: Vec<i64>,

    #[arg(long = "country")]
    pub countries: Vec<String>,

    /// Position code substring, e.g. `ST` or `cb`.
    #[arg(long = "position")]
    pub positions: Vec<String>,

    #[arg(long)]
    pub min_age: Option<i64>,
    #[arg(long)]
    pub max_age: Option<i64>,

    /// Centimetres.
    #[arg(long)]
    pub min_height: Option<i64>,
    #[arg(long)]
    pub max_height: Option<i64>,

    /// Market value in euros.
    #[arg(long)]
    pub min_value: Option<i64>,
    #[arg(long)]
    pub max_value: Option<i64>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> PlayerFilter {
        PlayerFilter {
            league_ids: self.league_ids.clone(),
            club_ids: self.club_ids.clone(),
            countries: self.countries.clone(),
            positions: self.positions.clone(),
            age: Range::new(self.min_age, self.max_age),
            height: Range::new(self.min_height, self.max_height),
            market_value: Range::new(self.min_value, self.max_value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_args_map_ranges() {
        let args = FilterArgs {
            positions: vec!["ST".to_string()],
            min_age: Some(20),
            max_value: Some(5_000_000),
            ..FilterArgs::default()
        };
        let filter = args.to_filter();
        assert_eq!(filter.positions, vec!["ST"]);
        assert_eq!(filter.age, Range::new(Some(20), None));
        assert_eq!(filter.height, Range::default());
        assert_eq!(filter.market_value.max, Some(5_000_000));
    }
}
