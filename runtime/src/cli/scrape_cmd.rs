//! `footgraph scrape`: run the pipeline against the live site or a replay.

use crate::cli::output::{self, Styled};
use crate::cli::ScrapeArgs;
use crate::config::{ScrapeConfig, DEFAULT_LEAGUES};
use crate::pipeline::{Pipeline, RunSummary};
use crate::renderer::chromium::{ChromiumRenderer, LaunchOptions};
use crate::renderer::snapshot::SnapshotRenderer;
use crate::renderer::Renderer;
use crate::store::Store;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Run the scrape command.
pub async fn run(args: ScrapeArgs, db: &Path) -> Result<()> {
    let s = Styled::new();
    let store = Arc::new(
        Store::open(db).with_context(|| format!("failed to open database {}", db.display()))?,
    );

    let league_urls = if args.leagues.is_empty() {
        DEFAULT_LEAGUES.iter().map(|u| u.to_string()).collect()
    } else {
        args.leagues
    };
    let config = ScrapeConfig::new(league_urls, args.max_workers);

    if !output::is_quiet() && !output::is_json() {
        output::print_header(&s);
        eprintln!(
            "  Scraping {} leagues with {} workers into {}",
            config.league_urls.len(),
            config.max_workers,
            db.display()
        );
        eprintln!();
    }

    let renderer: Arc<dyn Renderer> = match &args.replay {
        Some(dir) => Arc::new(
            SnapshotRenderer::from_dir(dir)
                .with_context(|| format!("failed to load replay from {}", dir.display()))?,
        ),
        None => {
            let options = LaunchOptions {
                headful: args.headful,
                chrome_path: args.chrome,
            };
            Arc::new(
                ChromiumRenderer::launch(&options)
                    .await
                    .context("failed to launch Chrome")?,
            )
        }
    };

    let summary = Pipeline::new(Arc::clone(&renderer), store, config).run().await;

    if let Err(e) = renderer.shutdown().await {
        warn!("browser shutdown: {e}");
    }

    if output::is_json() {
        output::print_json(&serde_json::to_value(&summary)?);
        return Ok(());
    }
    print_summary(&s, &summary);
    Ok(())
}

fn print_summary(s: &Styled, summary: &RunSummary) {
    if let Some(reason) = summary.halted {
        eprintln!("  {} Stopped early: {reason}", s.warn_sym());
        return;
    }
    if output::is_quiet() {
        eprintln!(
            "  {} {} players updated, {} failed",
            s.ok_sym(),
            summary.players.succeeded,
            summary.players.failed
        );
        return;
    }

    output::print_section(s, "Run");
    output::print_check(s.ok_sym(), "Team links", &summary.team_links.to_string());
    output::print_check(s.ok_sym(), "Player links", &summary.player_links.to_string());
    output::print_check(s.ok_sym(), "Succeeded", &s.green(&summary.players.succeeded.to_string()));
    let failed_sym = if summary.players.failed == 0 {
        s.ok_sym()
    } else {
        s.fail_sym()
    };
    output::print_check(failed_sym, "Failed", &s.red(&summary.players.failed.to_string()));
    output::print_check(
        s.ok_sym(),
        "Without stats",
        &s.yellow(&summary.players.no_stats.to_string()),
    );
    output::print_check(
        s.ok_sym(),
        "Duration",
        &output::format_duration(summary.elapsed.as_secs()),
    );

    if let Some(counts) = summary.counts {
        eprintln!();
        output::print_section(s, "Database");
        output::print_check(s.ok_sym(), "Leagues", &counts.leagues.to_string());
        output::print_check(s.ok_sym(), "Clubs", &counts.clubs.to_string());
        output::print_check(s.ok_sym(), "Players", &counts.players.to_string());
        output::print_check(s.ok_sym(), "Data rows", &counts.data.to_string());
    }
}
