//! `footgraph players`: filtered player listing.

use crate::cli::output::{self, Styled};
use crate::cli::FilterArgs;
use crate::store::query::PlayerRow;
use crate::store::Store;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the players command.
pub fn run(filter: &FilterArgs, choices: bool, db: &Path) -> Result<()> {
    let s = Styled::new();
    let store = Store::open(db).with_context(|| format!("failed to open database {}", db.display()))?;

    if choices {
        let leagues = store.leagues()?;
        let clubs = store.clubs()?;
        let countries = store.distinct_countries()?;
        let positions = store.primary_positions()?;
        if output::is_json() {
            output::print_json(&serde_json::json!({
                "leagues": leagues,
                "clubs": clubs,
                "countries": countries,
                "positions": positions,
            }));
        } else {
            output::print_section(&s, "Leagues (--league-id)");
            for league in &leagues {
                eprintln!("    {:>5}  {}", league.id, league.name);
            }
            eprintln!();
            output::print_section(&s, "Clubs (--club-id)");
            for club in &clubs {
                eprintln!("    {:>5}  {:<28} {}", club.id, club.name, s.dim(&club.league));
            }
            eprintln!();
            output::print_section(&s, "Countries");
            eprintln!("    {}", countries.join(", "));
            eprintln!();
            output::print_section(&s, "Positions");
            eprintln!("    {}", positions.join(", "));
        }
        return Ok(());
    }

    let rows = store.query_players(&filter.to_filter())?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        eprintln!("  {} No players match.", s.warn_sym());
        return Ok(());
    }

    println!(
        "{:<28} {:<22} {:<14} {:<16} {:>4} {:>6} {:>9}",
        "NAME", "CLUB", "POSITION", "COUNTRY", "AGE", "HEIGHT", "VALUE"
    );
    for row in &rows {
        println!("{}", format_row(row));
    }
    if !output::is_quiet() {
        eprintln!();
        eprintln!("  {}", s.dim(&format!("{} players", rows.len())));
    }
    Ok(())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn format_row(row: &PlayerRow) -> String {
    format!(
        "{:<28} {:<22} {:<14} {:<16} {:>4} {:>6} {:>9}",
        truncate(&row.name, 28),
        truncate(row.club.as_deref().unwrap_or("-"), 22),
        truncate(&row.position, 14),
        truncate(row.country.as_deref().unwrap_or("-"), 16),
        output::cell(row.age),
        output::cell(row.height),
        output::cell(row.market_value.map(output::format_market_value)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Nantes", 10), "Nantes");
        assert_eq!(truncate("Paris Saint-Germain", 8), "Paris S…");
    }

    #[test]
    fn test_format_row_missing_values() {
        let row = PlayerRow {
            id: 1,
            fotmob_id: 30981,
            name: "Lionel Messi".to_string(),
            position: "RW".to_string(),
            country: None,
            shirt_number: None,
            age: Some(37),
            height: None,
            market_value: Some(18_000_000),
            preferred_foot: None,
            club_id: None,
            club: None,
            league_id: None,
            league: None,
        };
        let line = format_row(&row);
        assert!(line.starts_with("Lionel Messi"));
        assert!(line.contains("€18M"));
        assert!(line.contains(" 37 "));
    }
}
