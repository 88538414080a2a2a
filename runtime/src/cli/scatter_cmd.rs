//! `footgraph scatter --x KEY --y KEY`: two statistics side by side.

use crate::cli::output::{self, Styled};
use crate::cli::FilterArgs;
use crate::model::DataField;
use crate::store::Store;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the scatter command.
pub fn run(x: DataField, y: DataField, filter: &FilterArgs, db: &Path) -> Result<()> {
    let s = Styled::new();
    let store = Store::open(db).with_context(|| format!("failed to open database {}", db.display()))?;
    let points = store.scatter(&filter.to_filter(), x, y)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "x": { "key": x.key(), "label": x.display_name() },
            "y": { "key": y.key(), "label": y.display_name() },
            "points": points,
        }));
        return Ok(());
    }

    if points.is_empty() {
        eprintln!(
            "  {} No players have both {} and {}.",
            s.warn_sym(),
            x.display_name(),
            y.display_name()
        );
        return Ok(());
    }

    println!(
        "{:<28} {:<22} {:>12} {:>12}",
        "NAME",
        "CLUB",
        x.key(),
        y.key()
    );
    for point in &points {
        println!(
            "{:<28} {:<22} {:>12} {:>12}",
            point.player.name,
            point.player.club.as_deref().unwrap_or("-"),
            point.x,
            point.y
        );
    }
    if !output::is_quiet() {
        eprintln!();
        eprintln!(
            "  {}",
            s.dim(&format!(
                "{} players, {} vs {}",
                points.len(),
                x.display_name(),
                y.display_name()
            ))
        );
    }
    Ok(())
}
