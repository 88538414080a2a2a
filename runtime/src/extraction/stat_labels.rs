//! Label → Data field table for the season statistics block.
//!
//! Some labels appear in both the outfield and goalkeeper distribution
//! sections of the page, so a label may feed more than one field.

use crate::model::{DataField, PlayerStats, StatValue};
use std::collections::HashSet;
use thiserror::Error;

/// One row of the table.
#[derive(Debug, Clone, Copy)]
pub struct LabelMapping {
    pub label: &'static str,
    pub fields: &'static [DataField],
}

const fn map(label: &'static str, fields: &'static [DataField]) -> LabelMapping {
    LabelMapping { label, fields }
}

use DataField as F;

/// Ordered mapping, checked by [`validate`] at startup.
pub static STAT_LABELS: &[LabelMapping] = &[
    map("Goals", &[F::Goals]),
    map("Expected goals (xG)", &[F::ExpectedGoals]),
    map("xG on target (xGOT)", &[F::XgOnTarget]),
    map("Penalty goals", &[F::PenaltyGoals]),
    map("Non-penalty xG", &[F::NonPenaltyXg]),
    map("Shots", &[F::Shots]),
    map("Shots on target", &[F::ShotsOnTarget]),
    map("Assists", &[F::Assists]),
    map("Expected assists (xA)", &[F::ExpectedAssists]),
    map("Successful passes", &[F::SuccessfulPasses]),
    map("Pass accuracy", &[F::PassAccuracy, F::GkPassAccuracy]),
    map("Accurate long balls", &[F::AccurateLongBalls, F::GkAccurateLongBalls]),
    map("Long ball accuracy", &[F::LongBallAccuracy, F::GkLongBallAccuracy]),
    map("Chances created", &[F::ChancesCreated]),
    map("Successful crosses", &[F::SuccessfulCrosses]),
    map("Cross accuracy", &[F::CrossAccuracy]),
    map("Successful dribbles", &[F::SuccessfulDribbles]),
    map("Dribble success", &[F::DribbleSuccess]),
    map("Touches", &[F::Touches]),
    map("Touches in opposition box", &[F::TouchesInOppositionBox]),
    map("Dispossessed", &[F::Dispossessed]),
    map("Fouls won", &[F::FoulsWon]),
    map("Penalties awarded", &[F::PenaltiesAwarded]),
    map("Tackles won", &[F::TacklesWon]),
    map("Tackles won %", &[F::TacklesWonPercentage]),
    map("Duels won", &[F::DuelsWon]),
    map("Duels won %", &[F::DuelsWonPercentage]),
    map("Aerial duels won", &[F::AerialDuelsWon]),
    map("Aerial duels won %", &[F::AerialDuelsWonPercentage]),
    map("Interceptions", &[F::Interceptions]),
    map("Blocked", &[F::Blocked]),
    map("Fouls committed", &[F::FoulsCommitted]),
    map("Recoveries", &[F::Recoveries]),
    map("Possession won final 3rd", &[F::PossessionWonFinal3rd]),
    map("Dribbled past", &[F::DribbledPast]),
    map("Yellow cards", &[F::YellowCards]),
    map("Red cards", &[F::RedCards]),
    map("Saves", &[F::Saves]),
    map("Save percentage", &[F::SavePercentage]),
    map("Goals conceded", &[F::GoalsConceded]),
    map("Goals prevented", &[F::GoalsPrevented]),
    map("Clean sheets", &[F::CleanSheets]),
    map("Error led to goal", &[F::ErrorLedToGoal]),
    map("High claim", &[F::HighClaim]),
];

/// A malformed label table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelTableError {
    #[error("label `{0}` appears more than once")]
    DuplicateLabel(&'static str),
    #[error("field `{0}` is fed by more than one label")]
    FieldMappedTwice(DataField),
    #[error("label `{0}` maps to no field")]
    EmptyMapping(&'static str),
}

/// Check that labels are unique and no field has two sources.
pub fn validate() -> Result<(), LabelTableError> {
    validate_table(STAT_LABELS)
}

fn validate_table(table: &[LabelMapping]) -> Result<(), LabelTableError> {
    let mut labels = HashSet::new();
    let mut fields = HashSet::new();
    for entry in table {
        if !labels.insert(entry.label) {
            return Err(LabelTableError::DuplicateLabel(entry.label));
        }
        if entry.fields.is_empty() {
            return Err(LabelTableError::EmptyMapping(entry.label));
        }
        for field in entry.fields {
            if !fields.insert(*field) {
                return Err(LabelTableError::FieldMappedTwice(*field));
            }
        }
    }
    Ok(())
}

/// Fields fed by an exact page label.
pub fn fields_for(label: &str) -> Option<&'static [DataField]> {
    STAT_LABELS
        .iter()
        .find(|m| m.label == label)
        .map(|m| m.fields)
}

/// Record `value` under every field `label` maps to. Returns false for an
/// unknown label.
pub fn apply(stats: &mut PlayerStats, label: &str, value: StatValue) -> bool {
    match fields_for(label) {
        Some(fields) => {
            for field in fields {
                stats.set(*field, value);
            }
            true
        }
        None => false,
    }
}
