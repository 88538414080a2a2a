//! Domain records persisted by the store and the Data field contract.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A league, keyed by its observed display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: i64,
    pub name: String,
    /// Not populated by any collector yet.
    pub country: Option<String>,
}

/// A club, unique per `(name, league)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub league_id: i64,
    pub founded_year: Option<i64>,
}

/// Biographical fields written on every player upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerFields {
    pub name: String,
    pub club_id: Option<i64>,
    /// Comma-joined position codes, e.g. `"ST, LW"`.
    pub position: String,
    pub country: Option<String>,
    pub shirt_number: Option<i64>,
    pub age: Option<i64>,
    /// Centimetres.
    pub height: Option<i64>,
    /// Smallest currency unit.
    pub market_value: Option<i64>,
    pub preferred_foot: Option<String>,
}

/// A stored player, keyed by the external fotmob id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub fotmob_id: i64,
    #[serde(flatten)]
    pub fields: PlayerFields,
    pub updated_at: String,
}

/// The single statistics row owned by a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    pub id: i64,
    pub player_id: i64,
    pub stats: PlayerStats,
}

/// Numeric shape of a Data column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
}

impl FieldKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            FieldKind::Int => "INTEGER",
            FieldKind::Float => "REAL",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Int => "int",
            FieldKind::Float => "float",
        }
    }
}

/// Semantic grouping of Data fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    Shooting,
    Passing,
    Possession,
    Defending,
    Discipline,
    Goalkeeping,
    Distribution,
}

impl FieldGroup {
    pub fn title(self) -> &'static str {
        match self {
            FieldGroup::Shooting => "Shooting",
            FieldGroup::Passing => "Passing",
            FieldGroup::Possession => "Possession",
            FieldGroup::Defending => "Defending",
            FieldGroup::Discipline => "Discipline",
            FieldGroup::Goalkeeping => "Goalkeeping",
            FieldGroup::Distribution => "Goalkeeper distribution",
        }
    }
}

macro_rules! data_fields {
    ($( $variant:ident => $key:literal, $display:literal, $kind:ident, $group:ident; )+) => {
        /// One statistics column. The `key` strings are the stable contract
        /// consumed by the reporting side.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum DataField {
            $( $variant, )+
        }

        impl DataField {
            /// Every field, in column order.
            pub const ALL: &'static [DataField] = &[ $( DataField::$variant, )+ ];

            pub fn key(self) -> &'static str {
                match self {
                    $( DataField::$variant => $key, )+
                }
            }

            pub fn display_name(self) -> &'static str {
                match self {
                    $( DataField::$variant => $display, )+
                }
            }

            pub fn kind(self) -> FieldKind {
                match self {
                    $( DataField::$variant => FieldKind::$kind, )+
                }
            }

            pub fn group(self) -> FieldGroup {
                match self {
                    $( DataField::$variant => FieldGroup::$group, )+
                }
            }
        }
    };
}

data_fields! {
    Goals => "goals", "Goals", Int, Shooting;
    ExpectedGoals => "expected_goals", "Expected Goals", Float, Shooting;
    XgOnTarget => "xg_on_target", "xG on Target", Float, Shooting;
    PenaltyGoals => "penalty_goals", "Penalty Goals", Int, Shooting;
    NonPenaltyXg => "non_penalty_xg", "Non-Penalty xG", Float, Shooting;
    Shots => "shots", "Shots", Int, Shooting;
    ShotsOnTarget => "shots_on_target", "Shots on Target", Int, Shooting;

    Assists => "assists", "Assists", Int, Passing;
    ExpectedAssists => "expected_assists", "Expected Assists", Float, Passing;
    SuccessfulPasses => "successful_passes", "Successful Passes", Float, Passing;
    PassAccuracy => "pass_accuracy", "Pass Accuracy", Float, Passing;
    AccurateLongBalls => "accurate_long_balls", "Accurate Long Balls", Int, Passing;
    LongBallAccuracy => "long_ball_accuracy", "Long Ball Accuracy", Float, Passing;
    ChancesCreated => "chances_created", "Chances Created", Int, Passing;
    SuccessfulCrosses => "successful_crosses", "Successful Crosses", Int, Passing;
    CrossAccuracy => "cross_accuracy", "Cross Accuracy", Float, Passing;

    SuccessfulDribbles => "successful_dribbles", "Successful Dribbles", Int, Possession;
    DribbleSuccess => "dribble_success", "Dribble Success", Float, Possession;
    Touches => "touches", "Touches", Float, Possession;
    TouchesInOppositionBox => "touches_in_opposition_box", "Touches in Opposition Box", Int, Possession;
    Dispossessed => "dispossessed", "Dispossessed", Int, Possession;
    FoulsWon => "fouls_won", "Fouls Won", Int, Possession;
    PenaltiesAwarded => "penalties_awarded", "Penalties Awarded", Int, Possession;

    TacklesWon => "tackles_won", "Tackles Won", Int, Defending;
    TacklesWonPercentage => "tackles_won_percentage", "Tackles Won Percentage", Float, Defending;
    DuelsWon => "duels_won", "Duels Won", Int, Defending;
    DuelsWonPercentage => "duels_won_percentage", "Duels Won Percentage", Float, Defending;
    AerialDuelsWon => "aerial_duels_won", "Aerial Duels Won", Int, Defending;
    AerialDuelsWonPercentage => "aerial_duels_won_percentage", "Aerial Duels Won Percentage", Float, Defending;
    Interceptions => "interceptions", "Interceptions", Int, Defending;
    Blocked => "blocked", "Blocked", Int, Defending;
    FoulsCommitted => "fouls_committed", "Fouls Committed", Int, Defending;
    Recoveries => "recoveries", "Recoveries", Int, Defending;
    PossessionWonFinal3rd => "possession_won_final_3rd", "Possession Won Final 3rd", Int, Defending;
    DribbledPast => "dribbled_past", "Dribbled Past", Int, Defending;

    YellowCards => "yellow_cards", "Yellow Cards", Int, Discipline;
    RedCards => "red_cards", "Red Cards", Int, Discipline;

    Saves => "saves", "Saves", Int, Goalkeeping;
    SavePercentage => "save_percentage", "Save Percentage", Float, Goalkeeping;
    GoalsConceded => "goals_conceded", "Goals Conceded", Int, Goalkeeping;
    GoalsPrevented => "goals_prevented", "Goals Prevented", Float, Goalkeeping;
    CleanSheets => "clean_sheets", "Clean Sheets", Int, Goalkeeping;
    ErrorLedToGoal => "error_led_to_goal", "Error Led to Goal", Int, Goalkeeping;
    HighClaim => "high_claim", "High Claim", Int, Goalkeeping;

    GkPassAccuracy => "gk_pass_accuracy", "GK Pass Accuracy", Float, Distribution;
    GkAccurateLongBalls => "gk_accurate_long_balls", "GK Accurate Long Balls", Int, Distribution;
    GkLongBallAccuracy => "gk_long_ball_accuracy", "GK Long Ball Accuracy", Float, Distribution;
}

impl fmt::Display for DataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DataField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataField::ALL
            .iter()
            .copied()
            .find(|f| f.key() == s)
            .ok_or_else(|| format!("unknown data field `{s}`"))
    }
}

impl Serialize for DataField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for DataField {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}

/// A parsed statistic: integer counts or float rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Float(f64),
}

impl StatValue {
    /// Widen integers stored in a float column. Floats in integer columns are
    /// kept as they are.
    pub fn for_kind(self, kind: FieldKind) -> StatValue {
        match (self, kind) {
            (StatValue::Int(v), FieldKind::Float) => StatValue::Float(v as f64),
            (v, _) => v,
        }
    }
}

/// Statistics extracted for one player. Fields never observed stay absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerStats {
    values: BTreeMap<DataField, StatValue>,
}

impl PlayerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: DataField, value: StatValue) {
        self.values.insert(field, value);
    }

    pub fn get(&self, field: DataField) -> Option<StatValue> {
        self.values.get(&field).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_keys_unique() {
        let keys: HashSet<_> = DataField::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(keys.len(), DataField::ALL.len());
        assert_eq!(DataField::ALL.len(), 47);
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("goals".parse::<DataField>().unwrap(), DataField::Goals);
        assert_eq!(
            "possession_won_final_3rd".parse::<DataField>().unwrap(),
            DataField::PossessionWonFinal3rd
        );
        assert!("Goals".parse::<DataField>().is_err());
    }

    #[test]
    fn test_field_groups() {
        assert_eq!(DataField::RedCards.group(), FieldGroup::Discipline);
        assert_eq!(DataField::GkPassAccuracy.group(), FieldGroup::Distribution);
        assert_eq!(DataField::ExpectedGoals.kind(), FieldKind::Float);
        assert_eq!(DataField::Shots.kind(), FieldKind::Int);
    }

    #[test]
    fn test_stats_serialize_by_key() {
        let mut stats = PlayerStats::new();
        stats.set(DataField::Goals, StatValue::Int(12));
        stats.set(DataField::ExpectedGoals, StatValue::Float(10.4));
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["goals"], 12);
        assert_eq!(json["expected_goals"], 10.4);
        assert!(json.get("shots").is_none());
    }
}
