//! Read side consumed by reporting: filtered player listings and
//! two-axis scatter data over Data fields.

use super::Store;
use crate::error::StoreError;
use crate::model::{DataField, League};
use rusqlite::types::Value;
use serde::Serialize;

/// Inclusive numeric bounds; either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Range {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Range {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }
}

/// Player filter. Empty lists and open ranges do not constrain.
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub league_ids: Vec<i64>,
    pub club_ids: Vec<i64>,
    pub countries: Vec<String>,
    /// Case-insensitive substrings of the position list, any of which match.
    pub positions: Vec<String>,
    pub age: Range,
    pub height: Range,
    pub market_value: Range,
}

/// A player joined with club and league names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRow {
    pub id: i64,
    pub fotmob_id: i64,
    pub name: String,
    pub position: String,
    pub country: Option<String>,
    pub shirt_number: Option<i64>,
    pub age: Option<i64>,
    pub height: Option<i64>,
    pub market_value: Option<i64>,
    pub preferred_foot: Option<String>,
    pub club_id: Option<i64>,
    pub club: Option<String>,
    pub league_id: Option<i64>,
    pub league: Option<String>,
}

/// A club offered as a filter choice, with its league's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClubChoice {
    pub id: i64,
    pub name: String,
    pub league_id: i64,
    pub league: String,
}

/// One point of a scatter between two Data fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub player: PlayerRow,
    pub x: f64,
    pub y: f64,
}

const PLAYER_COLUMNS: &str = "
    p.id, p.fotmob_id, p.name, p.position, p.country, p.shirt_number, p.age,
    p.height, p.market_value, p.preferred_foot, c.id, c.name, l.id, l.name";

const PLAYER_JOINS: &str = "
    FROM players p
    LEFT JOIN clubs c ON c.id = p.club_id
    LEFT JOIN leagues l ON l.id = c.league_id";

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Build the WHERE clause for `filter`, pushing bound values onto `params`.
fn where_clause(filter: &PlayerFilter, params: &mut Vec<Value>) -> String {
    let mut conditions: Vec<String> = Vec::new();

    if !filter.league_ids.is_empty() {
        conditions.push(format!("l.id IN ({})", placeholders(filter.league_ids.len())));
        params.extend(filter.league_ids.iter().map(|id| Value::Integer(*id)));
    }
    if !filter.club_ids.is_empty() {
        conditions.push(format!("c.id IN ({})", placeholders(filter.club_ids.len())));
        params.extend(filter.club_ids.iter().map(|id| Value::Integer(*id)));
    }
    if !filter.countries.is_empty() {
        conditions.push(format!("p.country IN ({})", placeholders(filter.countries.len())));
        params.extend(filter.countries.iter().map(|c| Value::Text(c.clone())));
    }
    if !filter.positions.is_empty() {
        let any: Vec<&str> = filter
            .positions
            .iter()
            .map(|_| "instr(lower(p.position), lower(?)) > 0")
            .collect();
        conditions.push(format!("({})", any.join(" OR ")));
        params.extend(filter.positions.iter().map(|p| Value::Text(p.clone())));
    }

    for (column, range) in [
        ("p.age", filter.age),
        ("p.height", filter.height),
        ("p.market_value", filter.market_value),
    ] {
        if let Some(min) = range.min {
            conditions.push(format!("{column} >= ?"));
            params.push(Value::Integer(min));
        }
        if let Some(max) = range.max {
            conditions.push(format!("{column} <= ?"));
            params.push(Value::Integer(max));
        }
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

fn player_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlayerRow> {
    Ok(PlayerRow {
        id: row.get(0)?,
        fotmob_id: row.get(1)?,
        name: row.get(2)?,
        position: row.get(3)?,
        country: row.get(4)?,
        shirt_number: row.get(5)?,
        age: row.get(6)?,
        height: row.get(7)?,
        market_value: row.get(8)?,
        preferred_foot: row.get(9)?,
        club_id: row.get(10)?,
        club: row.get(11)?,
        league_id: row.get(12)?,
        league: row.get(13)?,
    })
}

impl Store {
    /// Players matching `filter`, ordered by name.
    pub fn query_players(&self, filter: &PlayerFilter) -> Result<Vec<PlayerRow>, StoreError> {
        let conn = self.lock()?;
        let mut params = Vec::new();
        let sql = format!(
            "SELECT {PLAYER_COLUMNS} {PLAYER_JOINS} {} ORDER BY p.name, p.id",
            where_clause(filter, &mut params)
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), player_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// `(x, y)` pairs for players matching `filter` that have both values
    /// recorded and non-negative.
    pub fn scatter(
        &self,
        filter: &PlayerFilter,
        x: DataField,
        y: DataField,
    ) -> Result<Vec<ScatterPoint>, StoreError> {
        let conn = self.lock()?;
        let mut params = Vec::new();
        let mut clause = where_clause(filter, &mut params);
        let axes = format!(
            "d.{x} IS NOT NULL AND d.{y} IS NOT NULL AND d.{x} >= 0 AND d.{y} >= 0",
            x = x.key(),
            y = y.key()
        );
        clause = if clause.is_empty() {
            format!("WHERE {axes}")
        } else {
            format!("{clause} AND {axes}")
        };
        let sql = format!(
            "SELECT {PLAYER_COLUMNS}, d.{}, d.{} {PLAYER_JOINS}
             JOIN data d ON d.player_id = p.id
             {clause} ORDER BY p.name, p.id",
            x.key(),
            y.key()
        );
        let mut stmt = conn.prepare(&sql)?;
        let points = stmt
            .query_map(rusqlite::params_from_iter(params), |row| {
                Ok(ScatterPoint {
                    player: player_row(row)?,
                    x: row.get(14)?,
                    y: row.get(15)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(points)
    }

    /// Every league, by name.
    pub fn leagues(&self) -> Result<Vec<League>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, country FROM leagues ORDER BY name, id")?;
        let leagues = stmt
            .query_map([], |row| {
                Ok(League {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    country: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(leagues)
    }

    /// Every club with its league, by club name then league name.
    pub fn clubs(&self) -> Result<Vec<ClubChoice>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, l.id, l.name FROM clubs c
             JOIN leagues l ON l.id = c.league_id
             ORDER BY c.name, l.name, c.id",
        )?;
        let clubs = stmt
            .query_map([], |row| {
                Ok(ClubChoice {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    league_id: row.get(2)?,
                    league: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(clubs)
    }

    /// Distinct player countries, sorted.
    pub fn distinct_countries(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT country FROM players
             WHERE country IS NOT NULL AND country != '' ORDER BY country",
        )?;
        let countries = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(countries)
    }

    /// First listed position of every player, de-duplicated and sorted.
    pub fn primary_positions(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT position FROM players WHERE position != ''")?;
        let raw = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let mut positions: Vec<String> = raw
            .iter()
            .filter_map(|p| p.split(',').next())
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        positions.sort();
        positions.dedup();
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlayerFields, PlayerStats, StatValue};

    fn seed() -> (Store, i64, i64) {
        let store = Store::open_in_memory().unwrap();
        let (l1, _) = store.get_or_create_league("Ligue 1").unwrap();
        let (l2, _) = store.get_or_create_league("Ligue 2").unwrap();
        let (nantes1, _) = store.get_or_create_club("Nantes", &l1).unwrap();
        let (nantes2, _) = store.get_or_create_club("Nantes", &l2).unwrap();

        let players = [
            (1, "Alban", nantes1.id, "ST, LW", "France", 24, 180, 12_000_000),
            (2, "Bruno", nantes2.id, "CB", "Brazil", 31, 188, 2_000_000),
            (3, "Carlos", nantes1.id, "GK", "Brazil", 28, 192, 5_000_000),
        ];
        for (id, name, club, pos, country, age, height, value) in players {
            store
                .upsert_player(
                    id,
                    &PlayerFields {
                        name: name.to_string(),
                        club_id: Some(club),
                        position: pos.to_string(),
                        country: Some(country.to_string()),
                        shirt_number: None,
                        age: Some(age),
                        height: Some(height),
                        market_value: Some(value),
                        preferred_foot: None,
                    },
                )
                .unwrap();
        }
        (store, l1.id, l2.id)
    }

    #[test]
    fn test_filter_by_league_excludes_same_named_club() {
        let (store, l1, l2) = seed();
        let filter = PlayerFilter {
            league_ids: vec![l1],
            ..PlayerFilter::default()
        };
        let names: Vec<_> = store
            .query_players(&filter)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Alban", "Carlos"]);

        let filter = PlayerFilter {
            league_ids: vec![l2],
            ..PlayerFilter::default()
        };
        let rows = store.query_players(&filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].league.as_deref(), Some("Ligue 2"));
        assert_eq!(rows[0].club.as_deref(), Some("Nantes"));
    }

    #[test]
    fn test_filter_position_and_ranges() {
        let (store, _, _) = seed();
        let filter = PlayerFilter {
            positions: vec!["st".to_string(), "gk".to_string()],
            ..PlayerFilter::default()
        };
        assert_eq!(store.query_players(&filter).unwrap().len(), 2);

        let filter = PlayerFilter {
            countries: vec!["Brazil".to_string()],
            age: Range::new(Some(30), None),
            ..PlayerFilter::default()
        };
        let rows = store.query_players(&filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Bruno");

        let filter = PlayerFilter {
            height: Range::new(Some(185), Some(190)),
            market_value: Range::new(None, Some(3_000_000)),
            ..PlayerFilter::default()
        };
        assert_eq!(store.query_players(&filter).unwrap()[0].name, "Bruno");
    }

    #[test]
    fn test_scatter_skips_missing_and_negative() {
        let (store, _, _) = seed();
        let stats = |xg: Option<f64>, goals: i64| {
            let mut s = PlayerStats::new();
            if let Some(v) = xg {
                s.set(DataField::ExpectedGoals, StatValue::Float(v));
            }
            s.set(DataField::Goals, StatValue::Int(goals));
            s
        };
        let p1 = store.get_player(1).unwrap().unwrap();
        let p2 = store.get_player(2).unwrap().unwrap();
        let p3 = store.get_player(3).unwrap().unwrap();
        store.upsert_data(&p1, &stats(Some(8.4), 10)).unwrap();
        store.upsert_data(&p2, &stats(None, 1)).unwrap();
        store.upsert_data(&p3, &stats(Some(-0.5), 0)).unwrap();

        let points = store
            .scatter(&PlayerFilter::default(), DataField::ExpectedGoals, DataField::Goals)
            .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].player.name, "Alban");
        assert_eq!((points[0].x, points[0].y), (8.4, 10.0));
    }

    #[test]
    fn test_filter_choices() {
        let (store, l1, l2) = seed();
        assert_eq!(store.distinct_countries().unwrap(), vec!["Brazil", "France"]);
        assert_eq!(store.primary_positions().unwrap(), vec!["CB", "GK", "ST"]);

        let league = store.get_or_create_league("Bundesliga").unwrap().0;
        store.get_or_create_club("Augsburg", &league).unwrap();

        let leagues: Vec<_> = store.leagues().unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(leagues, vec!["Bundesliga", "Ligue 1", "Ligue 2"]);

        let clubs: Vec<_> = store
            .clubs()
            .unwrap()
            .into_iter()
            .map(|c| (c.name, c.league_id, c.league))
            .collect();
        assert_eq!(
            clubs,
            vec![
                ("Augsburg".to_string(), league.id, "Bundesliga".to_string()),
                ("Nantes".to_string(), l1, "Ligue 1".to_string()),
                ("Nantes".to_string(), l2, "Ligue 2".to_string()),
            ]
        );
    }
}
