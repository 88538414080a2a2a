//! SQLite persistence for leagues, clubs, players and their statistics.
//!
//! The store owns its connection behind a single mutex. Every write runs its
//! whole read-check-write sequence inside that one critical section, so
//! concurrent workers can never race a get-or-create into duplicate rows.

pub mod query;

use crate::error::StoreError;
use crate::model::{Club, Data, DataField, League, Player, PlayerFields, PlayerStats, StatValue};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS leagues (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        country TEXT
    );

    CREATE TABLE IF NOT EXISTS clubs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        league_id INTEGER NOT NULL REFERENCES leagues(id) ON DELETE CASCADE,
        founded_year INTEGER,
        UNIQUE (name, league_id)
    );

    CREATE TABLE IF NOT EXISTS players (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        fotmob_id INTEGER NOT NULL UNIQUE,
        name TEXT NOT NULL,
        club_id INTEGER REFERENCES clubs(id) ON DELETE CASCADE,
        position TEXT NOT NULL DEFAULT '',
        country TEXT,
        shirt_number INTEGER,
        age INTEGER,
        height INTEGER,
        market_value INTEGER,
        preferred_foot TEXT,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_clubs_name ON clubs(name);
    CREATE INDEX IF NOT EXISTS idx_players_club ON players(club_id);
";

/// Row counts, reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StoreCounts {
    pub leagues: usize,
    pub clubs: usize,
    pub players: usize,
    pub data: usize,
}

/// The persistence boundary shared by every pipeline stage.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open or create a database file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Default location: `~/.footgraph/footgraph.db`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".footgraph")
            .join("footgraph.db")
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        conn.execute_batch(&data_table_ddl())?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Find a league by name, creating it on first sight.
    pub fn get_or_create_league(&self, name: &str) -> Result<(League, bool), StoreError> {
        let conn = self.lock()?;
        if let Some(league) = league_by_name(&conn, name)? {
            return Ok((league, false));
        }
        conn.execute("INSERT INTO leagues (name) VALUES (?1)", params![name])?;
        let league = League {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            country: None,
        };
        debug!("created league {name}");
        Ok((league, true))
    }

    /// Find a club by `(name, league)`, creating it on first sight.
    pub fn get_or_create_club(&self, name: &str, league: &League) -> Result<(Club, bool), StoreError> {
        let conn = self.lock()?;
        let existing = conn
            .query_row(
                "SELECT id, name, league_id, founded_year FROM clubs
                 WHERE name = ?1 AND league_id = ?2",
                params![name, league.id],
                club_from_row,
            )
            .optional()?;
        if let Some(club) = existing {
            return Ok((club, false));
        }
        conn.execute(
            "INSERT INTO clubs (name, league_id) VALUES (?1, ?2)",
            params![name, league.id],
        )?;
        let club = Club {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            league_id: league.id,
            founded_year: None,
        };
        debug!("created club {name} in {}", league.name);
        Ok((club, true))
    }

    /// First club registered under `name`, in any league.
    pub fn get_club_by_name(&self, name: &str) -> Result<Option<Club>, StoreError> {
        let conn = self.lock()?;
        let club = conn
            .query_row(
                "SELECT id, name, league_id, founded_year FROM clubs
                 WHERE name = ?1 ORDER BY id LIMIT 1",
                params![name],
                club_from_row,
            )
            .optional()?;
        Ok(club)
    }

    /// Insert or overwrite the player with this external id.
    pub fn upsert_player(&self, fotmob_id: i64, fields: &PlayerFields) -> Result<Player, StoreError> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO players
                (fotmob_id, name, club_id, position, country, shirt_number, age, height,
                 market_value, preferred_foot, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(fotmob_id) DO UPDATE SET
                name = excluded.name,
                club_id = excluded.club_id,
                position = excluded.position,
                country = excluded.country,
                shirt_number = excluded.shirt_number,
                age = excluded.age,
                height = excluded.height,
                market_value = excluded.market_value,
                preferred_foot = excluded.preferred_foot,
                updated_at = excluded.updated_at",
            params![
                fotmob_id,
                fields.name,
                fields.club_id,
                fields.position,
                fields.country,
                fields.shirt_number,
                fields.age,
                fields.height,
                fields.market_value,
                fields.preferred_foot,
                now,
            ],
        )?;
        player_by_fotmob_id(&conn, fotmob_id)?.ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Replace the player's statistics row. Fields absent from `stats` are
    /// written as NULL.
    pub fn upsert_data(&self, player: &Player, stats: &PlayerStats) -> Result<Data, StoreError> {
        let conn = self.lock()?;
        let mut values = Vec::with_capacity(DataField::ALL.len() + 1);
        values.push(Value::Integer(player.id));
        for field in DataField::ALL {
            values.push(match stats.get(*field).map(|v| v.for_kind(field.kind())) {
                Some(StatValue::Int(v)) => Value::Integer(v),
                Some(StatValue::Float(v)) => Value::Real(v),
                None => Value::Null,
            });
        }
        conn.execute(&data_upsert_sql(), rusqlite::params_from_iter(values))?;
        data_by_player(&conn, player.id)?.ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Look a player up by external id.
    pub fn get_player(&self, fotmob_id: i64) -> Result<Option<Player>, StoreError> {
        let conn = self.lock()?;
        player_by_fotmob_id(&conn, fotmob_id)
    }

    /// The statistics row of a player, if one was ever written.
    pub fn get_data(&self, player: &Player) -> Result<Option<Data>, StoreError> {
        let conn = self.lock()?;
        data_by_player(&conn, player.id)
    }

    pub fn counts(&self) -> Result<StoreCounts, StoreError> {
        let conn = self.lock()?;
        let count = |table: &str| -> Result<usize, StoreError> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
            Ok(n as usize)
        };
        Ok(StoreCounts {
            leagues: count("leagues")?,
            clubs: count("clubs")?,
            players: count("players")?,
            data: count("data")?,
        })
    }
}

fn data_table_ddl() -> String {
    let columns: Vec<String> = DataField::ALL
        .iter()
        .map(|f| format!("{} {}", f.key(), f.kind().sql_type()))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            player_id INTEGER NOT NULL UNIQUE REFERENCES players(id) ON DELETE CASCADE,
            {}
        );",
        columns.join(",\n            ")
    )
}

fn data_upsert_sql() -> String {
    let keys: Vec<&str> = DataField::ALL.iter().map(|f| f.key()).collect();
    let placeholders: Vec<String> = (2..=keys.len() + 1).map(|i| format!("?{i}")).collect();
    let updates: Vec<String> = keys.iter().map(|k| format!("{k} = excluded.{k}")).collect();
    format!(
        "INSERT INTO data (player_id, {}) VALUES (?1, {})
         ON CONFLICT(player_id) DO UPDATE SET {}",
        keys.join(", "),
        placeholders.join(", "),
        updates.join(", ")
    )
}

fn league_by_name(conn: &Connection, name: &str) -> Result<Option<League>, StoreError> {
    let league = conn
        .query_row(
            "SELECT id, name, country FROM leagues WHERE name = ?1",
            params![name],
            |row| {
                Ok(League {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    country: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(league)
}

fn club_from_row(row: &Row<'_>) -> rusqlite::Result<Club> {
    Ok(Club {
        id: row.get(0)?,
        name: row.get(1)?,
        league_id: row.get(2)?,
        founded_year: row.get(3)?,
    })
}

fn player_by_fotmob_id(conn: &Connection, fotmob_id: i64) -> Result<Option<Player>, StoreError> {
    let player = conn
        .query_row(
            "SELECT id, fotmob_id, name, club_id, position, country, shirt_number,
                    age, height, market_value, preferred_foot, updated_at
             FROM players WHERE fotmob_id = ?1",
            params![fotmob_id],
            |row| {
                Ok(Player {
                    id: row.get(0)?,
                    fotmob_id: row.get(1)?,
                    fields: PlayerFields {
                        name: row.get(2)?,
                        club_id: row.get(3)?,
                        position: row.get(4)?,
                        country: row.get(5)?,
                        shirt_number: row.get(6)?,
                        age: row.get(7)?,
                        height: row.get(8)?,
                        market_value: row.get(9)?,
                        preferred_foot: row.get(10)?,
                    },
                    updated_at: row.get(11)?,
                })
            },
        )
        .optional()?;
    Ok(player)
}

fn data_by_player(conn: &Connection, player_id: i64) -> Result<Option<Data>, StoreError> {
    let keys: Vec<&str> = DataField::ALL.iter().map(|f| f.key()).collect();
    let sql = format!(
        "SELECT id, player_id, {} FROM data WHERE player_id = ?1",
        keys.join(", ")
    );
    let data = conn
        .query_row(&sql, params![player_id], |row| {
            let mut stats = PlayerStats::new();
            for (i, field) in DataField::ALL.iter().enumerate() {
                let value = match row.get::<_, Value>(i + 2)? {
                    Value::Integer(v) => Some(StatValue::Int(v)),
                    Value::Real(v) => Some(StatValue::Float(v)),
                    _ => None,
                };
                if let Some(v) = value {
                    stats.set(*field, v.for_kind(field.kind()));
                }
            }
            Ok(Data {
                id: row.get(0)?,
                player_id: row.get(1)?,
                stats,
            })
        })
        .optional()?;
    Ok(data)
}
