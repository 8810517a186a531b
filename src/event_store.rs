use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, Row, params};
use tracing::{debug, info};

use crate::event::{GOAL_EVENT_KIND, PlayerId, ROSTER_SLOTS, RawEvent, Roster, SideCode, Strength};

const DB_DIR: &str = "rapm_design";
const DB_FILE: &str = "game_events.sqlite";

/// Upstream provider of raw scoring events for one manpower situation.
pub trait EventSource {
    fn fetch_events(&self, strength: Strength) -> Result<Vec<RawEvent>>;
}

/// `game_events` table in a sqlite database.
pub struct SqliteEventStore {
    conn: Connection,
}

#[derive(Debug, Clone)]
pub struct InsertSummary {
    pub strength: Strength,
    pub kind: String,
    pub upserted: usize,
}

impl SqliteEventStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Upserts `events` under one strength and kind in a single transaction.
    pub fn insert_events(
        &mut self,
        strength: Strength,
        kind: &str,
        events: &[RawEvent],
    ) -> Result<InsertSummary> {
        let tx = self.conn.transaction().context("begin insert transaction")?;
        let strength_key = strength.to_string();
        let updated_at = Utc::now().to_rfc3339();
        for event in events {
            upsert_event(&tx, &strength_key, kind, &updated_at, event)
                .with_context(|| format!("upsert event {}", event.event_id))?;
        }
        tx.commit().context("commit insert transaction")?;
        info!(%strength, kind, upserted = events.len(), "stored game events");
        Ok(InsertSummary {
            strength,
            kind: kind.to_string(),
            upserted: events.len(),
        })
    }

    /// Goal events recorded at `strength`, in whatever order sqlite returns them.
    pub fn load_events(&self, strength: Strength) -> Result<Vec<RawEvent>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT
                    event_id, scoring_team, home_team, away_team,
                    home_p1, home_p2, home_p3, home_p4, home_p5, home_p6,
                    away_p1, away_p2, away_p3, away_p4, away_p5, away_p6
                FROM game_events
                WHERE strength = ?1
                  AND event_kind = ?2
                "#,
            )
            .context("prepare load events query")?;

        let rows = stmt
            .query_map(params![strength.to_string(), GOAL_EVENT_KIND], decode_event)
            .context("query load events")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode event row")?);
        }
        debug!(%strength, events = out.len(), "loaded goal events");
        Ok(out)
    }

    pub fn count_events(&self) -> Result<usize> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM game_events", [], |row| {
                row.get::<_, i64>(0)
            })
            .context("count game events")?;
        usize::try_from(n).map_err(|_| anyhow!("negative event count {n}"))
    }
}

impl EventSource for SqliteEventStore {
    fn fetch_events(&self, strength: Strength) -> Result<Vec<RawEvent>> {
        self.load_events(strength)
    }
}

pub fn default_db_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(DB_DIR).join(DB_FILE));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(DB_DIR)
            .join(DB_FILE),
    )
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS game_events (
            event_id INTEGER PRIMARY KEY,
            strength TEXT NOT NULL,
            event_kind TEXT NOT NULL,
            scoring_team TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            home_p1 INTEGER NULL,
            home_p2 INTEGER NULL,
            home_p3 INTEGER NULL,
            home_p4 INTEGER NULL,
            home_p5 INTEGER NULL,
            home_p6 INTEGER NULL,
            away_p1 INTEGER NULL,
            away_p2 INTEGER NULL,
            away_p3 INTEGER NULL,
            away_p4 INTEGER NULL,
            away_p5 INTEGER NULL,
            away_p6 INTEGER NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_game_events_situation ON game_events(strength, event_kind);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

fn upsert_event(
    tx: &rusqlite::Transaction<'_>,
    strength: &str,
    kind: &str,
    updated_at: &str,
    e: &RawEvent,
) -> Result<()> {
    let h = roster_values(&e.home_roster)?;
    let a = roster_values(&e.away_roster)?;
    tx.execute(
        r#"
        INSERT INTO game_events (
            event_id, strength, event_kind, scoring_team, home_team, away_team,
            home_p1, home_p2, home_p3, home_p4, home_p5, home_p6,
            away_p1, away_p2, away_p3, away_p4, away_p5, away_p6,
            updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16, ?17, ?18,
            ?19
        )
        ON CONFLICT(event_id) DO UPDATE SET
            strength = excluded.strength,
            event_kind = excluded.event_kind,
            scoring_team = excluded.scoring_team,
            home_team = excluded.home_team,
            away_team = excluded.away_team,
            home_p1 = excluded.home_p1,
            home_p2 = excluded.home_p2,
            home_p3 = excluded.home_p3,
            home_p4 = excluded.home_p4,
            home_p5 = excluded.home_p5,
            home_p6 = excluded.home_p6,
            away_p1 = excluded.away_p1,
            away_p2 = excluded.away_p2,
            away_p3 = excluded.away_p3,
            away_p4 = excluded.away_p4,
            away_p5 = excluded.away_p5,
            away_p6 = excluded.away_p6,
            updated_at = excluded.updated_at
        "#,
        params![
            e.event_id,
            strength,
            kind,
            e.scoring_side.as_str(),
            e.home_side.as_str(),
            e.away_side.as_str(),
            h[0],
            h[1],
            h[2],
            h[3],
            h[4],
            h[5],
            a[0],
            a[1],
            a[2],
            a[3],
            a[4],
            a[5],
            updated_at,
        ],
    )
    .context("upsert game event")?;
    Ok(())
}

fn roster_values(roster: &Roster) -> Result<[Option<i64>; ROSTER_SLOTS]> {
    let mut out = [None; ROSTER_SLOTS];
    for (slot, player) in out.iter_mut().zip(roster) {
        if let Some(PlayerId(id)) = player {
            let value = i64::try_from(*id).map_err(|_| anyhow!("player id {id} out of range"))?;
            *slot = Some(value);
        }
    }
    Ok(out)
}

fn decode_event(row: &Row<'_>) -> rusqlite::Result<RawEvent> {
    let mut home_roster: Roster = [None; ROSTER_SLOTS];
    let mut away_roster: Roster = [None; ROSTER_SLOTS];
    for (idx, slot) in home_roster.iter_mut().enumerate() {
        *slot = row.get::<_, Option<u64>>(4 + idx)?.map(PlayerId);
    }
    for (idx, slot) in away_roster.iter_mut().enumerate() {
        *slot = row.get::<_, Option<u64>>(4 + ROSTER_SLOTS + idx)?.map(PlayerId);
    }
    Ok(RawEvent {
        event_id: row.get(0)?,
        scoring_side: SideCode(row.get(1)?),
        home_side: SideCode(row.get(2)?),
        away_side: SideCode(row.get(3)?),
        home_roster,
        away_roster,
    })
}
