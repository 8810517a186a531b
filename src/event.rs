use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROSTER_SLOTS: usize = 6;

pub const GOAL_EVENT_KIND: &str = "GOAL";

/// Team code of one competing side (e.g. "TOR").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SideCode(pub String);

impl SideCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SideCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SideCode {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// On-field personnel of one side. `None` marks an empty slot (short-handed play).
pub type Roster = [Option<PlayerId>; ROSTER_SLOTS];

pub fn roster_from_ids(ids: &[u64]) -> Roster {
    let mut roster: Roster = [None; ROSTER_SLOTS];
    for (slot, id) in roster.iter_mut().zip(ids) {
        *slot = Some(PlayerId(*id));
    }
    roster
}

pub fn present_players(roster: &Roster) -> impl Iterator<Item = PlayerId> + '_ {
    roster.iter().flatten().copied()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub event_id: i64,
    pub scoring_side: SideCode,
    pub home_side: SideCode,
    pub away_side: SideCode,
    pub home_roster: Roster,
    pub away_roster: Roster,
}

impl RawEvent {
    pub fn home_scored(&self) -> bool {
        self.scoring_side == self.home_side
    }

    pub fn scoring_side_is_listed(&self) -> bool {
        self.scoring_side == self.home_side || self.scoring_side == self.away_side
    }
}

/// Manpower situation selector, home side first ("5v5", "5v4", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Strength {
    pub home_skaters: u8,
    pub away_skaters: u8,
}

impl Strength {
    pub const EVEN: Strength = Strength {
        home_skaters: 5,
        away_skaters: 5,
    };
}

impl Default for Strength {
    fn default() -> Self {
        Self::EVEN
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.home_skaters, self.away_skaters)
    }
}

impl FromStr for Strength {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        let trimmed = raw.trim();
        let Some((home, away)) = trimmed.split_once(['v', 'V', 'x', 'X']) else {
            return Err(anyhow::anyhow!("invalid strength selector {trimmed:?}"));
        };
        let home_skaters = home
            .trim()
            .parse::<u8>()
            .map_err(|_| anyhow::anyhow!("invalid home skater count in {trimmed:?}"))?;
        let away_skaters = away
            .trim()
            .parse::<u8>()
            .map_err(|_| anyhow::anyhow!("invalid away skater count in {trimmed:?}"))?;
        Ok(Self {
            home_skaters,
            away_skaters,
        })
    }
}
