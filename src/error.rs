use thiserror::Error;

use crate::event::{PlayerId, SideCode};

/// Failures that abort a whole design-matrix construction.
///
/// Every per-event variant names the offending `event_id` so the record can be
/// corrected in the upstream store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesignError {
    #[error(
        "event {event_id}: scoring side {scoring} is neither home side {home} nor away side {away}"
    )]
    MalformedEvent {
        event_id: i64,
        scoring: SideCode,
        home: SideCode,
        away: SideCode,
    },
    #[error("event {event_id}: side {side} listed as both home and away")]
    SelfPlay { event_id: i64, side: SideCode },
    #[error("empty event batch")]
    EmptyBatch,
    #[error("event {event_id}: player {player} appears on both rosters")]
    RosterAmbiguity { event_id: i64, player: PlayerId },
    #[error("event {event_id}: side {side} has no column in the side universe")]
    UnknownSide { event_id: i64, side: SideCode },
    #[error("event {event_id}: player {player} has no column in the player universe")]
    UnknownPlayer { event_id: i64, player: PlayerId },
}

impl DesignError {
    pub fn event_id(&self) -> Option<i64> {
        match self {
            Self::MalformedEvent { event_id, .. }
            | Self::SelfPlay { event_id, .. }
            | Self::RosterAmbiguity { event_id, .. }
            | Self::UnknownSide { event_id, .. }
            | Self::UnknownPlayer { event_id, .. } => Some(*event_id),
            Self::EmptyBatch => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DesignError>;
