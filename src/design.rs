use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::columns::ColumnIndex;
use crate::error::{DesignError, Result};
use crate::event::{PlayerId, ROSTER_SLOTS, RawEvent, SideCode, present_players};
use crate::normalize::NormalizedBatch;
use crate::sparse::{CsrBuilder, SignedCsrMatrix};

pub const HOME_SIGN: i8 = 1;
pub const AWAY_SIGN: i8 = -1;

/// Resolution for a player listed on both rosters of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterConflictPolicy {
    /// Abort the batch with `RosterAmbiguity`.
    #[default]
    Reject,
    /// Home assignment first, then away; the player ends at -1.
    AwayOverwrites,
    /// +1 and -1 cancel; no entry is stored.
    NetZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildOptions {
    pub roster_conflict: RosterConflictPolicy,
    /// Encode rows on the current rayon pool.
    pub parallel: bool,
}

/// Response vector and signed indicator matrices for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignMatrices {
    pub event_ids: Vec<i64>,
    pub response: Vec<i8>,
    pub side_labels: Vec<SideCode>,
    pub player_labels: Vec<PlayerId>,
    pub sides: SignedCsrMatrix,
    pub players: SignedCsrMatrix,
}

impl DesignMatrices {
    pub fn rows(&self) -> usize {
        self.response.len()
    }

    /// Home-side goals minus away-side goals over the whole batch.
    pub fn response_balance(&self) -> i64 {
        self.response.iter().map(|v| i64::from(*v)).sum()
    }
}

/// One encoded event. Player entries are ascending by column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRow {
    pub response: i8,
    pub side_entries: [(usize, i8); 2],
    pub player_entries: Vec<(usize, i8)>,
    pub conflicts: usize,
}

pub fn build_design(batch: &NormalizedBatch, opts: BuildOptions) -> Result<DesignMatrices> {
    debug!(?opts, rows = batch.len(), "building design matrices");
    let sides = batch.sides();
    let players = batch.players();
    let policy = opts.roster_conflict;

    let encoded = if opts.parallel {
        // Collect every outcome so the reported error is the first in row order.
        let results: Vec<Result<EncodedRow>> = batch
            .events()
            .par_iter()
            .map(|event| encode_event(event, sides, players, policy))
            .collect();
        results.into_iter().collect::<Result<Vec<_>>>()?
    } else {
        batch
            .events()
            .iter()
            .map(|event| encode_event(event, sides, players, policy))
            .collect::<Result<Vec<_>>>()?
    };

    let n = encoded.len();
    let player_nnz = encoded.iter().map(|r| r.player_entries.len()).sum();
    let mut response = Vec::with_capacity(n);
    let mut side_rows = CsrBuilder::with_capacity(sides.len(), n, 2 * n);
    let mut player_rows = CsrBuilder::with_capacity(players.len(), n, player_nnz);
    let mut conflicts = 0usize;
    for row in &encoded {
        response.push(row.response);
        side_rows.push_row(&row.side_entries);
        player_rows.push_row(&row.player_entries);
        conflicts += row.conflicts;
    }
    if conflicts > 0 {
        warn!(
            conflicts,
            policy = ?policy,
            "resolved players listed on both rosters"
        );
    }

    let design = DesignMatrices {
        event_ids: batch.event_ids(),
        response,
        side_labels: sides.labels().to_vec(),
        player_labels: players.labels().to_vec(),
        sides: side_rows.finish(),
        players: player_rows.finish(),
    };
    info!(
        rows = design.rows(),
        side_cols = design.sides.ncols(),
        player_cols = design.players.ncols(),
        player_nnz = design.players.nnz(),
        "design matrices built"
    );
    Ok(design)
}

/// Encodes a single event against frozen universes.
pub fn encode_event(
    event: &RawEvent,
    sides: &ColumnIndex<SideCode>,
    players: &ColumnIndex<PlayerId>,
    policy: RosterConflictPolicy,
) -> Result<EncodedRow> {
    let response = if event.home_scored() {
        HOME_SIGN
    } else {
        AWAY_SIGN
    };
    let side_entries = side_row(event, sides)?;
    let (player_entries, conflicts) = player_row(event, players, policy)?;
    Ok(EncodedRow {
        response,
        side_entries,
        player_entries,
        conflicts,
    })
}

fn side_row(event: &RawEvent, sides: &ColumnIndex<SideCode>) -> Result<[(usize, i8); 2]> {
    if event.home_side == event.away_side {
        return Err(DesignError::SelfPlay {
            event_id: event.event_id,
            side: event.home_side.clone(),
        });
    }
    let column = |side: &SideCode| {
        sides.column(side).ok_or_else(|| DesignError::UnknownSide {
            event_id: event.event_id,
            side: side.clone(),
        })
    };
    let home = (column(&event.home_side)?, HOME_SIGN);
    let away = (column(&event.away_side)?, AWAY_SIGN);
    Ok(if home.0 < away.0 {
        [home, away]
    } else {
        [away, home]
    })
}

fn player_row(
    event: &RawEvent,
    players: &ColumnIndex<PlayerId>,
    policy: RosterConflictPolicy,
) -> Result<(Vec<(usize, i8)>, usize)> {
    let column = |player: PlayerId| {
        players
            .column(&player)
            .ok_or(DesignError::UnknownPlayer {
                event_id: event.event_id,
                player,
            })
    };

    let mut raw = Vec::with_capacity(2 * ROSTER_SLOTS);
    for player in present_players(&event.home_roster) {
        raw.push((column(player)?, HOME_SIGN, player));
    }
    for player in present_players(&event.away_roster) {
        raw.push((column(player)?, AWAY_SIGN, player));
    }
    // Stable: within one column, home assignments stay ahead of away ones.
    raw.sort_by_key(|(col, _, _)| *col);

    let mut out = Vec::with_capacity(raw.len());
    let mut conflicts = 0usize;
    let mut i = 0;
    while i < raw.len() {
        let col = raw[i].0;
        let mut j = i;
        while j < raw.len() && raw[j].0 == col {
            j += 1;
        }
        let run = &raw[i..j];
        let first = run[0].1;
        let last = run[run.len() - 1].1;
        if first == last {
            // Repeated in one roster: assigned once.
            out.push((col, first));
        } else {
            conflicts += 1;
            match policy {
                RosterConflictPolicy::Reject => {
                    return Err(DesignError::RosterAmbiguity {
                        event_id: event.event_id,
                        player: run[0].2,
                    });
                }
                RosterConflictPolicy::AwayOverwrites => out.push((col, last)),
                RosterConflictPolicy::NetZero => {}
            }
        }
        i = j;
    }
    Ok((out, conflicts))
}
