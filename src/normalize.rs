use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::columns::{ColumnIndex, ColumnOrder};
use crate::error::{DesignError, Result};
use crate::event::{PlayerId, RawEvent, SideCode, present_players};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyBatchPolicy {
    #[default]
    Reject,
    AllowEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideUniverse {
    /// Only sides seen as home side get a column; an away-only side is an
    /// `UnknownSide` error at build time.
    Home,
    /// Home sides first, then sides only ever seen away.
    #[default]
    HomeThenAway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizeOptions {
    pub empty_batch: EmptyBatchPolicy,
    pub column_order: ColumnOrder,
    pub side_universe: SideUniverse,
}

/// Events in row order plus the frozen side and player universes.
#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    events: Vec<RawEvent>,
    sides: ColumnIndex<SideCode>,
    players: ColumnIndex<PlayerId>,
}

impl NormalizedBatch {
    /// Assembles a batch from events already in row order and externally
    /// supplied universes.
    pub fn from_parts(
        events: Vec<RawEvent>,
        sides: ColumnIndex<SideCode>,
        players: ColumnIndex<PlayerId>,
    ) -> Self {
        Self {
            events,
            sides,
            players,
        }
    }

    pub fn events(&self) -> &[RawEvent] {
        &self.events
    }

    pub fn sides(&self) -> &ColumnIndex<SideCode> {
        &self.sides
    }

    pub fn players(&self) -> &ColumnIndex<PlayerId> {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn event_ids(&self) -> Vec<i64> {
        self.events.iter().map(|e| e.event_id).collect()
    }
}

/// Validates, orders and scans a raw batch.
///
/// Events are sorted ascending by `event_id`; the sort is stable so duplicate
/// ids keep their input order. Universes are discovered over the sorted events.
pub fn normalize(mut events: Vec<RawEvent>, opts: NormalizeOptions) -> Result<NormalizedBatch> {
    debug!(?opts, input = events.len(), "normalizing event batch");
    if events.is_empty() {
        return match opts.empty_batch {
            EmptyBatchPolicy::Reject => Err(DesignError::EmptyBatch),
            EmptyBatchPolicy::AllowEmpty => Ok(NormalizedBatch::from_parts(
                events,
                ColumnIndex::default(),
                ColumnIndex::default(),
            )),
        };
    }

    events.sort_by_key(|e| e.event_id);

    if let Some(event) = events.iter().find(|e| !e.scoring_side_is_listed()) {
        return Err(DesignError::MalformedEvent {
            event_id: event.event_id,
            scoring: event.scoring_side.clone(),
            home: event.home_side.clone(),
            away: event.away_side.clone(),
        });
    }

    let sides = discover_sides(&events, opts);
    let players = discover_players(&events, opts.column_order);
    info!(
        events = events.len(),
        sides = sides.len(),
        players = players.len(),
        "normalized event batch"
    );
    Ok(NormalizedBatch::from_parts(events, sides, players))
}

pub fn discover_sides(events: &[RawEvent], opts: NormalizeOptions) -> ColumnIndex<SideCode> {
    let home = events.iter().map(|e| e.home_side.clone());
    match opts.side_universe {
        SideUniverse::Home => ColumnIndex::discover(home, opts.column_order),
        SideUniverse::HomeThenAway => {
            let away = events.iter().map(|e| e.away_side.clone());
            ColumnIndex::discover(home.chain(away), opts.column_order)
        }
    }
}

/// Scans each event's away slots before its home slots.
pub fn discover_players(events: &[RawEvent], order: ColumnOrder) -> ColumnIndex<PlayerId> {
    let slots = events.iter().flat_map(|e| {
        present_players(&e.away_roster).chain(present_players(&e.home_roster))
    });
    ColumnIndex::discover(slots, order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::roster_from_ids;

    fn event(id: i64, scoring: &str, home: &str, away: &str, base: u64) -> RawEvent {
        RawEvent {
            event_id: id,
            scoring_side: scoring.into(),
            home_side: home.into(),
            away_side: away.into(),
            home_roster: roster_from_ids(&[
                base,
                base + 1,
                base + 2,
                base + 3,
                base + 4,
                base + 5,
            ]),
            away_roster: roster_from_ids(&[base + 10, base + 11, base + 12]),
        }
    }

    #[test]
    fn sorts_by_event_id() {
        let batch = normalize(
            vec![
                event(3, "A", "A", "B", 0),
                event(1, "B", "A", "B", 0),
                event(2, "C", "C", "A", 0),
            ],
            NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(batch.event_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_ids_keep_input_order() {
        let batch = normalize(
            vec![event(5, "A", "A", "B", 100), event(5, "C", "C", "D", 200)],
            NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(batch.events()[0].home_side.as_str(), "A");
        assert_eq!(batch.events()[1].home_side.as_str(), "C");
    }

    #[test]
    fn away_only_sides_get_columns_by_default() {
        let batch = normalize(
            vec![event(1, "A", "A", "B", 0), event(2, "C", "C", "A", 0)],
            NormalizeOptions::default(),
        )
        .unwrap();
        let labels: Vec<&str> = batch.sides().labels().iter().map(|s| s.as_str()).collect();
        assert_eq!(labels, vec!["A", "C", "B"]);
    }

    #[test]
    fn strict_side_universe_uses_home_sides_only() {
        let opts = NormalizeOptions {
            side_universe: SideUniverse::Home,
            ..Default::default()
        };
        let batch = normalize(vec![event(1, "A", "A", "B", 0), event(2, "C", "C", "B", 0)], opts)
            .unwrap();
        assert_eq!(batch.sides().labels(), &[SideCode::from("A"), SideCode::from("C")]);
        assert!(!batch.sides().contains(&"B".into()));
    }

    #[test]
    fn player_universe_skips_empty_slots() {
        let batch =
            normalize(vec![event(1, "A", "A", "B", 0)], NormalizeOptions::default()).unwrap();
        assert_eq!(batch.players().len(), 9);
        assert_eq!(batch.players().column(&PlayerId(10)), Some(0));
        assert_eq!(batch.players().column(&PlayerId(0)), Some(3));
    }

    #[test]
    fn malformed_scoring_side_names_event() {
        let err = normalize(
            vec![event(1, "A", "A", "B", 0), event(9, "Z", "A", "B", 0)],
            NormalizeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DesignError::MalformedEvent { event_id: 9, .. }));
    }

    #[test]
    fn first_malformed_event_in_row_order_is_reported() {
        let batch = vec![
            event(9, "Z", "A", "B", 0),
            event(1, "A", "A", "B", 0),
            event(4, "Y", "A", "B", 0),
        ];
        let err = normalize(batch, NormalizeOptions::default()).unwrap_err();
        assert_eq!(err.event_id(), Some(4));
    }

    #[test]
    fn empty_batch_follows_policy() {
        assert_eq!(
            normalize(Vec::new(), NormalizeOptions::default()).unwrap_err(),
            DesignError::EmptyBatch
        );
        let opts = NormalizeOptions {
            empty_batch: EmptyBatchPolicy::AllowEmpty,
            ..Default::default()
        };
        let batch = normalize(Vec::new(), opts).unwrap();
        assert!(batch.is_empty());
        assert!(batch.sides().is_empty());
        assert!(batch.players().is_empty());
    }
}
