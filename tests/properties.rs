use proptest::prelude::*;

use rapm_design::event::ROSTER_SLOTS;
use rapm_design::{
    BuildOptions, DesignMatrices, NormalizeOptions, PlayerId, RawEvent, Roster, SideCode,
    build_design, normalize,
};

const SIDES: [&str; 5] = ["BOS", "MTL", "NYR", "TOR", "VAN"];

fn event_strategy() -> impl Strategy<Value = RawEvent> {
    (
        0usize..SIDES.len(),
        1usize..SIDES.len(),
        any::<bool>(),
        proptest::sample::subsequence((1..=80u64).collect::<Vec<_>>(), 2 * ROSTER_SLOTS),
        proptest::collection::vec(any::<bool>(), 2 * ROSTER_SLOTS),
    )
        .prop_map(|(home, offset, home_scored, ids, filled)| {
            let away = (home + offset) % SIDES.len();
            let mut home_roster: Roster = [None; ROSTER_SLOTS];
            let mut away_roster: Roster = [None; ROSTER_SLOTS];
            for slot in 0..ROSTER_SLOTS {
                if filled[slot] {
                    home_roster[slot] = Some(PlayerId(ids[slot]));
                }
                if filled[ROSTER_SLOTS + slot] {
                    away_roster[slot] = Some(PlayerId(ids[ROSTER_SLOTS + slot]));
                }
            }
            let scoring = if home_scored { home } else { away };
            RawEvent {
                event_id: 0,
                scoring_side: SIDES[scoring].into(),
                home_side: SIDES[home].into(),
                away_side: SIDES[away].into(),
                home_roster,
                away_roster,
            }
        })
}

fn batch_strategy() -> impl Strategy<Value = Vec<RawEvent>> {
    proptest::collection::vec(event_strategy(), 1..40).prop_map(|mut events| {
        for (i, e) in events.iter_mut().enumerate() {
            e.event_id = (i as i64) * 3 + 1;
        }
        events
    })
}

fn build(events: Vec<RawEvent>) -> DesignMatrices {
    let batch = normalize(events, NormalizeOptions::default()).expect("normalize");
    build_design(&batch, BuildOptions::default()).expect("build")
}

fn side_col(design: &DesignMatrices, side: &SideCode) -> usize {
    design
        .side_labels
        .iter()
        .position(|s| s == side)
        .expect("side column")
}

fn player_col(design: &DesignMatrices, player: PlayerId) -> usize {
    design
        .player_labels
        .iter()
        .position(|p| *p == player)
        .expect("player column")
}

proptest! {
    #[test]
    fn prop_response_is_signed(events in batch_strategy()) {
        let design = build(events.clone());
        prop_assert_eq!(design.rows(), events.len());
        prop_assert!(design.response.iter().all(|v| *v == 1 || *v == -1));
    }

    #[test]
    fn prop_side_rows_are_balanced_pairs(events in batch_strategy()) {
        let mut sorted = events.clone();
        sorted.sort_by_key(|e| e.event_id);
        let design = build(events);
        for (row, e) in sorted.iter().enumerate() {
            prop_assert_eq!(design.sides.row_nnz(row), 2);
            prop_assert_eq!(design.sides.row_sum(row), 0);
            prop_assert_eq!(design.sides.get(row, side_col(&design, &e.home_side)), 1);
            prop_assert_eq!(design.sides.get(row, side_col(&design, &e.away_side)), -1);
        }
    }

    #[test]
    fn prop_player_rows_match_rosters(events in batch_strategy()) {
        let mut sorted = events.clone();
        sorted.sort_by_key(|e| e.event_id);
        let design = build(events);
        for (row, e) in sorted.iter().enumerate() {
            let home = e.home_roster.iter().flatten().count();
            let away = e.away_roster.iter().flatten().count();
            let plus = design.players.row(row).filter(|(_, v)| *v == 1).count();
            let minus = design.players.row(row).filter(|(_, v)| *v == -1).count();
            prop_assert!(plus <= ROSTER_SLOTS && minus <= ROSTER_SLOTS);
            prop_assert_eq!(plus, home);
            prop_assert_eq!(minus, away);
            prop_assert_eq!(design.players.row_sum(row), plus as i32 - minus as i32);
            for p in e.home_roster.iter().flatten() {
                prop_assert_eq!(design.players.get(row, player_col(&design, *p)), 1);
            }
            for p in e.away_roster.iter().flatten() {
                prop_assert_eq!(design.players.get(row, player_col(&design, *p)), -1);
            }
        }
    }

    #[test]
    fn prop_physical_order_does_not_matter(
        (events, shuffled) in batch_strategy()
            .prop_flat_map(|events| (Just(events.clone()), Just(events).prop_shuffle()))
    ) {
        prop_assert_eq!(build(events), build(shuffled));
    }

    #[test]
    fn prop_storage_is_linear_in_rows(events in batch_strategy()) {
        let n = events.len();
        let design = build(events);
        prop_assert_eq!(design.sides.nnz(), 2 * n);
        prop_assert!(design.players.nnz() <= 2 * ROSTER_SLOTS * n);
        prop_assert_eq!(design.players.row_ptr().len(), n + 1);
    }
}
