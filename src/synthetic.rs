use rand::rngs::StdRng;
use rand::seq::{SliceRandom, index};
use rand::{Rng, SeedableRng};

use crate::event::{PlayerId, ROSTER_SLOTS, RawEvent, Roster, SideCode};

/// Seeded generator of well-formed scoring events.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticBatch {
    pub events: usize,
    pub sides: usize,
    pub players: usize,
    /// Probability that any single roster slot is left empty.
    pub empty_slot_rate: f64,
    pub seed: u64,
}

impl Default for SyntheticBatch {
    fn default() -> Self {
        Self {
            events: 1_000,
            sides: 32,
            players: 900,
            empty_slot_rate: 0.02,
            seed: 7,
        }
    }
}

impl SyntheticBatch {
    /// Events come back with shuffled ids, like an unordered store scan.
    /// Sides are clamped to at least 2 and players to at least 12 so every
    /// event has two distinct sides and twelve distinct players.
    pub fn generate(&self) -> Vec<RawEvent> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let sides = self.sides.max(2);
        let players = self.players.max(2 * ROSTER_SLOTS);
        let codes: Vec<SideCode> = (0..sides).map(|i| SideCode(format!("S{i:03}"))).collect();
        let empty_rate = self.empty_slot_rate.clamp(0.0, 1.0);

        let mut ids: Vec<i64> = (1..=self.events as i64).collect();
        ids.shuffle(&mut rng);

        let mut out = Vec::with_capacity(self.events);
        for event_id in ids {
            let home = rng.gen_range(0..sides);
            let mut away = rng.gen_range(0..sides - 1);
            if away >= home {
                away += 1;
            }
            let picked = index::sample(&mut rng, players, 2 * ROSTER_SLOTS).into_vec();
            let mut home_roster: Roster = [None; ROSTER_SLOTS];
            let mut away_roster: Roster = [None; ROSTER_SLOTS];
            for slot in 0..ROSTER_SLOTS {
                if !rng.gen_bool(empty_rate) {
                    home_roster[slot] = Some(PlayerId(picked[slot] as u64 + 1));
                }
                if !rng.gen_bool(empty_rate) {
                    away_roster[slot] = Some(PlayerId(picked[ROSTER_SLOTS + slot] as u64 + 1));
                }
            }
            let scoring = if rng.gen_bool(0.53) { home } else { away };
            out.push(RawEvent {
                event_id,
                scoring_side: codes[scoring].clone(),
                home_side: codes[home].clone(),
                away_side: codes[away].clone(),
                home_roster,
                away_roster,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_batch() {
        let cfg = SyntheticBatch {
            events: 50,
            ..Default::default()
        };
        assert_eq!(cfg.generate(), cfg.generate());
    }

    #[test]
    fn events_are_well_formed() {
        let cfg = SyntheticBatch {
            events: 200,
            sides: 4,
            players: 20,
            empty_slot_rate: 0.2,
            seed: 11,
        };
        let events = cfg.generate();
        assert_eq!(events.len(), 200);
        for e in &events {
            assert_ne!(e.home_side, e.away_side);
            assert!(e.scoring_side_is_listed());
            for home in e.home_roster.iter().flatten() {
                assert!(!e.away_roster.contains(&Some(*home)));
            }
        }
        let mut ids: Vec<i64> = events.iter().map(|e| e.event_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=200).collect::<Vec<_>>());
    }
}
