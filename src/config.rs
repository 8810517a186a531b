use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::columns::ColumnOrder;
use crate::design::{BuildOptions, RosterConflictPolicy};
use crate::event::Strength;
use crate::normalize::{EmptyBatchPolicy, NormalizeOptions, SideUniverse};

const DEFAULT_THREADS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignConfig {
    pub db_path: Option<PathBuf>,
    pub strength: Strength,
    pub empty_batch: EmptyBatchPolicy,
    pub roster_conflict: RosterConflictPolicy,
    pub column_order: ColumnOrder,
    pub side_universe: SideUniverse,
    pub parallel: bool,
    pub threads: usize,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            strength: Strength::EVEN,
            empty_batch: EmptyBatchPolicy::Reject,
            roster_conflict: RosterConflictPolicy::Reject,
            column_order: ColumnOrder::Discovery,
            side_universe: SideUniverse::HomeThenAway,
            parallel: false,
            threads: DEFAULT_THREADS,
        }
    }
}

impl DesignConfig {
    /// Defaults overlaid with `RAPM_*` environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(raw) = env::var("RAPM_DB_PATH")
            && !raw.trim().is_empty()
        {
            cfg.db_path = Some(PathBuf::from(raw.trim()));
        }
        if let Some(raw) = env_value("RAPM_STRENGTH") {
            cfg.apply("strength", &raw);
        }
        if let Some(raw) = env_value("RAPM_EMPTY_BATCH") {
            cfg.apply("empty_batch", &raw);
        }
        if let Some(raw) = env_value("RAPM_ROSTER_CONFLICT") {
            cfg.apply("roster_conflict", &raw);
        }
        if let Some(raw) = env_value("RAPM_COLUMN_ORDER") {
            cfg.apply("column_order", &raw);
        }
        if let Some(raw) = env_value("RAPM_SIDE_UNIVERSE") {
            cfg.apply("side_universe", &raw);
        }
        if let Some(raw) = env_value("RAPM_PARALLEL") {
            cfg.apply("parallel", &raw);
        }
        if let Some(raw) = env_value("RAPM_THREADS") {
            cfg.apply("threads", &raw);
        }
        cfg
    }

    /// Sets one option from its textual form. Unknown keys and unparseable
    /// values leave the current setting untouched and return `false`.
    pub fn apply(&mut self, key: &str, raw: &str) -> bool {
        let value = raw.trim().to_ascii_lowercase();
        let ok = match key {
            "strength" => raw.parse::<Strength>().map(|s| self.strength = s).is_ok(),
            "empty_batch" => match value.as_str() {
                "reject" | "error" => set(&mut self.empty_batch, EmptyBatchPolicy::Reject),
                "allow" | "allow_empty" | "empty" => {
                    set(&mut self.empty_batch, EmptyBatchPolicy::AllowEmpty)
                }
                _ => false,
            },
            "roster_conflict" => match value.as_str() {
                "reject" | "error" => {
                    set(&mut self.roster_conflict, RosterConflictPolicy::Reject)
                }
                "away_overwrites" | "last_write" => {
                    set(&mut self.roster_conflict, RosterConflictPolicy::AwayOverwrites)
                }
                "net_zero" | "net" => {
                    set(&mut self.roster_conflict, RosterConflictPolicy::NetZero)
                }
                _ => false,
            },
            "column_order" => match value.as_str() {
                "discovery" => set(&mut self.column_order, ColumnOrder::Discovery),
                "sorted" => set(&mut self.column_order, ColumnOrder::Sorted),
                _ => false,
            },
            "side_universe" => match value.as_str() {
                "home" => set(&mut self.side_universe, SideUniverse::Home),
                "home_then_away" | "all" => {
                    set(&mut self.side_universe, SideUniverse::HomeThenAway)
                }
                _ => false,
            },
            "parallel" => match parse_flag(&value) {
                Some(flag) => set(&mut self.parallel, flag),
                None => false,
            },
            "threads" => match value.parse::<usize>() {
                Ok(n) => set(&mut self.threads, n.clamp(1, 64)),
                Err(_) => false,
            },
            _ => false,
        };
        if !ok {
            warn!(key, value = raw, "ignoring invalid design option");
        }
        ok
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            empty_batch: self.empty_batch,
            column_order: self.column_order,
            side_universe: self.side_universe,
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            roster_conflict: self.roster_conflict,
            parallel: self.parallel,
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|raw| !raw.trim().is_empty())
}

fn set<T>(slot: &mut T, value: T) -> bool {
    *slot = value;
    true
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
