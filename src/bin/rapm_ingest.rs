use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use rapm_design::config::DesignConfig;
use rapm_design::event::{GOAL_EVENT_KIND, RawEvent};
use rapm_design::event_store::{self, SqliteEventStore};
use rapm_design::logging::{LogConfig, init_logging};
use rapm_design::synthetic::SyntheticBatch;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging(&LogConfig::default());

    let mut cfg = DesignConfig::from_env();
    if let Some(raw) = parse_value_arg("--strength") {
        cfg.apply("strength", &raw);
    }
    let db_path = parse_value_arg("--db")
        .map(PathBuf::from)
        .or_else(|| cfg.db_path.clone())
        .or_else(event_store::default_db_path)
        .context("unable to resolve sqlite path")?;
    let kind = parse_value_arg("--kind").unwrap_or_else(|| GOAL_EVENT_KIND.to_string());

    let events = if let Some(raw) = parse_value_arg("--synthetic") {
        let count = raw
            .parse::<usize>()
            .with_context(|| format!("invalid --synthetic count {raw:?}"))?;
        let mut batch = SyntheticBatch {
            events: count,
            ..Default::default()
        };
        if let Some(seed) = parse_value_arg("--seed").and_then(|s| s.parse::<u64>().ok()) {
            batch.seed = seed;
        }
        batch.generate()
    } else if let Some(path) = parse_value_arg("--input") {
        let raw = fs::read_to_string(&path).with_context(|| format!("read {path}"))?;
        serde_json::from_str::<Vec<RawEvent>>(&raw)
            .with_context(|| format!("parse events {path}"))?
    } else {
        return Err(anyhow!("pass --input <events.json> or --synthetic <count>"));
    };

    let mut store = SqliteEventStore::open(&db_path)?;
    let summary = store.insert_events(cfg.strength, &kind, &events)?;

    println!("Event ingest complete");
    println!("DB: {}", db_path.display());
    println!("Strength: {}", summary.strength);
    println!("Kind: {}", summary.kind);
    println!("Events upserted: {}", summary.upserted);
    println!("Events stored: {}", store.count_events()?);
    Ok(())
}

fn parse_value_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&prefix)
            && !v.trim().is_empty()
        {
            return Some(v.trim().to_string());
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
