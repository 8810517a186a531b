use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::DesignConfig;
use crate::design::{DesignMatrices, build_design};
use crate::event::RawEvent;
use crate::event_store::{EventSource, SqliteEventStore};
use crate::normalize::normalize;

/// Fetches the configured situation once, then normalizes and encodes it.
pub fn prepare_design(source: &dyn EventSource, cfg: &DesignConfig) -> Result<DesignMatrices> {
    let events = source
        .fetch_events(cfg.strength)
        .with_context(|| format!("fetch {} events", cfg.strength))?;
    info!(strength = %cfg.strength, events = events.len(), "fetched raw events");
    prepare_from_events(events, cfg)
}

/// Opens the store only for the duration of the fetch.
pub fn prepare_design_from_db(db_path: &Path, cfg: &DesignConfig) -> Result<DesignMatrices> {
    let events = {
        let store = SqliteEventStore::open(db_path)?;
        store.fetch_events(cfg.strength)?
    };
    info!(
        db = %db_path.display(),
        strength = %cfg.strength,
        events = events.len(),
        "fetched raw events"
    );
    prepare_from_events(events, cfg)
}

pub fn prepare_from_events(events: Vec<RawEvent>, cfg: &DesignConfig) -> Result<DesignMatrices> {
    let batch = normalize(events, cfg.normalize_options()).context("normalize event batch")?;
    let build = || build_design(&batch, cfg.build_options());
    let design = if cfg.parallel {
        with_pool(cfg.threads, build)
    } else {
        build()
    };
    design.context("build design matrices")
}

fn with_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
