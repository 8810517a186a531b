use std::path::PathBuf;

use anyhow::{Context, Result};

use rapm_design::config::DesignConfig;
use rapm_design::event_store;
use rapm_design::export::{DesignArtifact, write_artifact};
use rapm_design::logging::{LogConfig, init_logging};
use rapm_design::pipeline;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging(&LogConfig::from_verbosity(verbosity()));

    let mut cfg = DesignConfig::from_env();
    apply_cli_overrides(&mut cfg);

    let db_path = parse_path_arg("--db")
        .or_else(|| cfg.db_path.clone())
        .or_else(event_store::default_db_path)
        .context("unable to resolve sqlite path")?;
    let out_path = parse_path_arg("--out")
        .unwrap_or_else(|| PathBuf::from(format!("rapm_design_{}.json", cfg.strength)));

    let design = pipeline::prepare_design_from_db(&db_path, &cfg)?;
    let artifact = DesignArtifact::new(
        cfg.strength,
        Some(db_path.display().to_string()),
        design,
    );
    write_artifact(&out_path, &artifact)?;

    let design = &artifact.design;
    println!("RAPM design built");
    println!("DB: {}", db_path.display());
    println!("Strength: {}", cfg.strength);
    println!("Events: {}", design.rows());
    println!(
        "Sides: {} columns, {} entries",
        design.sides.ncols(),
        design.sides.nnz()
    );
    println!(
        "Players: {} columns, {} entries",
        design.players.ncols(),
        design.players.nnz()
    );
    println!("Home minus away goals: {}", design.response_balance());
    println!("Written: {}", out_path.display());
    Ok(())
}

fn apply_cli_overrides(cfg: &mut DesignConfig) {
    for key in [
        "strength",
        "empty_batch",
        "roster_conflict",
        "column_order",
        "side_universe",
        "threads",
    ] {
        let flag = format!("--{}", key.replace('_', "-"));
        if let Some(value) = parse_value_arg(&flag) {
            cfg.apply(key, &value);
        }
    }
    if has_flag("--sorted") {
        cfg.apply("column_order", "sorted");
    }
    if has_flag("--parallel") {
        cfg.apply("parallel", "1");
    }
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

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    parse_value_arg(name).map(PathBuf::from)
}

fn has_flag(flag: &str) -> bool {
    std::env::args().skip(1).any(|a| a == flag)
}

fn verbosity() -> u8 {
    let mut n = 0u8;
    for arg in std::env::args().skip(1) {
        if arg == "--verbose" {
            n = n.saturating_add(1);
        } else if let Some(vs) = arg.strip_prefix('-')
            && !vs.is_empty()
            && vs.chars().all(|c| c == 'v')
        {
            n = n.saturating_add(vs.len() as u8);
        }
    }
    n
}
