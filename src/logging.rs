use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            with_target: false,
        }
    }
}

impl LogConfig {
    /// 0 → info, 1 → debug, 2+ → trace.
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }
}

/// Installs a stderr fmt subscriber. `RUST_LOG` overrides the configured level.
/// Returns `false` when a global subscriber was already set.
pub fn init_logging(config: &LogConfig) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(config.level))
        .with_target(config.with_target)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_ascii_lowercase();
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,rapm_design={level}")))
}
