use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use bingo_db::db::db_path;

/// Resolved runtime settings from the global command line options.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub seed: Option<u64>,
    pub log_level: String,
}

impl Settings {
    pub fn new(db: Option<PathBuf>, seed: Option<u64>, log_level: String) -> Self {
        Self {
            db_path: db.unwrap_or_else(db_path),
            seed,
            log_level,
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}

/// `RUST_LOG` wins over `--log-level`; logs go to stderr so tables stay clean on stdout.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}
