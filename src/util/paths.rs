//! Where config and logs live.
//!
//! Everything hangs off one data directory, `~/.wumpus-replay` unless
//! `--data-dir` says otherwise.

use std::path::PathBuf;
use std::sync::OnceLock;

const DIR_NAME: &str = ".wumpus-replay";

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Pin the data directory for the rest of the process. Only the first call
/// wins; later calls are logged and ignored.
pub fn init_data_dir(custom_path: Option<PathBuf>) {
    let requested = custom_path.unwrap_or_else(default_data_dir);
    if let Err(requested) = DATA_DIR.set(requested) {
        tracing::debug!(
            requested = %requested.display(),
            current = %data_dir().display(),
            "Data directory already set"
        );
    }
}

fn default_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(DIR_NAME),
        None => PathBuf::from(DIR_NAME),
    }
}

pub fn data_dir() -> PathBuf {
    DATA_DIR.get().cloned().unwrap_or_else(default_data_dir)
}

pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// `<data_dir>/logs/wumpus-replay.log`
pub fn log_file_path() -> PathBuf {
    logs_dir().join("wumpus-replay.log")
}

/// `<data_dir>/config.toml`, created from the bundled example on first run
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}
