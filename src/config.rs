use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment variable overriding the store location.
pub const STORE_ENV: &str = "STUDYPLAN_STORE";

/// Runtime configuration shared by the CLI and the TUI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the JSON key-value store file.
    pub store_path: PathBuf,
}

impl Config {
    /// Resolves the configuration.
    ///
    /// The store path is determined in the following order:
    /// 1. the explicit `--store` override.
    /// 2. `STUDYPLAN_STORE` environment variable.
    /// 3. `~/.local/share/studyplan/store.json` (on Linux).
    /// 4. `./store.json` (fallback).
    pub fn resolve(store_override: Option<&Path>) -> Self {
        let store_path = match store_override {
            Some(p) => p.to_path_buf(),
            None => std::env::var(STORE_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_store_path()),
        };
        debug!(store = %store_path.display(), "resolved config");
        Config { store_path }
    }

    pub fn with_store(store_path: impl Into<PathBuf>) -> Self {
        Config {
            store_path: store_path.into(),
        }
    }
}

fn default_store_path() -> PathBuf {
    match dirs::data_local_dir() {
        Some(mut p) => {
            p.push("studyplan");
            p.push("store.json");
            p
        }
        None => PathBuf::from("store.json"),
    }
}
