use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use raaga_search::{CombineWeights, StrategyKind};

use crate::snapshot::BuildOptions;

/// Configuration for raaga.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (RAAGA_* prefix)
/// 3. Config file (~/.config/raaga/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the track catalog CSV.
    ///
    /// Can be set via:
    /// - CLI: --catalog /path/to/tracks.csv
    /// - ENV: RAAGA_CATALOG_PATH
    /// - Config: catalog_path = "/path/to/tracks.csv"
    /// - Default: ~/.local/share/raaga/tracks.csv
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Path to the SQLite artifact store.
    ///
    /// Can be set via:
    /// - CLI: --artifacts /path/to/raaga.db
    /// - ENV: RAAGA_ARTIFACT_PATH
    /// - Config: artifact_path = "/path/to/raaga.db"
    /// - Default: ~/.local/share/raaga/raaga.db
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,

    /// Similarity strategy: `dense_cosine` or `neighbor_index`.
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Weight of numeric-feature similarity in the dense strategy.
    #[serde(default = "default_weight")]
    pub numeric_weight: f64,

    /// Weight of genre similarity in the dense strategy.
    #[serde(default = "default_weight")]
    pub genre_weight: f64,

    /// Drop English stop words from artist/album/genre text.
    #[serde(default = "default_stop_words")]
    pub stop_words: bool,

    /// Number of recommendations when the caller does not ask for a count.
    #[serde(default = "default_results")]
    pub default_results: usize,

    /// Log filter used when RUST_LOG is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            artifact_path: default_artifact_path(),
            strategy: StrategyKind::default(),
            numeric_weight: default_weight(),
            genre_weight: default_weight(),
            stop_words: default_stop_words(),
            default_results: default_results(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/raaga/config.toml
    /// Reads environment variables with RAAGA_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new()
            .context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path.to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder.add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("raaga");
        builder.add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Apply the path overrides given on the command line.
    #[must_use]
    pub fn with_paths(mut self, catalog: Option<PathBuf>, artifacts: Option<PathBuf>) -> Self {
        if let Some(path) = catalog {
            self.catalog_path = path;
        }
        if let Some(path) = artifacts {
            self.artifact_path = path;
        }
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Options for building a snapshot from this configuration.
    #[must_use]
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            strategy: self.strategy,
            weights: CombineWeights {
                numeric: self.numeric_weight,
                genre: self.genre_weight,
            },
            stop_words: self.stop_words,
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("raaga")
}

fn default_catalog_path() -> PathBuf {
    data_dir().join("tracks.csv")
}

fn default_artifact_path() -> PathBuf {
    data_dir().join("raaga.db")
}

fn default_weight() -> f64 {
    0.5
}

fn default_stop_words() -> bool {
    true
}

fn default_results() -> usize {
    10
}

fn default_log_level() -> String {
    String::from("info")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/raaga/config.toml
/// - macOS: ~/Library/Application Support/raaga/config.toml
/// - Windows: %APPDATA%\raaga\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("raaga")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Raaga Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (RAAGA_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Track catalog, one CSV row per track with the header:
# id,name,artist,album,release_date,popularity,duration_ms,genres,album_art_url
#
# Can also be set via:
# - CLI: raaga --catalog /custom/tracks.csv build
# - Environment: RAAGA_CATALOG_PATH=/custom/tracks.csv
#catalog_path = "/path/to/tracks.csv"

# SQLite database holding the built similarity artifacts
#
# Can also be set via:
# - CLI: raaga --artifacts /custom/raaga.db build
# - Environment: RAAGA_ARTIFACT_PATH=/custom/raaga.db
#artifact_path = "/path/to/raaga.db"

# Similarity strategy
#
# dense_cosine   - blend of popularity/duration and genre similarity,
#                  precomputed for every pair of tracks
# neighbor_index - nearest neighbors over artist, album and genre text
strategy = "dense_cosine"

# Relative weights of the two dense_cosine components
numeric_weight = 0.5
genre_weight = 0.5

# Ignore common English words in artist and album names (neighbor_index)
stop_words = true

# Number of recommendations returned when -n is not given
default_results = 10

# Log filter used when RUST_LOG is not set (error, warn, info, debug, trace)
log_level = "info"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config())
        .context("Failed to write config file")?;

    Ok(true)
}
