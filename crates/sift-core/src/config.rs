//! Configuration types for sift.
//!
//! [`Config::load`] reads `~/.config/sift/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[storage]
# Empty means $XDG_DATA_HOME/sift/store.json
path = ""

[output]
json = false
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/sift/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[storage]` section of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub path: String,
}

impl StorageConfig {
    /// The store file to open: `path` if set, otherwise the data-dir default.
    pub fn store_path(&self) -> PathBuf {
        if self.path.is_empty() {
            data_dir().join("sift").join("store.json")
        } else {
            PathBuf::from(&self.path)
        }
    }
}

/// `[output]` section of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Print JSON instead of human-readable lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/sift/config.toml`, layered on top of the built-in
    /// defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load `path` layered over the built-in defaults. A missing file yields
    /// the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("sift")
        .join("config.toml")
}

fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local").join("share"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
