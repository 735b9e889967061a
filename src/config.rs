//! Application configuration
//!
//! Resolves where downloaded translations and the saved state live, and how
//! long the state layer waits before writing changes to disk.
//!
//! Defaults can be overridden from the environment:
//! - `BIBLE_READER_ASSETS`: assets directory
//! - `BIBLE_READER_SAVE_DELAY_MS`: save debounce delay in milliseconds

use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = "Bible Reader";
const DOWNLOADS_DIR: &str = "downloads";
const STATE_FILE: &str = "state.msgp";

/// Extension used for translations converted to the compact format
pub const COMPACT_EXTENSION: &str = "msgp";

/// Default delay between a change and the state being written
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(100);

const ASSETS_ENV: &str = "BIBLE_READER_ASSETS";
const SAVE_DELAY_ENV: &str = "BIBLE_READER_SAVE_DELAY_MS";

/// Runtime configuration for the state layer
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory holding `downloads/` and `state.msgp`
    pub assets_dir: PathBuf,
    /// Debounce delay for state saves
    pub save_delay: Duration,
    /// User agent sent with translation downloads
    pub user_agent: String,
}

impl AppConfig {
    /// Configuration rooted at an explicit assets directory
    pub fn with_assets_dir(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            save_delay: DEFAULT_SAVE_DELAY,
            user_agent: default_user_agent(),
        }
    }

    /// Load configuration from the environment, falling back to the platform
    /// data directory (~/.local/share/Bible Reader on Linux)
    pub fn from_env() -> Result<Self, String> {
        let assets_dir = match std::env::var_os(ASSETS_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_assets_dir()?,
        };

        let mut config = Self::with_assets_dir(assets_dir);

        if let Ok(raw) = std::env::var(SAVE_DELAY_ENV) {
            let millis: u64 = raw
                .trim()
                .parse()
                .map_err(|e| format!("Invalid {}={:?}: {}", SAVE_DELAY_ENV, raw, e))?;
            config.save_delay = Duration::from_millis(millis);
        }

        log::debug!(
            "Using assets dir {:?} (save delay {:?})",
            config.assets_dir,
            config.save_delay
        );
        Ok(config)
    }

    /// Directory where converted translations are cached
    pub fn downloads_dir(&self) -> PathBuf {
        self.assets_dir.join(DOWNLOADS_DIR)
    }

    /// Path of the persisted application state
    pub fn state_path(&self) -> PathBuf {
        self.assets_dir.join(STATE_FILE)
    }

    /// Path of a converted translation
    pub fn version_path(&self, key: &str) -> PathBuf {
        version_path_in(&self.downloads_dir(), key)
    }
}

/// `<downloads>/<key>.msgp`
pub fn version_path_in(downloads_dir: &Path, key: &str) -> PathBuf {
    downloads_dir.join(format!("{}.{}", key, COMPACT_EXTENSION))
}

fn default_assets_dir() -> Result<PathBuf, String> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| "Could not determine data directory".to_string())?;
    Ok(data_dir.join(APP_DIR_NAME))
}

fn default_user_agent() -> String {
    format!("bible-reader/{}", env!("CARGO_PKG_VERSION"))
}
