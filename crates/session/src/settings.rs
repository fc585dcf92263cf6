// Boundary settings
// Loaded from ~/.config/tabchat/settings.json

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sessions idle longer than this are eligible for eviction.
    pub session_ttl_secs: u64,
    /// Rows shown in previews (head, duplicates, load summary).
    pub preview_rows: usize,
    /// Cap on rows returned by the exploration search.
    pub search_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_ttl_secs: 30 * 60,
            preview_rows: 5,
            search_limit: 5,
        }
    }
}

impl Settings {
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tabchat")
            .join("settings.json")
    }

    /// Load from the config dir; any missing or unreadable file means
    /// defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
