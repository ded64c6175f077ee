use serde::{Deserialize, Serialize};
use sourcepool_common::{Quality, VideoType};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub sort: SortConfig,

    #[serde(default)]
    pub hosts: HostsConfig,

    #[serde(default)]
    pub manual_sources: Vec<ManualSource>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file holding provider settings, counters and related URLs.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("sourcepool.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// Deadline for one dispatch round in seconds (0 = wait for every provider)
    #[serde(default = "default_source_timeout")]
    pub source_timeout_secs: u64,

    /// Stop collecting once this many candidates arrived (0 = never stop early)
    #[serde(default)]
    pub max_results: usize,

    /// Resolve and return the first playable source instead of the full list
    #[serde(default)]
    pub auto_play: bool,
}

fn default_source_timeout() -> u64 {
    10
}

impl DispatchConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            source_timeout_secs: default_source_timeout(),
            max_results: 0,
            auto_play: false,
        }
    }
}

/// Candidate field used as a secondary ranking key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Quality,
    Rating,
    Views,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quality => write!(f, "quality"),
            Self::Rating => write!(f, "rating"),
            Self::Views => write!(f, "views"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SortConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Drop candidates whose declared host no hoster can handle
    #[serde(default)]
    pub filter_unknown_hosts: bool,

    /// Secondary keys applied after provider priority, in order
    #[serde(default = "default_sort_keys")]
    pub keys: Vec<SortKey>,
}

fn default_true() -> bool {
    true
}

fn default_sort_keys() -> Vec<SortKey> {
    vec![SortKey::Quality, SortKey::Rating, SortKey::Views]
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            filter_unknown_hosts: false,
            keys: default_sort_keys(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HostsConfig {
    /// Hoster domains the bundled resolver accepts; subdomains match too.
    #[serde(default)]
    pub known: Vec<String>,
}

/// A link declared directly in the config file.
///
/// Links are served by the `manual` provider unless `provider` names another
/// one; every distinct name becomes its own provider in the registry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ManualSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    pub video_type: VideoType,

    pub title: String,

    #[serde(default)]
    pub year: Option<u16>,

    #[serde(default)]
    pub season: Option<u32>,

    #[serde(default)]
    pub episode: Option<u32>,

    pub url: String,

    #[serde(default)]
    pub quality: Option<Quality>,
}
