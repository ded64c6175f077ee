//! Rust models matching the database schema.

use serde::{Deserialize, Serialize};
use sourcepool_common::VideoType;

/// Persisted enable flag and ranking key for one provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderSetting {
    pub name: String,
    pub enabled: bool,
    /// Higher ranks first. Signed so adjacent swaps never run out of room.
    pub priority: i64,
}

/// Dispatch counters for one provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderStats {
    pub try_count: u64,
    pub success_count: u64,
}

impl ProviderStats {
    /// Success percentage, rounded to the nearest integer; 0 when the provider
    /// was never tried.
    pub fn success_rate(&self) -> u32 {
        if self.try_count == 0 {
            return 0;
        }
        (self.success_count as f64 / self.try_count as f64 * 100.0).round() as u32
    }
}

/// Identifies one cached provider URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelatedUrlKey {
    pub video_type: VideoType,
    pub title: String,
    pub year: Option<u16>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub provider: String,
}

impl RelatedUrlKey {
    pub(crate) fn year_text(&self) -> String {
        self.year.map(|y| y.to_string()).unwrap_or_default()
    }

    pub(crate) fn season_text(&self) -> String {
        self.season.map(|s| s.to_string()).unwrap_or_default()
    }

    pub(crate) fn episode_text(&self) -> String {
        self.episode.map(|e| e.to_string()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let stats = ProviderStats {
            try_count: 0,
            success_count: 0,
        };
        assert_eq!(stats.success_rate(), 0);

        let stats = ProviderStats {
            try_count: 3,
            success_count: 2,
        };
        assert_eq!(stats.success_rate(), 67);

        let stats = ProviderStats {
            try_count: 8,
            success_count: 1,
        };
        // 12.5 rounds away from zero
        assert_eq!(stats.success_rate(), 13);

        let stats = ProviderStats {
            try_count: 4,
            success_count: 4,
        };
        assert_eq!(stats.success_rate(), 100);
    }
}
