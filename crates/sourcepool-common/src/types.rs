//! Core type definitions for media lookups.
//!
//! All enums serialize in lowercase so they can be stored as plain text in
//! the settings database and written as-is in TOML configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media a provider can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    /// A single movie.
    Movie,
    /// A TV show as a whole.
    TvShow,
    /// One season of a TV show.
    Season,
    /// One episode of a TV show.
    Episode,
}

impl VideoType {
    /// All video types, in display order.
    pub const ALL: [VideoType; 4] = [Self::Movie, Self::TvShow, Self::Season, Self::Episode];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::TvShow => "tvshow",
            Self::Season => "season",
            Self::Episode => "episode",
        }
    }
}

impl fmt::Display for VideoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VideoType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "tvshow" | "show" => Ok(Self::TvShow),
            "season" => Ok(Self::Season),
            "episode" => Ok(Self::Episode),
            _ => Err(format!("Invalid video type: {}", s)),
        }
    }
}

/// Declared quality of a source.
///
/// Variants are ordered from worst to best so `Ord` can be used directly
/// when ranking candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    High,
    Hd,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Hd => write!(f, "hd"),
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "hd" => Ok(Self::Hd),
            _ => Err(format!("Invalid quality: {}", s)),
        }
    }
}

/// Direction of an adjacent priority swap between two providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}

/// Identifies the movie or episode a dispatch round searches for.
///
/// Immutable once built; providers receive it by reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub video_type: VideoType,
    pub title: String,
    pub year: Option<u16>,
    /// External id or slug from the metadata service.
    pub slug: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub episode_title: Option<String>,
}

impl MediaDescriptor {
    /// Describe a movie.
    pub fn movie(title: impl Into<String>, year: Option<u16>, slug: impl Into<String>) -> Self {
        Self {
            video_type: VideoType::Movie,
            title: title.into(),
            year,
            slug: slug.into(),
            season: None,
            episode: None,
            episode_title: None,
        }
    }

    /// Describe a single TV episode.
    pub fn episode(
        title: impl Into<String>,
        year: Option<u16>,
        slug: impl Into<String>,
        season: u32,
        episode: u32,
    ) -> Self {
        Self {
            video_type: VideoType::Episode,
            title: title.into(),
            year,
            slug: slug.into(),
            season: Some(season),
            episode: Some(episode),
            episode_title: None,
        }
    }

    /// Attach the episode title.
    #[must_use]
    pub fn with_episode_title(mut self, episode_title: impl Into<String>) -> Self {
        self.episode_title = Some(episode_title.into());
        self
    }
}

impl fmt::Display for MediaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.video_type, self.title)?;
        if let Some(year) = self.year {
            write!(f, " ({})", year)?;
        }
        if let (Some(season), Some(episode)) = (self.season, self.episode) {
            write!(f, " S{:02}E{:02}", season, episode)?;
        }
        Ok(())
    }
}
