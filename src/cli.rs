use clap::{Args, Parser, Subcommand};
use sourcepool_common::{Direction, MediaDescriptor, Quality, VideoType};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sourcepool")]
#[command(author, version, about = "Concurrent multi-provider media source lookup")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Identifies the movie or episode to look up.
#[derive(Args, Debug, Clone)]
pub struct MediaArgs {
    /// Video type (movie, tvshow, season, episode)
    #[arg(short = 't', long = "type", default_value = "movie")]
    pub video_type: VideoType,

    /// Title to look up
    #[arg(long)]
    pub title: String,

    /// Release year
    #[arg(long)]
    pub year: Option<u16>,

    /// Season number (episodes only)
    #[arg(long)]
    pub season: Option<u32>,

    /// Episode number (episodes only)
    #[arg(long)]
    pub episode: Option<u32>,

    /// External id or slug
    #[arg(long, default_value = "")]
    pub slug: String,
}

impl MediaArgs {
    pub fn descriptor(&self) -> MediaDescriptor {
        MediaDescriptor {
            video_type: self.video_type,
            title: self.title.clone(),
            year: self.year,
            slug: self.slug.clone(),
            season: self.season,
            episode: self.episode,
            episode_title: None,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every provider with its priority, state and success rate
    Providers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Enable a provider
    Enable {
        /// Provider name
        name: String,
    },

    /// Disable a provider
    Disable {
        /// Provider name
        name: String,
    },

    /// Move a provider one step past a neighbor
    Move {
        /// Provider to move
        name: String,

        /// Direction (up or down)
        direction: Direction,

        /// Provider to swap with
        neighbor: String,
    },

    /// Zero every provider's try/success counters
    ResetStats,

    /// Look up sources for a title
    Sources {
        #[command(flatten)]
        media: MediaArgs,

        /// Resolve and print only the first playable source
        #[arg(long)]
        play: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the page each provider holds for a title
    Related {
        #[command(flatten)]
        media: MediaArgs,
    },

    /// Set or clear (with an empty URL) a provider's page for a title
    SetUrl {
        /// Provider name
        provider: String,

        #[command(flatten)]
        media: MediaArgs,

        /// New page URL; empty removes the mapping
        url: String,
    },

    /// Forget every cached page of a provider
    ClearUrls {
        /// Provider name
        provider: String,
    },

    /// Search one provider's site, e.g. "Title (2014)"
    Search {
        /// Provider name
        provider: String,

        /// Video type (movie, tvshow)
        #[arg(short = 't', long = "type", default_value = "movie")]
        video_type: VideoType,

        /// Search string; a trailing "(year)" narrows the search
        query: String,
    },

    /// Add a manual source to the config file
    AddSource {
        #[command(flatten)]
        media: MediaArgs,

        /// Direct link to the video
        #[arg(long)]
        url: String,

        /// Declared quality (low, medium, high, hd)
        #[arg(long)]
        quality: Option<Quality>,

        /// Provider serving the link (defaults to "manual")
        #[arg(long)]
        provider: Option<String>,
    },

    /// Write a default config file
    Init {
        /// Where to write the config
        #[arg(default_value = "sourcepool.toml")]
        path: PathBuf,

        /// Reset an existing file to defaults, keeping its comments
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
