//! Trait definition and types for source providers.
//!
//! This module defines the [`SourceProvider`] trait that every pluggable site
//! integration implements, along with the candidate and search types that
//! flow out of it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sourcepool_common::{MediaDescriptor, Quality, VideoType};

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// One potential, not yet resolved, reference to playable media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCandidate {
    /// Name of the provider that produced this candidate.
    ///
    /// Overwritten by the dispatcher when the candidate is merged, so it always
    /// names the registry entry whose task returned it.
    pub provider: String,
    /// Link to a hoster, or to a page the provider can unwrap into one.
    pub url: String,
    /// Declared hoster domain, if the provider knows it.
    pub host: Option<String>,
    pub quality: Option<Quality>,
    pub views: Option<u64>,
    /// Site rating between 0 (worst) and 100 (best).
    pub rating: Option<u8>,
    /// True when this source is only one part of the whole video.
    pub multi_part: bool,
    /// Provider-specific attributes, e.g. for labels.
    pub extra: BTreeMap<String, String>,
}

impl SourceCandidate {
    pub fn new(provider: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            url: url.into(),
            host: None,
            quality: None,
            views: None,
            rating: None,
            multi_part: false,
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    #[must_use]
    pub fn with_views(mut self, views: u64) -> Self {
        self.views = Some(views);
        self
    }

    /// Set the rating, clamped to 100.
    #[must_use]
    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating.min(100));
        self
    }

    #[must_use]
    pub fn multi_part(mut self, multi_part: bool) -> Self {
        self.multi_part = multi_part;
        self
    }
}

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// A single hit from a provider's own site search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub year: Option<u16>,
    /// Site URL or path fragment for the hit.
    pub url: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure raised by a single provider call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider does not implement this capability (e.g. search).
    #[error("operation not supported by provider")]
    NotSupported,

    /// The provider tried and failed (network, parsing, upstream error).
    #[error("{0}")]
    Failed(String),

    /// The provider task panicked.
    #[error("provider panicked: {0}")]
    Panicked(String),
}

impl ProviderError {
    pub fn failed<S: Into<String>>(msg: S) -> Self {
        Self::Failed(msg.into())
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Async trait that all source providers must implement.
///
/// Each provider wraps one streaming or link site. Providers are held as
/// `Arc<dyn SourceProvider>` and called from one spawned task per dispatch
/// round, so implementations must be `Send + Sync` and must not rely on being
/// awaited to completion: a task that overruns the round's deadline is left
/// running and its result discarded.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Name used throughout settings, counters and labels. Must be unique.
    fn name(&self) -> &str;

    /// Video types this provider can look up.
    fn provides(&self) -> &[VideoType];

    fn supports(&self, video_type: VideoType) -> bool {
        self.provides().contains(&video_type)
    }

    /// Candidate sources for `video`.
    async fn get_sources(
        &self,
        video: &MediaDescriptor,
    ) -> Result<Vec<SourceCandidate>, ProviderError>;

    /// The page on this provider's site that holds `video`, if known.
    async fn get_url(&self, video: &MediaDescriptor) -> Result<Option<String>, ProviderError>;

    /// Unwrap an intermediate page produced by [`get_sources`](Self::get_sources)
    /// into a direct hoster link.
    async fn resolve_link(&self, link: &str) -> Result<Option<String>, ProviderError>;

    /// Search the provider's site.
    ///
    /// Providers without a search feature keep the default, which reports
    /// [`ProviderError::NotSupported`] rather than an empty list.
    async fn search(
        &self,
        _video_type: VideoType,
        _title: &str,
        _year: Option<u16>,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        Err(ProviderError::NotSupported)
    }

    /// Derive an episode page from the show page found by search.
    async fn episode_url(
        &self,
        _show_url: &str,
        _season: u32,
        _episode: u32,
    ) -> Result<Option<String>, ProviderError> {
        Ok(None)
    }

    /// Label shown when listing this candidate.
    fn format_source_label(&self, candidate: &SourceCandidate) -> String {
        let quality = candidate
            .quality
            .map(|q| q.to_string().to_uppercase())
            .unwrap_or_else(|| "?".to_string());
        let target = candidate.host.as_deref().unwrap_or(&candidate.url);
        match candidate.views {
            Some(views) => format!("[{}] {} ({} views)", quality, target, views),
            None => format!("[{}] {}", quality, target),
        }
    }
}
