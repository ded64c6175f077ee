//! Cache of the pages each provider holds for a title.
//!
//! Providers that find titles through their own site search can delegate
//! their `get_url` to [`RelatedUrls::default_get_url`], which searches once,
//! caches the hit, and afterwards answers from the cache. Entries can be
//! corrected or removed by hand when a site reorganizes its pages.

use std::sync::LazyLock;

use regex::Regex;
use sourcepool_common::{MediaDescriptor, Result, VideoType};
use sourcepool_db::models::RelatedUrlKey;
use sourcepool_db::pool::{get_conn, DbPool};
use sourcepool_db::queries::related_urls;
use tracing::{debug, warn};

use crate::source::{ProviderError, SourceProvider};

static TITLE_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<title>[^(]+)\s*\(*(?P<year>\d{4})?\)*").expect("title/year pattern")
});

/// Split a manual search string like `"Title (2014)"` into title and year.
///
/// The title runs up to the first `(`. A four-digit year may follow it,
/// with or without closing parenthesis; anything else after the `(` is
/// dropped.
pub fn parse_search_query(query: &str) -> (String, Option<u16>) {
    let parsed = TITLE_YEAR.captures(query).and_then(|caps| {
        let title = caps["title"].trim();
        (!title.is_empty()).then(|| {
            let year = caps.name("year").and_then(|y| y.as_str().parse().ok());
            (title.to_string(), year)
        })
    });
    parsed.unwrap_or_else(|| (query.trim().to_string(), None))
}

/// Persisted `(provider, title) -> page` mapping.
#[derive(Clone)]
pub struct RelatedUrls {
    pool: DbPool,
}

impl RelatedUrls {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Cached page for `video` on `provider`.
    pub fn lookup(&self, provider: &str, video: &MediaDescriptor) -> Result<Option<String>> {
        let conn = get_conn(&self.pool)?;
        related_urls::get(&conn, &key(provider, video))
    }

    pub fn store(&self, provider: &str, video: &MediaDescriptor, url: &str) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        related_urls::set(&conn, &key(provider, video), url)
    }

    /// Replace a mapping by hand.
    ///
    /// Nothing happens when `new_url` equals `old_url`. An empty `new_url`
    /// deletes the mapping. Returns whether anything changed.
    pub fn update(
        &self,
        provider: &str,
        video: &MediaDescriptor,
        old_url: Option<&str>,
        new_url: &str,
    ) -> Result<bool> {
        let new_url = new_url.trim();
        if old_url.map(str::trim) == Some(new_url) {
            return Ok(false);
        }

        let conn = get_conn(&self.pool)?;
        let key = key(provider, video);
        if new_url.is_empty() {
            related_urls::delete(&conn, &key)
        } else {
            related_urls::set(&conn, &key, new_url)?;
            Ok(true)
        }
    }

    /// Forget every mapping held for `provider`.
    pub fn clear(&self, provider: &str) -> Result<usize> {
        let conn = get_conn(&self.pool)?;
        related_urls::clear_provider(&conn, provider)
    }

    /// Search-backed `get_url` for providers with a site search.
    ///
    /// Episodes resolve the show page first and derive the episode page from
    /// it. Both steps are cached. A provider without search yields `None`.
    /// Cache failures are logged and the lookup carries on uncached.
    pub async fn default_get_url(
        &self,
        provider: &dyn SourceProvider,
        video: &MediaDescriptor,
    ) -> std::result::Result<Option<String>, ProviderError> {
        let name = provider.name();
        let show = match video.video_type {
            VideoType::Episode | VideoType::Season => MediaDescriptor {
                video_type: VideoType::TvShow,
                season: None,
                episode: None,
                episode_title: None,
                ..video.clone()
            },
            _ => video.clone(),
        };

        let show_url = match self.cached(name, &show) {
            Some(url) => Some(url),
            None => match provider.search(show.video_type, &show.title, show.year).await {
                Ok(results) => match results.into_iter().next() {
                    Some(hit) => {
                        debug!(provider = %name, title = %show.title, url = %hit.url, "Search found page");
                        self.remember(name, &show, &hit.url);
                        Some(hit.url)
                    }
                    None => None,
                },
                Err(ProviderError::NotSupported) => None,
                Err(e) => return Err(e),
            },
        };

        let (Some(show_url), VideoType::Episode) = (show_url.clone(), video.video_type) else {
            return Ok(show_url);
        };
        let (Some(season), Some(episode)) = (video.season, video.episode) else {
            return Ok(None);
        };

        if let Some(url) = self.cached(name, video) {
            return Ok(Some(url));
        }

        let episode_url = provider.episode_url(&show_url, season, episode).await?;
        if let Some(url) = &episode_url {
            self.remember(name, video, url);
        }
        Ok(episode_url)
    }

    fn cached(&self, provider: &str, video: &MediaDescriptor) -> Option<String> {
        self.lookup(provider, video).unwrap_or_else(|e| {
            warn!(provider, error = %e, "Related URL lookup failed");
            None
        })
    }

    fn remember(&self, provider: &str, video: &MediaDescriptor, url: &str) {
        if let Err(e) = self.store(provider, video, url) {
            warn!(provider, error = %e, "Failed to cache related URL");
        }
    }
}

fn key(provider: &str, video: &MediaDescriptor) -> RelatedUrlKey {
    RelatedUrlKey {
        video_type: video.video_type,
        title: video.title.clone(),
        year: video.year,
        season: video.season,
        episode: video.episode,
        provider: provider.to_string(),
    }
}
