//! Built-in provider serving links declared in the config file.

use async_trait::async_trait;
use sourcepool_common::{MediaDescriptor, VideoType};

use super::provider::{ProviderError, SearchResult, SourceCandidate, SourceProvider};
use crate::config::ManualSource;
use crate::resolve::host_of;

/// Registry name of the config-backed provider.
pub const MANUAL_PROVIDER: &str = "manual";

/// Serves `[[manual_sources]]` entries through the provider interface.
///
/// Titles match case-insensitively. A year on either side only has to match
/// when both sides carry one.
pub struct ManualProvider {
    name: String,
    sources: Vec<ManualSource>,
}

impl ManualProvider {
    pub fn new(sources: Vec<ManualSource>) -> Self {
        Self::named(MANUAL_PROVIDER, sources)
    }

    pub fn named(name: impl Into<String>, sources: Vec<ManualSource>) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }

    /// One provider per distinct `provider` name in `sources`.
    ///
    /// The `manual` provider always comes first, even with no links of its
    /// own. Other names follow in order of first appearance.
    pub fn from_sources(sources: &[ManualSource]) -> Vec<ManualProvider> {
        let mut groups: Vec<(String, Vec<ManualSource>)> =
            vec![(MANUAL_PROVIDER.to_string(), Vec::new())];
        for source in sources {
            let name = source.provider.as_deref().map_or(MANUAL_PROVIDER, str::trim);
            match groups.iter_mut().find(|(n, _)| n == name) {
                Some((_, group)) => group.push(source.clone()),
                None => groups.push((name.to_string(), vec![source.clone()])),
            }
        }
        groups
            .into_iter()
            .map(|(name, sources)| Self::named(name, sources))
            .collect()
    }

    fn matching<'a>(&'a self, video: &'a MediaDescriptor) -> impl Iterator<Item = &'a ManualSource> {
        self.sources.iter().filter(move |s| {
            s.video_type == video.video_type
                && same_title(&s.title, &video.title)
                && years_agree(s.year, video.year)
                && s.season == video.season
                && s.episode == video.episode
        })
    }
}

fn same_title(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn years_agree(a: Option<u16>, b: Option<u16>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

#[async_trait]
impl SourceProvider for ManualProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn provides(&self) -> &[VideoType] {
        &VideoType::ALL
    }

    async fn get_sources(
        &self,
        video: &MediaDescriptor,
    ) -> Result<Vec<SourceCandidate>, ProviderError> {
        Ok(self
            .matching(video)
            .map(|s| {
                let mut candidate = SourceCandidate::new(&self.name, &s.url);
                if let Some(host) = host_of(&s.url) {
                    candidate = candidate.with_host(host);
                }
                if let Some(quality) = s.quality {
                    candidate = candidate.with_quality(quality);
                }
                candidate
            })
            .collect())
    }

    async fn get_url(&self, video: &MediaDescriptor) -> Result<Option<String>, ProviderError> {
        Ok(self.matching(video).next().map(|s| s.url.clone()))
    }

    async fn resolve_link(&self, link: &str) -> Result<Option<String>, ProviderError> {
        Ok(Some(link.to_string()))
    }

    async fn search(
        &self,
        video_type: VideoType,
        title: &str,
        year: Option<u16>,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        let needle = title.trim().to_lowercase();
        Ok(self
            .sources
            .iter()
            .filter(|s| s.video_type == video_type)
            .filter(|s| s.title.to_lowercase().contains(&needle))
            .filter(|s| years_agree(s.year, year))
            .map(|s| SearchResult {
                title: s.title.clone(),
                year: s.year,
                url: s.url.clone(),
            })
            .collect())
    }
}
