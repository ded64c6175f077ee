//! Source engine: the operations exposed to callers.
//!
//! The [`SourceEngine`] ties the registry, the dispatch coordinator, the
//! aggregator and the link resolver together. Every lookup snapshots the
//! registry once, fans out to the eligible providers and ranks what came
//! back in time.
//!
//! # Example
//!
//! ```rust,ignore
//! let engine = SourceEngine::open(config, vec![Arc::new(my_provider)])?;
//! let report = engine.get_sources(&MediaDescriptor::movie("Sintel", Some(2010), "sintel")).await?;
//! if let Some((candidate, url)) = engine.auto_play(&report.results).await {
//!     println!("{} -> {}", candidate.provider, url);
//! }
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use sourcepool_common::{MediaDescriptor, VideoType};
use sourcepool_db::pool::init_pool;
use tracing::info;

use crate::accounting::{DbStatsStore, ProviderStatsStore};
use crate::aggregate;
use crate::config::Config;
use crate::dispatch::{
    dispatch_related, dispatch_sources, DispatchOptions, DispatchReport, RelatedUrl,
};
use crate::related::RelatedUrls;
use crate::resolve::{HosterResolver, KnownHosts, LinkResolver, ResolveError};
use crate::source::{
    ManualProvider, ProviderError, ProviderRegistry, SearchResult, SourceCandidate, SourceProvider,
};

/// One row of the admin provider listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderOverview {
    pub name: String,
    pub provides: Vec<VideoType>,
    pub enabled: bool,
    pub priority: i64,
    pub try_count: u64,
    pub success_count: u64,
    pub success_rate: u32,
}

pub struct SourceEngine {
    config: Config,
    registry: Arc<ProviderRegistry>,
    stats: Arc<dyn ProviderStatsStore>,
    resolver: LinkResolver,
    related: RelatedUrls,
}

impl SourceEngine {
    pub fn new(
        config: Config,
        registry: Arc<ProviderRegistry>,
        stats: Arc<dyn ProviderStatsStore>,
        hosts: Arc<dyn HosterResolver>,
    ) -> Self {
        let related = RelatedUrls::new(registry.pool().clone());
        let resolver = LinkResolver::new(registry.clone(), hosts);
        Self {
            config,
            registry,
            stats,
            resolver,
            related,
        }
    }

    /// Open the configured database and register the config-backed manual
    /// providers followed by `providers`.
    pub fn open(config: Config, providers: Vec<Arc<dyn SourceProvider>>) -> Result<Self> {
        let db_path = config.database.path.to_string_lossy().into_owned();
        info!("Opening settings database at {}", db_path);
        let pool = init_pool(&db_path)
            .with_context(|| format!("Failed to open database: {}", db_path))?;

        let mut table: Vec<Arc<dyn SourceProvider>> =
            ManualProvider::from_sources(&config.manual_sources)
                .into_iter()
                .map(|p| Arc::new(p) as Arc<dyn SourceProvider>)
                .collect();
        table.extend(providers);

        let registry = ProviderRegistry::new(pool.clone(), table)
            .context("Failed to register source providers")?;
        let stats = Arc::new(DbStatsStore::new(pool));
        let hosts = Arc::new(KnownHosts::new(&config.hosts.known));

        Ok(Self::new(config, Arc::new(registry), stats, hosts))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &dyn ProviderStatsStore {
        self.stats.as_ref()
    }

    pub fn related(&self) -> &RelatedUrls {
        &self.related
    }

    /// Look up sources for `video`, ranked best first.
    pub async fn get_sources(
        &self,
        video: &MediaDescriptor,
    ) -> Result<DispatchReport<SourceCandidate>> {
        let snapshot = self
            .registry
            .snapshot(video.video_type)
            .context("Failed to read provider settings")?;

        info!(video = %video, providers = snapshot.len(), "Looking up sources");

        let mut report = dispatch_sources(
            video,
            &snapshot.providers(),
            self.stats.as_ref(),
            DispatchOptions::from(&self.config.dispatch),
        )
        .await;

        report.results = aggregate::rank(
            std::mem::take(&mut report.results),
            &snapshot.priorities(),
            &self.config.sort,
            self.resolver.hosts().as_ref(),
        );

        Ok(report)
    }

    /// Ask every eligible provider for its page holding `video`.
    pub async fn related_urls(&self, video: &MediaDescriptor) -> Result<DispatchReport<RelatedUrl>> {
        let snapshot = self
            .registry
            .snapshot(video.video_type)
            .context("Failed to read provider settings")?;

        Ok(dispatch_related(
            video,
            &snapshot.providers(),
            self.stats.as_ref(),
            DispatchOptions::from(&self.config.dispatch),
        )
        .await)
    }

    /// Correct or remove the cached page of one provider.
    pub fn set_related_url(&self, provider: &str, video: &MediaDescriptor, url: &str) -> Result<bool> {
        if self.registry.get(provider).is_none() {
            anyhow::bail!("Unknown provider '{}'", provider);
        }
        let old = self.related.lookup(provider, video)?;
        Ok(self.related.update(provider, video, old.as_deref(), url)?)
    }

    pub async fn resolve(&self, candidate: &SourceCandidate) -> Result<String, ResolveError> {
        self.resolver.resolve(candidate).await
    }

    pub async fn auto_play(
        &self,
        candidates: &[SourceCandidate],
    ) -> Option<(SourceCandidate, String)> {
        self.resolver.auto_play(candidates).await
    }

    /// Run one provider's site search.
    ///
    /// A provider without search fails with [`ProviderError::NotSupported`],
    /// which callers can tell apart from an empty result by downcasting.
    pub async fn search(
        &self,
        provider: &str,
        video_type: VideoType,
        title: &str,
        year: Option<u16>,
    ) -> Result<Vec<SearchResult>> {
        let provider = self
            .registry
            .get(provider)
            .with_context(|| format!("Unknown provider '{}'", provider))?;

        let results = provider.search(video_type, title, year).await.map_err(|e| match e {
            ProviderError::NotSupported => anyhow::Error::new(e),
            other => anyhow::Error::new(other)
                .context(format!("Search on '{}' failed", provider.name())),
        })?;
        Ok(results)
    }

    /// `"[provider] label"` for every playable candidate.
    pub fn source_labels(&self, candidates: &[SourceCandidate]) -> Vec<String> {
        aggregate::playable(candidates)
            .map(|c| match self.registry.get(&c.provider) {
                Some(p) => format!("[{}] {}", c.provider, p.format_source_label(c)),
                None => format!("[{}] {}", c.provider, c.url),
            })
            .collect()
    }

    /// Every registered provider with settings and counters, in rank order.
    pub fn provider_overview(&self) -> Result<Vec<ProviderOverview>> {
        let entries = self.registry.list_all()?;
        entries
            .into_iter()
            .map(|entry| -> Result<ProviderOverview> {
                let stats = self.stats.get(entry.name())?;
                Ok(ProviderOverview {
                    name: entry.name().to_string(),
                    provides: entry.provider.provides().to_vec(),
                    enabled: entry.enabled,
                    priority: entry.priority,
                    try_count: stats.try_count,
                    success_count: stats.success_count,
                    success_rate: stats.success_rate(),
                })
            })
            .collect()
    }
}
