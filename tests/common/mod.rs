//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which builds a [`SourceEngine`] over an
//! in-memory database and in-memory counters, and [`FakeProvider`], a
//! provider whose latency and answers are scripted per test.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sourcepool::accounting::MemoryStatsStore;
use sourcepool::config::Config;
use sourcepool::engine::SourceEngine;
use sourcepool::resolve::KnownHosts;
use sourcepool::source::{ProviderError, ProviderRegistry, SourceCandidate, SourceProvider};
use sourcepool_common::{MediaDescriptor, VideoType};
use sourcepool_db::pool::{init_memory_pool, DbPool};

/// A provider with a fixed answer and a fixed latency.
pub struct FakeProvider {
    name: String,
    provides: Vec<VideoType>,
    delay: Duration,
    sources: Result<Vec<SourceCandidate>, ProviderError>,
    url: Option<String>,
}

impl FakeProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            provides: VideoType::ALL.to_vec(),
            delay: Duration::ZERO,
            sources: Ok(Vec::new()),
            url: None,
        }
    }

    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    /// Answer with `urls`, each on host `<name>.example`.
    pub fn sources(mut self, urls: &[&str]) -> Self {
        let host = format!("{}.example", self.name);
        self.sources = Ok(urls
            .iter()
            .map(|u| SourceCandidate::new(&self.name, *u).with_host(&host))
            .collect());
        self
    }

    pub fn candidates(mut self, candidates: Vec<SourceCandidate>) -> Self {
        self.sources = Ok(candidates);
        self
    }

    pub fn failing(mut self) -> Self {
        self.sources = Err(ProviderError::failed("upstream unavailable"));
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn only(mut self, types: &[VideoType]) -> Self {
        self.provides = types.to_vec();
        self
    }
}

#[async_trait]
impl SourceProvider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn provides(&self) -> &[VideoType] {
        &self.provides
    }

    async fn get_sources(
        &self,
        _video: &MediaDescriptor,
    ) -> Result<Vec<SourceCandidate>, ProviderError> {
        tokio::time::sleep(self.delay).await;
        self.sources.clone()
    }

    async fn get_url(&self, _video: &MediaDescriptor) -> Result<Option<String>, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.url.clone())
    }

    async fn resolve_link(&self, link: &str) -> Result<Option<String>, ProviderError> {
        Ok(Some(link.to_string()))
    }
}

/// Engine over an in-memory database.
pub struct TestHarness {
    pub engine: SourceEngine,
    pub db: DbPool,
}

impl TestHarness {
    pub fn new(providers: Vec<FakeProvider>) -> Self {
        Self::with_config(Config::default(), providers)
    }

    pub fn with_config(config: Config, providers: Vec<FakeProvider>) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let table: Vec<Arc<dyn SourceProvider>> = providers
            .into_iter()
            .map(|p| Arc::new(p) as Arc<dyn SourceProvider>)
            .collect();
        let registry =
            ProviderRegistry::new(db.clone(), table).expect("failed to register providers");
        let hosts = Arc::new(KnownHosts::new(&config.hosts.known));

        let engine = SourceEngine::new(
            config,
            Arc::new(registry),
            Arc::new(MemoryStatsStore::new()),
            hosts,
        );

        Self { engine, db }
    }
}

pub fn movie() -> MediaDescriptor {
    MediaDescriptor::movie("Big Buck Bunny", Some(2008), "big-buck-bunny")
}
