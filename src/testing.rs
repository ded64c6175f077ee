//! Scriptable provider used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sourcepool_common::{MediaDescriptor, VideoType};

use crate::source::{ProviderError, SearchResult, SourceCandidate, SourceProvider};

#[derive(Clone)]
enum Outcome {
    Sources(Vec<SourceCandidate>),
    Fail(String),
    Panic,
}

#[derive(Clone)]
pub(crate) struct StubProvider {
    name: String,
    provides: Vec<VideoType>,
    delay: Duration,
    outcome: Outcome,
    url: Option<String>,
    links: HashMap<String, Result<Option<String>, ProviderError>>,
    search: Option<Vec<SearchResult>>,
    episode_url: Option<String>,
    search_calls: Arc<AtomicUsize>,
    episode_calls: Arc<AtomicUsize>,
}

impl StubProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            provides: VideoType::ALL.to_vec(),
            delay: Duration::ZERO,
            outcome: Outcome::Sources(Vec::new()),
            url: None,
            links: HashMap::new(),
            search: None,
            episode_url: None,
            search_calls: Arc::new(AtomicUsize::new(0)),
            episode_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn serving(mut self, types: &[VideoType]) -> Self {
        self.provides = types.to_vec();
        self
    }

    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    /// Return `count` candidates at `https://<name>.example/<i>`.
    pub fn returning(self, count: usize) -> Self {
        let candidates = (0..count)
            .map(|i| {
                SourceCandidate::new(&self.name, format!("https://{}.example/{}", self.name, i))
            })
            .collect();
        self.candidates(candidates)
    }

    pub fn candidates(mut self, candidates: Vec<SourceCandidate>) -> Self {
        self.outcome = Outcome::Sources(candidates);
        self
    }

    pub fn failing(mut self, msg: &str) -> Self {
        self.outcome = Outcome::Fail(msg.to_string());
        self
    }

    pub fn panicking(mut self) -> Self {
        self.outcome = Outcome::Panic;
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// Script `resolve_link(link)`. Unscripted links resolve to themselves.
    pub fn link(mut self, link: &str, result: Result<Option<&str>, ProviderError>) -> Self {
        self.links
            .insert(link.to_string(), result.map(|r| r.map(str::to_string)));
        self
    }

    pub fn with_search(mut self, results: Vec<SearchResult>) -> Self {
        self.search = Some(results);
        self
    }

    pub fn with_episode_url(mut self, url: &str) -> Self {
        self.episode_url = Some(url.to_string());
        self
    }

    pub fn search_calls(&self) -> Arc<AtomicUsize> {
        self.search_calls.clone()
    }

    pub fn episode_calls(&self) -> Arc<AtomicUsize> {
        self.episode_calls.clone()
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn settle<T>(&self, value: T) -> Result<T, ProviderError> {
        match &self.outcome {
            Outcome::Sources(_) => Ok(value),
            Outcome::Fail(msg) => Err(ProviderError::failed(msg.clone())),
            Outcome::Panic => panic!("{} blew up", self.name),
        }
    }
}

#[async_trait]
impl SourceProvider for StubProvider {
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
        self.pause().await;
        let candidates = match &self.outcome {
            Outcome::Sources(c) => c.clone(),
            _ => Vec::new(),
        };
        self.settle(candidates)
    }

    async fn get_url(&self, _video: &MediaDescriptor) -> Result<Option<String>, ProviderError> {
        self.pause().await;
        self.settle(self.url.clone())
    }

    async fn resolve_link(&self, link: &str) -> Result<Option<String>, ProviderError> {
        match self.links.get(link) {
            Some(result) => result.clone(),
            None => Ok(Some(link.to_string())),
        }
    }

    async fn search(
        &self,
        _video_type: VideoType,
        _title: &str,
        _year: Option<u16>,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.search.clone().ok_or(ProviderError::NotSupported)
    }

    async fn episode_url(
        &self,
        _show_url: &str,
        _season: u32,
        _episode: u32,
    ) -> Result<Option<String>, ProviderError> {
        self.episode_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.episode_url.clone())
    }
}
