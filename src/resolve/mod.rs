//! Two-stage link resolution and the auto-play policy.
//!
//! Stage one asks the producing provider to unwrap its intermediate link into
//! a hoster link. Stage two hands the hoster link to the [`HosterResolver`]
//! when the host is supported, or passes it through unchanged when it is not.

mod hosts;

pub use hosts::{host_of, HosterError, HosterResolver, KnownHosts};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::source::{ProviderError, ProviderRegistry, SourceCandidate};

/// Why a candidate could not be turned into a stream URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("provider '{0}' is not registered")]
    UnknownProvider(String),

    #[error("provider '{provider}' found no link behind {url}")]
    NoLink { provider: String, url: String },

    #[error("provider '{provider}' failed to resolve link: {source}")]
    Provider {
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("hoster '{host}' failed to resolve link: {source}")]
    Hoster {
        host: String,
        #[source]
        source: HosterError,
    },
}

/// Resolves ranked candidates into playable stream URLs.
pub struct LinkResolver {
    registry: Arc<ProviderRegistry>,
    hosts: Arc<dyn HosterResolver>,
}

impl LinkResolver {
    pub fn new(registry: Arc<ProviderRegistry>, hosts: Arc<dyn HosterResolver>) -> Self {
        Self { registry, hosts }
    }

    pub fn hosts(&self) -> &Arc<dyn HosterResolver> {
        &self.hosts
    }

    /// Turn one candidate into a stream URL.
    pub async fn resolve(&self, candidate: &SourceCandidate) -> Result<String, ResolveError> {
        let provider = self
            .registry
            .get(&candidate.provider)
            .ok_or_else(|| ResolveError::UnknownProvider(candidate.provider.clone()))?;

        let link = provider
            .resolve_link(&candidate.url)
            .await
            .map_err(|source| ResolveError::Provider {
                provider: candidate.provider.clone(),
                source,
            })?
            .ok_or_else(|| ResolveError::NoLink {
                provider: candidate.provider.clone(),
                url: candidate.url.clone(),
            })?;

        match host_of(&link) {
            Some(host) if self.hosts.can_resolve(&host) => {
                debug!(provider = %candidate.provider, host = %host, "Resolving through hoster");
                self.hosts
                    .resolve(&link)
                    .await
                    .map_err(|source| ResolveError::Hoster { host, source })
            }
            _ => Ok(link),
        }
    }

    /// Try candidates in ranked order and return the first that resolves.
    ///
    /// Multi-part candidates are skipped. Each failure is logged and the next
    /// candidate tried; `None` means the list was exhausted.
    pub async fn auto_play(
        &self,
        candidates: &[SourceCandidate],
    ) -> Option<(SourceCandidate, String)> {
        for candidate in candidates.iter().filter(|c| !c.multi_part) {
            match self.resolve(candidate).await {
                Ok(stream_url) => return Some((candidate.clone(), stream_url)),
                Err(e) => {
                    warn!(
                        provider = %candidate.provider,
                        url = %candidate.url,
                        error = %e,
                        "Source failed to resolve, trying next"
                    );
                }
            }
        }
        None
    }
}
