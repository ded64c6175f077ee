//! Concurrent fan-out of provider lookups under a shared deadline.
//!
//! Every eligible provider runs in its own tokio task and reports back over a
//! single unbounded channel. The coordinator merges completions as they
//! arrive and stops waiting when the deadline passes or, for source lookups,
//! when enough candidates have been collected. Tasks still running at that
//! point are detached: their eventual send hits a closed channel and is
//! dropped, and since only the coordinator records successes, they never
//! touch the counters either.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;
use sourcepool_common::MediaDescriptor;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use crate::accounting::ProviderStatsStore;
use crate::config::DispatchConfig;
use crate::source::{ProviderError, SourceCandidate, SourceProvider};

/// What a dispatch round asks each provider for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// `get_sources`: candidate links.
    Sources,
    /// `get_url`: the provider's page for the title.
    RelatedUrl,
}

/// Bounds for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOptions {
    /// Deadline for the whole round; zero waits for every provider.
    pub max_timeout: Duration,
    /// Stop once this many candidates arrived; zero never stops early.
    /// Ignored for related-URL rounds.
    pub max_results: usize,
}

impl DispatchOptions {
    pub fn new(max_timeout: Duration, max_results: usize) -> Self {
        Self {
            max_timeout,
            max_results,
        }
    }
}

impl From<&DispatchConfig> for DispatchOptions {
    fn from(config: &DispatchConfig) -> Self {
        Self::new(config.source_timeout(), config.max_results)
    }
}

/// The page one provider holds for a title, if it returned one in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedUrl {
    pub provider: String,
    pub url: Option<String>,
}

/// Outcome of one dispatch round.
#[derive(Debug, Clone)]
pub struct DispatchReport<T> {
    pub results: Vec<T>,
    /// Providers whose result was merged.
    pub succeeded: Vec<String>,
    /// Providers that returned an error or panicked.
    pub failed: Vec<String>,
    /// Providers still running when the deadline passed.
    pub timed_out: Vec<String>,
    /// Collection stopped because `max_results` was reached.
    pub early_exit: bool,
    pub elapsed: Duration,
}

impl<T> DispatchReport<T> {
    fn empty() -> Self {
        Self {
            results: Vec::new(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            timed_out: Vec::new(),
            early_exit: false,
            elapsed: Duration::ZERO,
        }
    }
}

struct Completion<T> {
    provider: String,
    outcome: Result<T, ProviderError>,
}

/// Ask every provider for candidate sources.
///
/// Candidates are stamped with the producing provider's name and merged in
/// completion order. Ranking is left to the aggregator. `max_results` only
/// ends the wait: everything merged up to that point is returned.
pub async fn dispatch_sources(
    video: &MediaDescriptor,
    providers: &[Arc<dyn SourceProvider>],
    stats: &dyn ProviderStatsStore,
    options: DispatchOptions,
) -> DispatchReport<SourceCandidate> {
    let video = Arc::new(video.clone());
    let max_results = options.max_results;
    let mut results: Vec<SourceCandidate> = Vec::new();

    let mut report: DispatchReport<SourceCandidate> = fan_out(
        DispatchMode::Sources,
        providers,
        stats,
        options,
        |provider| {
            let video = video.clone();
            async move { provider.get_sources(&video).await }
        },
        |name, candidates: Vec<SourceCandidate>| {
            results.extend(candidates.into_iter().map(|mut c| {
                c.provider = name.to_string();
                c.rating = c.rating.map(|r| r.min(100));
                c
            }));
            max_results > 0 && results.len() >= max_results
        },
    )
    .await;

    report.results = results;
    report
}

/// Ask every provider for its page holding the title.
///
/// The result holds one entry per dispatched provider in the given order;
/// providers that failed or timed out get `url: None`.
pub async fn dispatch_related(
    video: &MediaDescriptor,
    providers: &[Arc<dyn SourceProvider>],
    stats: &dyn ProviderStatsStore,
    options: DispatchOptions,
) -> DispatchReport<RelatedUrl> {
    let video = Arc::new(video.clone());
    let options = DispatchOptions {
        max_results: 0,
        ..options
    };
    let mut found: HashMap<String, String> = HashMap::new();

    let mut report: DispatchReport<RelatedUrl> = fan_out(
        DispatchMode::RelatedUrl,
        providers,
        stats,
        options,
        |provider| {
            let video = video.clone();
            async move { provider.get_url(&video).await }
        },
        |name, url: Option<String>| {
            if let Some(url) = url {
                found.insert(name.to_string(), url);
            }
            false
        },
    )
    .await;

    report.results = providers
        .iter()
        .map(|p| RelatedUrl {
            provider: p.name().to_string(),
            url: found.remove(p.name()),
        })
        .collect();
    report
}

/// Launch one task per provider and collect completions.
///
/// `merge` is called for every successful completion in arrival order and
/// returns `true` once the round has enough results.
async fn fan_out<T, R, F, Fut, M>(
    mode: DispatchMode,
    providers: &[Arc<dyn SourceProvider>],
    stats: &dyn ProviderStatsStore,
    options: DispatchOptions,
    call: F,
    mut merge: M,
) -> DispatchReport<R>
where
    T: Send + 'static,
    F: Fn(Arc<dyn SourceProvider>) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>> + Send + 'static,
    M: FnMut(&str, T) -> bool,
{
    let mut report = DispatchReport::empty();
    if providers.is_empty() {
        debug!(?mode, "No eligible providers, skipping dispatch");
        return report;
    }

    let begin = Instant::now();
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion<T>>();
    let mut outstanding: Vec<String> = Vec::with_capacity(providers.len());

    for provider in providers {
        let name = provider.name().to_string();

        if let Err(e) = stats.increment_try(&name) {
            warn!(provider = %name, error = %e, "Failed to record provider try");
        }

        let job = call(provider.clone());
        let tx = tx.clone();
        let task_name = name.clone();
        // The JoinHandle is dropped: a task outliving the round is detached,
        // never aborted.
        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(job).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(panic) => Err(ProviderError::Panicked(panic_message(panic))),
            };
            // Fails once the round has returned; the result is discarded.
            let _ = tx.send(Completion {
                provider: task_name,
                outcome,
            });
        });

        debug!(provider = %name, ?mode, "Provider task launched");
        outstanding.push(name);
    }
    drop(tx);

    while !outstanding.is_empty() {
        let next = if options.max_timeout.is_zero() {
            rx.recv().await
        } else {
            let remaining = options.max_timeout.saturating_sub(begin.elapsed());
            match timeout(remaining, rx.recv()).await {
                Ok(next) => next,
                Err(_) => break,
            }
        };

        let Some(completion) = next else {
            break;
        };
        outstanding.retain(|name| *name != completion.provider);

        match completion.outcome {
            Ok(value) => {
                if let Err(e) = stats.mark_success(&completion.provider) {
                    warn!(provider = %completion.provider, error = %e, "Failed to record provider success");
                }
                debug!(
                    provider = %completion.provider,
                    elapsed_ms = begin.elapsed().as_millis() as u64,
                    "Provider completed"
                );
                let enough = merge(&completion.provider, value);
                report.succeeded.push(completion.provider);
                if enough {
                    report.early_exit = true;
                    break;
                }
            }
            Err(e) => {
                warn!(provider = %completion.provider, error = %e, "Provider failed");
                report.failed.push(completion.provider);
            }
        }
    }

    if report.early_exit {
        if !outstanding.is_empty() {
            info!(
                detached = outstanding.len(),
                "Result limit reached, leaving remaining providers to finish in the background"
            );
        }
    } else if !outstanding.is_empty() {
        for name in &outstanding {
            warn!(
                provider = %name,
                timeout_ms = options.max_timeout.as_millis() as u64,
                "Provider timed out"
            );
        }
        report.timed_out = outstanding;
    }

    report.elapsed = begin.elapsed();
    info!(
        ?mode,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        timed_out = report.timed_out.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Dispatch round finished"
    );
    report
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
