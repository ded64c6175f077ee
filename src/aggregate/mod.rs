//! Host filtering and ranking of merged candidates.
//!
//! Ranking is a stable multi-key sort: provider priority first, then the
//! configured candidate fields. Candidates that compare equal on every key
//! keep the order in which they arrived.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::config::{SortConfig, SortKey};
use crate::resolve::HosterResolver;
use crate::source::SourceCandidate;

/// Drop candidates whose declared host no hoster can handle.
///
/// Candidates without a declared host are kept.
pub fn filter(candidates: Vec<SourceCandidate>, hosts: &dyn HosterResolver) -> Vec<SourceCandidate> {
    let before = candidates.len();
    let kept: Vec<_> = candidates
        .into_iter()
        .filter(|c| c.host.as_deref().map_or(true, |h| hosts.can_resolve(h)))
        .collect();
    if kept.len() < before {
        debug!(dropped = before - kept.len(), "Filtered candidates on unknown hosts");
    }
    kept
}

/// Sort candidates in place, best first.
///
/// Higher provider priority ranks first and a provider missing from
/// `priorities` ranks last. Each key in `keys` then sorts descending with
/// missing values last.
pub fn sort(candidates: &mut [SourceCandidate], priorities: &HashMap<String, i64>, keys: &[SortKey]) {
    candidates.sort_by(|a, b| compare(a, b, priorities, keys));
}

fn compare(
    a: &SourceCandidate,
    b: &SourceCandidate,
    priorities: &HashMap<String, i64>,
    keys: &[SortKey],
) -> Ordering {
    let pa = priorities.get(&a.provider);
    let pb = priorities.get(&b.provider);

    keys.iter().fold(pb.cmp(&pa), |ord, key| {
        ord.then_with(|| match key {
            SortKey::Quality => b.quality.cmp(&a.quality),
            SortKey::Rating => b.rating.cmp(&a.rating),
            SortKey::Views => b.views.cmp(&a.views),
        })
    })
}

/// Apply the configured filter and sort.
pub fn rank(
    candidates: Vec<SourceCandidate>,
    priorities: &HashMap<String, i64>,
    config: &SortConfig,
    hosts: &dyn HosterResolver,
) -> Vec<SourceCandidate> {
    let mut candidates = if config.filter_unknown_hosts {
        filter(candidates, hosts)
    } else {
        candidates
    };
    if config.enabled {
        sort(&mut candidates, priorities, &config.keys);
    }
    candidates
}

/// Candidates that can be played on their own.
pub fn playable(candidates: &[SourceCandidate]) -> impl Iterator<Item = &SourceCandidate> {
    candidates.iter().filter(|c| !c.multi_part)
}
