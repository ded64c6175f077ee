//! Per-provider try/success counters.
//!
//! The dispatch coordinator charges a try when it launches a provider task
//! and records a success when it merges that task's result. Both stores keep
//! `success_count <= try_count` and are safe to call from concurrent tasks.

use std::collections::HashMap;

use parking_lot::Mutex;
use sourcepool_common::Result;
use sourcepool_db::models::ProviderStats;
use sourcepool_db::pool::{get_conn, DbPool};
use sourcepool_db::queries::stats;

/// Storage for provider counters.
pub trait ProviderStatsStore: Send + Sync {
    fn increment_try(&self, name: &str) -> Result<()>;

    /// Record a success. Returns `false` when no try was left to match it.
    fn mark_success(&self, name: &str) -> Result<bool>;

    /// Counters for one provider; zeros when never tried.
    fn get(&self, name: &str) -> Result<ProviderStats>;

    /// Counters for every tried provider, ordered by name.
    fn all(&self) -> Result<Vec<(String, ProviderStats)>>;

    /// Zero every counter. Returns how many providers were reset.
    fn reset_all(&self) -> Result<usize>;

    /// Rounded success percentage, 0 when never tried.
    fn success_rate(&self, name: &str) -> Result<u32> {
        Ok(self.get(name)?.success_rate())
    }
}

/// Counters persisted in the settings database.
pub struct DbStatsStore {
    pool: DbPool,
}

impl DbStatsStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProviderStatsStore for DbStatsStore {
    fn increment_try(&self, name: &str) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        stats::increment_try(&conn, name)
    }

    fn mark_success(&self, name: &str) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        stats::mark_success(&conn, name)
    }

    fn get(&self, name: &str) -> Result<ProviderStats> {
        let conn = get_conn(&self.pool)?;
        stats::get(&conn, name)
    }

    fn all(&self) -> Result<Vec<(String, ProviderStats)>> {
        let conn = get_conn(&self.pool)?;
        stats::list(&conn)
    }

    fn reset_all(&self) -> Result<usize> {
        let conn = get_conn(&self.pool)?;
        stats::reset_all(&conn)
    }
}

/// Process-local counters, lost on exit.
#[derive(Default)]
pub struct MemoryStatsStore {
    counters: Mutex<HashMap<String, ProviderStats>>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProviderStatsStore for MemoryStatsStore {
    fn increment_try(&self, name: &str) -> Result<()> {
        self.counters
            .lock()
            .entry(name.to_string())
            .or_default()
            .try_count += 1;
        Ok(())
    }

    fn mark_success(&self, name: &str) -> Result<bool> {
        let mut counters = self.counters.lock();
        match counters.get_mut(name) {
            Some(s) if s.success_count < s.try_count => {
                s.success_count += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn get(&self, name: &str) -> Result<ProviderStats> {
        Ok(self.counters.lock().get(name).copied().unwrap_or_default())
    }

    fn all(&self) -> Result<Vec<(String, ProviderStats)>> {
        let mut all: Vec<_> = self
            .counters
            .lock()
            .iter()
            .map(|(name, s)| (name.clone(), *s))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(all)
    }

    fn reset_all(&self) -> Result<usize> {
        let mut counters = self.counters.lock();
        let count = counters.len();
        counters.clear();
        Ok(count)
    }
}
