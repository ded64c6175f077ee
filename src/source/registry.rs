//! Provider registry: the load-time table of [`SourceProvider`]s plus their
//! persisted enable flags and priority keys.
//!
//! The provider table itself never changes after construction. Enable flags
//! and priorities live in the settings database and are re-read on every
//! listing, so an admin change is visible to the next dispatch round without
//! any cache invalidation. A round works from a [`RegistrySnapshot`] taken
//! once at its start.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use sourcepool_common::{Direction, Error, Result, VideoType};
use sourcepool_db::pool::{get_conn, DbPool};
use sourcepool_db::queries::providers;
use tracing::info;

use super::provider::SourceProvider;

/// A registered provider together with its persisted settings.
#[derive(Clone)]
pub struct ProviderEntry {
    pub provider: Arc<dyn SourceProvider>,
    pub enabled: bool,
    pub priority: i64,
}

impl ProviderEntry {
    pub fn name(&self) -> &str {
        self.provider.name()
    }
}

impl fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("name", &self.provider.name())
            .field("enabled", &self.enabled)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Provider list and priorities frozen at the start of a dispatch round.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    entries: Vec<ProviderEntry>,
}

impl RegistrySnapshot {
    pub fn new(entries: Vec<ProviderEntry>) -> Self {
        Self { entries }
    }

    /// Eligible providers in rank order.
    pub fn entries(&self) -> &[ProviderEntry] {
        &self.entries
    }

    pub fn providers(&self) -> Vec<Arc<dyn SourceProvider>> {
        self.entries.iter().map(|e| e.provider.clone()).collect()
    }

    /// Priority key per provider name, for ranking candidates.
    pub fn priorities(&self) -> HashMap<String, i64> {
        self.entries
            .iter()
            .map(|e| (e.name().to_string(), e.priority))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry of source providers backed by the settings database.
pub struct ProviderRegistry {
    pool: DbPool,
    providers: Vec<Arc<dyn SourceProvider>>,
}

impl ProviderRegistry {
    /// Build the registry from a load-time provider table.
    ///
    /// Providers seen for the first time are persisted as enabled and ranked
    /// below every known provider, in table order. Duplicate names are
    /// rejected.
    pub fn new(pool: DbPool, providers: Vec<Arc<dyn SourceProvider>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.name().to_string()) {
                return Err(Error::invalid_input(format!(
                    "duplicate provider name '{}'",
                    provider.name()
                )));
            }
        }

        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        let conn = get_conn(&pool)?;
        let seeded = providers::seed(&conn, &names)?;
        drop(conn);

        if seeded > 0 {
            info!(count = seeded, "Registered new source providers");
        }

        Ok(Self { pool, providers })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Look up a provider by name, enabled or not.
    pub fn get(&self, name: &str) -> Option<Arc<dyn SourceProvider>> {
        self.providers.iter().find(|p| p.name() == name).cloned()
    }

    /// Every registered provider with its settings, in rank order.
    pub fn list_all(&self) -> Result<Vec<ProviderEntry>> {
        let conn = get_conn(&self.pool)?;
        let settings: HashMap<String, (bool, i64)> = providers::list(&conn)?
            .into_iter()
            .map(|s| (s.name, (s.enabled, s.priority)))
            .collect();
        drop(conn);

        let mut entries: Vec<ProviderEntry> = self
            .providers
            .iter()
            .map(|provider| {
                let (enabled, priority) =
                    settings.get(provider.name()).copied().unwrap_or((true, 0));
                ProviderEntry {
                    provider: provider.clone(),
                    enabled,
                    priority,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.name().cmp(b.name()))
        });

        Ok(entries)
    }

    /// Enabled providers that support `video_type` (any type when `None`),
    /// highest priority first, ties broken by name.
    pub fn list_providers(&self, video_type: Option<VideoType>) -> Result<Vec<ProviderEntry>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|e| e.enabled)
            .filter(|e| video_type.map_or(true, |vt| e.provider.supports(vt)))
            .collect())
    }

    /// Freeze the eligible providers for one dispatch round.
    pub fn snapshot(&self, video_type: VideoType) -> Result<RegistrySnapshot> {
        Ok(RegistrySnapshot::new(self.list_providers(Some(video_type))?))
    }

    pub fn enable(&self, name: &str) -> Result<()> {
        self.set_enabled(name, true)
    }

    pub fn disable(&self, name: &str) -> Result<()> {
        self.set_enabled(name, false)
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        self.require(name)?;
        let conn = get_conn(&self.pool)?;
        if !providers::set_enabled(&conn, name, enabled)? {
            return Err(Error::not_found(format!("settings for provider '{}'", name)));
        }
        info!(provider = name, enabled, "Updated provider enable flag");
        Ok(())
    }

    /// Move `name` one step past `neighbor`.
    ///
    /// Only the two providers' keys change, by one each: `Up` raises `name`
    /// and lowers `neighbor`, `Down` does the opposite. Every other provider
    /// keeps its key.
    pub fn reorder(&self, name: &str, direction: Direction, neighbor: &str) -> Result<()> {
        self.require(name)?;
        self.require(neighbor)?;
        if name == neighbor {
            return Err(Error::invalid_input("cannot reorder a provider with itself"));
        }

        let delta = match direction {
            Direction::Up => 1,
            Direction::Down => -1,
        };

        let conn = get_conn(&self.pool)?;
        providers::shift_priority(&conn, name, neighbor, delta)?;

        info!(provider = name, ?direction, neighbor, "Reordered providers");
        Ok(())
    }

    fn require(&self, name: &str) -> Result<()> {
        if self.get(name).is_none() {
            return Err(Error::invalid_input(format!("unknown provider '{}'", name)));
        }
        Ok(())
    }
}
