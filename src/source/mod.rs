//! Source providers and the registry that ranks them.
//!
//! Providers are the pluggable site integrations. The [`ProviderRegistry`]
//! owns the load-time provider table and the persisted enable flags and
//! priorities that decide which providers a dispatch round uses.

pub mod manual;
mod provider;
mod registry;

pub use manual::{ManualProvider, MANUAL_PROVIDER};
pub use provider::{ProviderError, SearchResult, SourceCandidate, SourceProvider};
pub use registry::{ProviderEntry, ProviderRegistry, RegistrySnapshot};
