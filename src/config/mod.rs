pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Locations searched, in order, when no config path is given.
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "./sourcepool.toml",
    "~/.config/sourcepool/config.toml",
    "/etc/sourcepool/config.toml",
];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    prepare_hosts(&mut config.hosts);

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_CONFIG_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

fn prepare_hosts(hosts: &mut HostsConfig) {
    for host in hosts.known.iter_mut() {
        *host = host.trim().trim_start_matches("www.").to_lowercase();
    }
    hosts.known.retain(|h| !h.is_empty());
    hosts.known.sort();
    hosts.known.dedup();
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.database.path.as_os_str().is_empty() {
        anyhow::bail!("Database path cannot be empty");
    }

    let mut seen = HashSet::new();
    for key in &config.sort.keys {
        if !seen.insert(key) {
            anyhow::bail!("Sort key '{}' is listed more than once", key);
        }
    }

    for (i, source) in config.manual_sources.iter().enumerate() {
        if source.title.trim().is_empty() {
            anyhow::bail!("Manual source #{} has no title", i + 1);
        }
        if source.url.trim().is_empty() {
            anyhow::bail!("Manual source '{}' has no URL", source.title);
        }
        if source.provider.as_deref().is_some_and(|p| p.trim().is_empty()) {
            anyhow::bail!("Manual source '{}' has an empty provider name", source.title);
        }
        if source.episode.is_some() && source.season.is_none() {
            anyhow::bail!(
                "Manual source '{}' has an episode number but no season",
                source.title
            );
        }
    }

    if config.sort.filter_unknown_hosts && config.hosts.known.is_empty() {
        tracing::warn!("Host filtering is enabled but no known hosts are configured");
    }

    Ok(())
}
