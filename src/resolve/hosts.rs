//! Hoster capability trait and the bundled config-driven implementation.

use async_trait::async_trait;
use url::Url;

/// Failure raised by a hoster while turning a hoster page into a stream URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HosterError(pub String);

/// Turns links on a video hoster into directly playable stream URLs.
#[async_trait]
pub trait HosterResolver: Send + Sync {
    /// Whether links on `host` can be resolved.
    fn can_resolve(&self, host: &str) -> bool;

    async fn resolve(&self, url: &str) -> Result<String, HosterError>;
}

/// Extract the normalized host of `url`: lowercase, without a leading `www.`.
///
/// Scheme-less links (`host.example/path`, `//host.example/path`) are read
/// as `http`. A site-relative path has no host.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => {
            let url = url.trim();
            let rest = match url.strip_prefix("//") {
                Some(rest) => rest,
                None if url.starts_with('/') => return None,
                None => url,
            };
            Url::parse(&format!("http://{}", rest)).ok()?
        }
    };
    parsed.host_str().map(normalize_host)
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Hoster resolver backed by the `[hosts] known` list.
///
/// Matches a host or any of its subdomains case-insensitively and resolves by
/// returning the link unchanged, so the player fetches the hoster URL itself.
#[derive(Debug, Clone, Default)]
pub struct KnownHosts {
    hosts: Vec<String>,
}

impl KnownHosts {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hosts: Vec<String> = hosts
            .into_iter()
            .map(|h| normalize_host(h.as_ref()))
            .filter(|h| !h.is_empty())
            .collect();
        hosts.sort();
        hosts.dedup();
        Self { hosts }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }
}

#[async_trait]
impl HosterResolver for KnownHosts {
    fn can_resolve(&self, host: &str) -> bool {
        let host = normalize_host(host);
        self.hosts.iter().any(|known| {
            host == *known
                || host
                    .strip_suffix(known.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    async fn resolve(&self, url: &str) -> Result<String, HosterError> {
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_of_normalizes() {
        assert_eq!(
            host_of("https://WWW.Example-Host.com/v/1").as_deref(),
            Some("example-host.com")
        );
        assert_eq!(host_of("cdn.example.org/a.mp4").as_deref(), Some("cdn.example.org"));
        assert_eq!(host_of("//cdn.example.org/a.mp4").as_deref(), Some("cdn.example.org"));
        assert_eq!(host_of(""), None);
    }

    #[test]
    fn site_relative_path_has_no_host() {
        assert_eq!(host_of("/watch/1"), None);
        assert_eq!(host_of("/"), None);
    }

    #[test]
    fn known_hosts_match_subdomains() {
        let hosts = KnownHosts::new(["Example-Host.com", "www.other.example"]);

        assert!(hosts.can_resolve("example-host.com"));
        assert!(hosts.can_resolve("EXAMPLE-HOST.COM"));
        assert!(hosts.can_resolve("cdn.example-host.com"));
        assert!(hosts.can_resolve("other.example"));
        assert!(!hosts.can_resolve("notexample-host.com"));
        assert!(!hosts.can_resolve("unknown.example"));
    }

    #[tokio::test]
    async fn resolve_passes_through() {
        let hosts = KnownHosts::new(["example-host.com"]);
        assert_eq!(
            hosts.resolve("https://example-host.com/v/1").await.unwrap(),
            "https://example-host.com/v/1"
        );
    }
}
