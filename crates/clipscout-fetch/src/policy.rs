//! Fetch policy supplied by callers.

use std::collections::HashSet;
use std::time::Duration;

/// Default download timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default maximum body size (2 GiB).
const DEFAULT_MAX_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Default maximum redirect count.
const DEFAULT_MAX_REDIRECTS: u32 = 5;

/// Egress policy for a fetch.
///
/// Every caller states explicitly which hosts it is willing to talk to
/// and whether plain http is acceptable. The private-address checks in
/// validation are not configurable; only loopback can be opened up, for
/// self-hosted sources and local test servers.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Hosts the caller allows. `None` opts into unrestricted egress.
    pub allowed_hosts: Option<HashSet<String>>,
    /// Require https (default). When false, http is also accepted.
    pub require_https: bool,
    /// Permit hosts that resolve to loopback. Off by default; intended
    /// for self-hosted media servers and integration tests.
    pub allow_loopback: bool,
    /// Maximum redirects to follow, each re-validated.
    pub max_redirects: u32,
    /// Whole-download timeout.
    pub timeout: Duration,
    /// Maximum body size in bytes.
    pub max_bytes: u64,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            allowed_hosts: Some(HashSet::new()),
            require_https: true,
            allow_loopback: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl FetchPolicy {
    /// Policy allowing only the given hosts (and their subdomains).
    pub fn allow_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_hosts: Some(hosts.into_iter().map(|h| h.into().to_lowercase()).collect()),
            ..Default::default()
        }
    }

    /// Explicit opt-in to unrestricted egress (any public host).
    pub fn unrestricted() -> Self {
        Self {
            allowed_hosts: None,
            ..Default::default()
        }
    }

    /// Also accept plain http URLs.
    pub fn with_http_allowed(mut self) -> Self {
        self.require_https = false;
        self
    }

    /// Permit loopback hosts (self-hosted sources, test servers).
    pub fn with_loopback_allowed(mut self) -> Self {
        self.allow_loopback = true;
        self
    }

    /// Override the download timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the maximum body size.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Check a hostname against the allow-list, accepting subdomains of
    /// allowed entries ("video.example.com" matches "example.com").
    pub fn host_allowed(&self, host: &str) -> bool {
        let Some(allowed) = &self.allowed_hosts else {
            return true;
        };
        let host = host.to_lowercase();
        if allowed.contains(&host) {
            return true;
        }
        allowed
            .iter()
            .any(|entry| host.ends_with(&format!(".{}", entry)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_allowed_exact_and_subdomain() {
        let policy = FetchPolicy::allow_hosts(["example.com"]);
        assert!(policy.host_allowed("example.com"));
        assert!(policy.host_allowed("cdn.example.com"));
        assert!(policy.host_allowed("EXAMPLE.com"));
        assert!(!policy.host_allowed("evil-example.com"));
        assert!(!policy.host_allowed("example.com.evil.net"));
    }

    #[test]
    fn test_unrestricted_allows_anything() {
        let policy = FetchPolicy::unrestricted();
        assert!(policy.host_allowed("anything.invalid"));
    }

    #[test]
    fn test_default_is_closed() {
        let policy = FetchPolicy::default();
        assert!(!policy.host_allowed("example.com"));
        assert!(policy.require_https);
        assert!(!policy.allow_loopback);
    }
}
