//! Validated media source.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// A remote media source that has passed security validation.
///
/// Immutable once constructed; the fetcher is the only producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSource {
    /// The validated source URL
    pub url: String,
    /// URL scheme ("https" or "http")
    pub scheme: String,
    /// Hostname the URL points at
    pub host: String,
    /// Addresses the host resolved to at validation time
    pub resolved: Vec<IpAddr>,
}

impl MediaSource {
    pub fn new(
        url: impl Into<String>,
        scheme: impl Into<String>,
        host: impl Into<String>,
        resolved: Vec<IpAddr>,
    ) -> Self {
        Self {
            url: url.into(),
            scheme: scheme.into(),
            host: host.into(),
            resolved,
        }
    }
}
