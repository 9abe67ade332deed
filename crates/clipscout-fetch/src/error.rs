//! Fetch and validation error types.

use std::net::IpAddr;
use thiserror::Error;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// A URL rejected before (or instead of) network I/O.
///
/// Validation errors are never retried; [`ValidationError::code`] gives
/// a stable reason code distinguishing them from operational failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("URL is malformed: {0}")]
    Malformed(String),

    #[error("URL exceeds maximum length")]
    TooLong,

    #[error("URL embeds credentials")]
    EmbeddedCredentials,

    #[error("scheme '{0}' is not allowed")]
    SchemeNotAllowed(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("host '{0}' is not on the allow-list")]
    HostNotAllowed(String),

    #[error("host '{0}' did not resolve")]
    Unresolvable(String),

    #[error("host resolves to a private or local address ({0})")]
    PrivateAddress(IpAddr),

    #[error("redirect target rejected: {0}")]
    RedirectBlocked(String),
}

impl ValidationError {
    /// Stable reason code for logs and API surfaces.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed_url",
            Self::TooLong => "url_too_long",
            Self::EmbeddedCredentials => "embedded_credentials",
            Self::SchemeNotAllowed(_) => "scheme_not_allowed",
            Self::MissingHost => "missing_host",
            Self::HostNotAllowed(_) => "host_not_allowed",
            Self::Unresolvable(_) => "unresolvable_host",
            Self::PrivateAddress(_) => "private_address",
            Self::RedirectBlocked(_) => "redirect_blocked",
        }
    }
}

/// Errors that can occur while fetching a validated source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned status {0}")]
    HttpStatus(u16),

    #[error("too many redirects (limit {0})")]
    TooManyRedirects(u32),

    #[error("download exceeded size limit of {0} bytes")]
    TooLarge(u64),

    #[error("download timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// True when the failure was a security rejection rather than an
    /// operational one.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
