//! Streaming download with per-redirect re-validation.

use std::path::{Path, PathBuf};

use reqwest::header::LOCATION;
use reqwest::{Client, Response};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use clipscout_models::MediaSource;

use crate::error::{FetchError, FetchResult, ValidationError};
use crate::policy::FetchPolicy;
use crate::validate::validate_media_url;

/// A completed download.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    /// The source that was ultimately fetched (post-redirect)
    pub source: MediaSource,
    /// Where the body was written
    pub path: PathBuf,
    /// Bytes written
    pub bytes: u64,
}

/// Downloads validated media URLs to caller-scoped files.
///
/// Redirects are never followed blindly: the client has redirects
/// disabled and every `Location` goes through [`validate_media_url`]
/// under the same policy before the next hop is requested.
#[derive(Clone)]
pub struct MediaFetcher {
    http: Client,
    policy: FetchPolicy,
}

impl MediaFetcher {
    /// Create a fetcher for the given policy.
    pub fn new(policy: FetchPolicy) -> FetchResult<Self> {
        let http = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(policy.timeout)
            .build()?;
        Ok(Self { http, policy })
    }

    /// The policy this fetcher enforces.
    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Validate a URL without fetching it.
    pub async fn validate(&self, url: &str) -> Result<MediaSource, ValidationError> {
        validate_media_url(url, &self.policy).await
    }

    /// Fetch `url` into `dest`, following at most
    /// `policy.max_redirects` redirects, each re-validated.
    pub async fn fetch(&self, url: &str, dest: impl AsRef<Path>) -> FetchResult<FetchedMedia> {
        let dest = dest.as_ref();
        let mut source = validate_media_url(url, &self.policy).await?;
        let mut redirects = 0u32;

        loop {
            debug!(url = %source.url, "requesting media");
            let response = self
                .http
                .get(&source.url)
                .send()
                .await
                .map_err(map_network_error(&self.policy))?;

            if response.status().is_redirection() {
                redirects += 1;
                if redirects > self.policy.max_redirects {
                    return Err(FetchError::TooManyRedirects(self.policy.max_redirects));
                }
                source = self.vet_redirect(&source, &response).await?;
                continue;
            }

            if !response.status().is_success() {
                return Err(FetchError::HttpStatus(response.status().as_u16()));
            }

            let bytes = self.stream_to_file(response, dest).await?;
            info!(
                url = %source.url,
                dest = %dest.display(),
                size_mb = bytes as f64 / (1024.0 * 1024.0),
                "media downloaded"
            );
            return Ok(FetchedMedia {
                source,
                path: dest.to_path_buf(),
                bytes,
            });
        }
    }

    /// Resolve and validate a redirect `Location` before following it.
    async fn vet_redirect(
        &self,
        from: &MediaSource,
        response: &Response,
    ) -> Result<MediaSource, ValidationError> {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ValidationError::RedirectBlocked("redirect without Location header".to_string())
            })?;

        let base = Url::parse(&from.url)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        let next = base
            .join(location)
            .map_err(|e| ValidationError::RedirectBlocked(format!("bad Location: {}", e)))?;

        match validate_media_url(next.as_str(), &self.policy).await {
            Ok(source) => {
                debug!(from = %from.url, to = %source.url, "following validated redirect");
                Ok(source)
            }
            Err(e) => {
                warn!(from = %from.url, to = %next, reason = e.code(), "redirect target rejected");
                Err(e)
            }
        }
    }

    /// Stream the response body to disk, enforcing the size bound.
    async fn stream_to_file(&self, mut response: Response, dest: &Path) -> FetchResult<u64> {
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;

        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    drop(file);
                    tokio::fs::remove_file(dest).await.ok();
                    return Err(map_network_error(&self.policy)(e));
                }
            };
            written += chunk.len() as u64;
            if written > self.policy.max_bytes {
                drop(file);
                tokio::fs::remove_file(dest).await.ok();
                return Err(FetchError::TooLarge(self.policy.max_bytes));
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(written)
    }
}

fn map_network_error(policy: &FetchPolicy) -> impl Fn(reqwest::Error) -> FetchError + '_ {
    move |e| {
        if e.is_timeout() {
            FetchError::Timeout(policy.timeout.as_secs())
        } else {
            FetchError::Network(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_policy() -> FetchPolicy {
        FetchPolicy::unrestricted()
            .with_http_allowed()
            .with_loopback_allowed()
    }

    #[tokio::test]
    async fn test_fetch_writes_body_to_dest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake video".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("source.mp4");
        let fetcher = MediaFetcher::new(test_policy()).unwrap();

        let fetched = fetcher
            .fetch(&format!("{}/v.mp4", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(fetched.bytes, 10);
        assert_eq!(std::fs::read(&dest).unwrap(), b"fake video");
    }

    #[tokio::test]
    async fn test_redirect_to_private_address_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v.mp4"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", "http://10.0.0.1/v.mp4"),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = MediaFetcher::new(test_policy()).unwrap();

        let err = fetcher
            .fetch(&format!("{}/v.mp4", server.uri()), dir.path().join("v.mp4"))
            .await
            .unwrap_err();

        match err {
            FetchError::Validation(v) => assert_eq!(v.code(), "private_address"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validated_redirect_is_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/start"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/final", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/final"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("v.mp4");
        let fetcher = MediaFetcher::new(test_policy()).unwrap();

        let fetched = fetcher
            .fetch(&format!("{}/start", server.uri()), &dest)
            .await
            .unwrap();
        assert_eq!(fetched.bytes, 2);
        assert!(fetched.source.url.ends_with("/final"));
    }

    #[tokio::test]
    async fn test_redirect_loop_is_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/loop", server.uri()).as_str()),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = MediaFetcher::new(test_policy()).unwrap();

        let err = fetcher
            .fetch(&format!("{}/loop", server.uri()), dir.path().join("v.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::TooManyRedirects(_)));
    }

    #[tokio::test]
    async fn test_size_limit_enforced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("big.mp4");
        let fetcher = MediaFetcher::new(test_policy().with_max_bytes(1024)).unwrap();

        let err = fetcher
            .fetch(&format!("{}/big", server.uri()), &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::TooLarge(1024)));
        assert!(!dest.exists(), "partial download must be removed");
    }

    #[tokio::test]
    async fn test_download_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"data".to_vec())
                    .set_delay(std::time::Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let policy = test_policy().with_timeout(std::time::Duration::from_millis(250));
        let fetcher = MediaFetcher::new(policy).unwrap();

        let err = fetcher
            .fetch(&format!("{}/slow", server.uri()), dir.path().join("v.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_error_status_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = MediaFetcher::new(test_policy()).unwrap();

        let err = fetcher
            .fetch(
                &format!("{}/missing", server.uri()),
                dir.path().join("v.mp4"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(404)));
    }
}
