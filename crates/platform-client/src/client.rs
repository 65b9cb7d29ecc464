//! Shared HTTP client for the platform REST API

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, Result};
use crate::request::RequestBuilder;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoint reporting the platform (artifact store) version
pub const PLATFORM_VERSION_PATH: &str = "artifactory/api/system/version";

/// Endpoint reporting the Access component version
pub const ACCESS_VERSION_PATH: &str = "access/api/v1/system/version";

/// HTTP client bound to one platform base URL
///
/// Clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    http: reqwest::Client,
    base_url: Url,
}

/// Versions reported by the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVersions {
    pub platform: String,
    pub access: String,
}

#[derive(Debug, Deserialize)]
struct VersionDocument {
    version: String,
}

impl PlatformClient {
    /// Create an unauthenticated client
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, HeaderMap::new())
    }

    /// Create a client sending `Authorization: Bearer <token>` on every call
    pub fn with_bearer_token(base_url: &str, token: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ClientError::InvalidRequest {
                message: "access token contains characters not allowed in a header".to_string(),
            }
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value);
        Self::build(base_url, headers)
    }

    /// Wrap a pre-built `reqwest::Client`
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self> {
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
        })
    }

    fn build(base_url: &str, headers: HeaderMap) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("platform-provider/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Transport {
                message: e.to_string(),
            })?;

        Self::with_http_client(base_url, http)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Start a request against a path template relative to the base URL
    pub fn request(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, path.into())
    }

    /// Query the platform and Access component versions
    pub async fn fetch_versions(&self) -> Result<RemoteVersions> {
        let platform = self.fetch_version(PLATFORM_VERSION_PATH).await?;
        let access = self.fetch_version(ACCESS_VERSION_PATH).await?;
        Ok(RemoteVersions { platform, access })
    }

    async fn fetch_version(&self, path: &str) -> Result<String> {
        let response = self.request(path).get().await?.error_for_status()?;
        let doc: VersionDocument = response.json()?;
        Ok(doc.version)
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url.trim())?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidRequest {
            message: format!("not a usable base URL: {}", base_url),
        });
    }
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::InvalidRequest {
            message: format!("unsupported URL scheme '{}' in {}", other, base_url),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = PlatformClient::new("ftp://example.com").unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme"));
    }

    #[test]
    fn test_rejects_garbage_url() {
        assert!(matches!(
            PlatformClient::new("not a url"),
            Err(ClientError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_bearer_token_rejects_newlines() {
        let err = PlatformClient::with_bearer_token("https://example.com", "abc\ndef").unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest { .. }));
    }
}
