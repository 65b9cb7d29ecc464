//! Chainable request builder and response wrapper
//!
//! Path templates use `{name}` placeholders for whole segments:
//!
//! ```rust,no_run
//! # use platform_client::PlatformClient;
//! # async fn example(client: &PlatformClient) -> platform_client::Result<()> {
//! let response = client
//!     .request("access/api/v2/stages/{name}")
//!     .path_param("name", "deploy")
//!     .query_param("project_key", "bookverse")
//!     .get()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::marker::PhantomData;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::client::PlatformClient;
use crate::error::{ClientError, ErrorBody, Result};

/// Builder for one request against the platform
#[derive(Debug)]
pub struct RequestBuilder<'c> {
    client: &'c PlatformClient,
    template: String,
    path_params: HashMap<String, String>,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    body_error: Option<String>,
}

impl<'c> RequestBuilder<'c> {
    pub(crate) fn new(client: &'c PlatformClient, template: String) -> Self {
        Self {
            client,
            template,
            path_params: HashMap::new(),
            query: Vec::new(),
            body: None,
            body_error: None,
        }
    }

    /// Substitute a `{name}` placeholder in the path template
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Append a query parameter
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append a query parameter only when the value is present and non-empty
    pub fn query_param_opt(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.query_param(name, v),
            _ => self,
        }
    }

    /// Set the JSON request body
    pub fn body<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = Some(value),
            Err(e) => self.body_error = Some(e.to_string()),
        }
        self
    }

    /// Resolve the final URL (template substitution plus query string)
    pub fn url(&self) -> Result<Url> {
        let mut url = self.client.base_url().clone();

        {
            let mut segments = url.path_segments_mut().map_err(|_| ClientError::InvalidRequest {
                message: format!("base URL cannot carry a path: {}", self.client.base_url()),
            })?;
            segments.pop_if_empty();

            for segment in self.template.split('/').filter(|s| !s.is_empty()) {
                match placeholder(segment) {
                    Some(name) => {
                        let value = self.path_params.get(name).ok_or_else(|| {
                            ClientError::InvalidRequest {
                                message: format!(
                                    "missing path parameter '{}' for {}",
                                    name, self.template
                                ),
                            }
                        })?;
                        segments.push(value);
                    }
                    None => {
                        segments.push(segment);
                    }
                }
            }
        }

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }

        Ok(url)
    }

    /// Decode successful responses into `R`, and error responses into [`ErrorBody`]
    pub fn result<R: DeserializeOwned>(self) -> TypedRequest<'c, R> {
        TypedRequest {
            inner: self,
            _types: PhantomData,
        }
    }

    pub async fn get(self) -> Result<Response> {
        self.execute(Method::GET).await
    }

    pub async fn post(self) -> Result<Response> {
        self.execute(Method::POST).await
    }

    pub async fn put(self) -> Result<Response> {
        self.execute(Method::PUT).await
    }

    pub async fn patch(self) -> Result<Response> {
        self.execute(Method::PATCH).await
    }

    pub async fn delete(self) -> Result<Response> {
        self.execute(Method::DELETE).await
    }

    async fn execute(self, method: Method) -> Result<Response> {
        if let Some(message) = self.body_error {
            return Err(ClientError::InvalidRequest {
                message: format!("request body could not be serialized: {}", message),
            });
        }

        let url = self.url()?;
        tracing::debug!(%method, %url, "sending platform request");

        let mut request = self.client.http().request(method.clone(), url.clone());
        if let Some(body) = &self.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await.map_err(|e| ClientError::Transport {
            message: format!("failed to read response body: {}", e),
        })?;

        tracing::debug!(%method, %url, status = status.as_u16(), "platform responded");

        Ok(Response::new(status, url, text))
    }
}

/// Request whose result and error bodies are decoded into caller types
#[derive(Debug)]
pub struct TypedRequest<'c, R, E = ErrorBody> {
    inner: RequestBuilder<'c>,
    _types: PhantomData<fn() -> (R, E)>,
}

impl<'c, R: DeserializeOwned, E: DeserializeOwned> TypedRequest<'c, R, E> {
    /// Decode 4xx/5xx bodies into `E` instead
    pub fn error_body<E2: DeserializeOwned>(self) -> TypedRequest<'c, R, E2> {
        TypedRequest {
            inner: self.inner,
            _types: PhantomData,
        }
    }

    pub async fn get(self) -> Result<TypedResponse<R, E>> {
        self.execute(Method::GET).await
    }

    pub async fn post(self) -> Result<TypedResponse<R, E>> {
        self.execute(Method::POST).await
    }

    pub async fn put(self) -> Result<TypedResponse<R, E>> {
        self.execute(Method::PUT).await
    }

    pub async fn patch(self) -> Result<TypedResponse<R, E>> {
        self.execute(Method::PATCH).await
    }

    pub async fn delete(self) -> Result<TypedResponse<R, E>> {
        self.execute(Method::DELETE).await
    }

    async fn execute(self, method: Method) -> Result<TypedResponse<R, E>> {
        let response = self.inner.execute(method).await?;

        if response.is_error() {
            let error = serde_json::from_str(&response.text).ok();
            return Ok(TypedResponse {
                response,
                result: None,
                error,
            });
        }

        // 204 and other empty successes carry no result
        let result = if response.text.trim().is_empty() {
            None
        } else {
            Some(response.json()?)
        };

        Ok(TypedResponse {
            response,
            result,
            error: None,
        })
    }
}

/// Response with its body decoded according to the status
#[derive(Debug, Clone)]
pub struct TypedResponse<R, E = ErrorBody> {
    pub response: Response,
    /// Decoded body of a non-empty 2xx/3xx response
    pub result: Option<R>,
    /// Decoded body of a 4xx/5xx response, when it matched `E`
    pub error: Option<E>,
}

impl<R, E> TypedResponse<R, E> {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn is_error(&self) -> bool {
        self.response.is_error()
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{').and_then(|s| s.strip_suffix('}'))
}

/// A fully-read platform response
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    url: Url,
    text: String,
    error: ErrorBody,
}

impl Response {
    fn new(status: StatusCode, url: Url, text: String) -> Self {
        let error = if status.is_client_error() || status.is_server_error() {
            ErrorBody::parse(&text)
        } else {
            ErrorBody::default()
        };

        Self {
            status,
            url,
            text,
            error,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// True for 4xx and 5xx responses
    pub fn is_error(&self) -> bool {
        self.status.is_client_error() || self.status.is_server_error()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Raw response text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Typed error body (empty for successful responses)
    pub fn error_body(&self) -> &ErrorBody {
        &self.error
    }

    /// Joined error sentence, or the raw body when no typed error was returned
    pub fn error_text(&self) -> String {
        if self.error.is_empty() {
            let raw = self.text.trim();
            if raw.is_empty() {
                self.status.to_string()
            } else {
                raw.to_string()
            }
        } else {
            self.error.joined()
        }
    }

    /// Decode the body into the typed result
    pub fn json<R: DeserializeOwned>(&self) -> Result<R> {
        serde_json::from_str(&self.text).map_err(|e| ClientError::Decode {
            message: format!("{} (from {})", e, self.url),
        })
    }

    /// Convert into an API error
    pub fn into_error(self) -> ClientError {
        ClientError::Api {
            status: self.status.as_u16(),
            message: self.error_text(),
        }
    }

    /// Pass 2xx/3xx responses through, turn 4xx/5xx into [`ClientError::Api`]
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_error() {
            Err(self.into_error())
        } else {
            Ok(self)
        }
    }
}
