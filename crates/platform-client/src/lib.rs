//! Platform Client
//!
//! A thin HTTP adapter over the artifact platform's administrative REST API:
//!
//! - **Request builder**: `{name}` path templates, query parameters, JSON bodies
//! - **Typed errors**: `{code, message}` error documents joined into one sentence
//! - **Provider metadata**: base URL, shared client and reported versions
//!
//! Non-2xx responses are never retried here; callers decide what a status means.
//!
//! ## Example
//!
//! ```rust,no_run
//! use platform_client::PlatformClient;
//!
//! # async fn example() -> platform_client::Result<()> {
//! let client = PlatformClient::with_bearer_token("https://acme.example.com", "token")?;
//! let response = client
//!     .request("access/api/v2/lifecycle")
//!     .query_param("project_key", "bookverse")
//!     .get()
//!     .await?
//!     .error_for_status()?;
//! let lifecycle: serde_json::Value = response.json()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod meta;
pub mod request;

pub use client::{PlatformClient, RemoteVersions};
pub use error::{ClientError, ErrorBody, ErrorDetail, Result};
pub use meta::ProviderMeta;
pub use request::{RequestBuilder, Response, TypedRequest, TypedResponse};

// Status codes are part of the response surface
pub use reqwest::StatusCode;
