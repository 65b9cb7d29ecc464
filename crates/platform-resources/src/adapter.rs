//! Generic CRUD adapter
//!
//! Shared request/response handling for resources backed by a single REST
//! collection. Each call sends one request, checks the status the endpoint
//! is documented to return and maps failures to the operation-specific
//! [`ResourceError`] variants. Nothing is retried.

use platform_client::{ClientError, PlatformClient, ProviderMeta, RequestBuilder, Response, StatusCode};
use platform_core::Diagnostic;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Operation, ResourceError, Result};

/// HTTP verb used to write a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Post,
    Put,
    Patch,
}

/// Statuses accepted as success for a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Status(StatusCode),
    AnySuccess,
}

impl Expect {
    /// Default expectation of a create with this verb
    pub fn for_create(verb: Verb) -> Self {
        match verb {
            Verb::Post => Expect::Status(StatusCode::CREATED),
            Verb::Put | Verb::Patch => Expect::AnySuccess,
        }
    }

    pub fn accepts(&self, status: StatusCode) -> bool {
        match self {
            Expect::Status(expected) => *expected == status,
            Expect::AnySuccess => status.is_success(),
        }
    }
}

/// CRUD helpers bound to one resource type
#[derive(Debug, Clone)]
pub struct RestAdapter {
    client: PlatformClient,
    resource: &'static str,
}

impl RestAdapter {
    pub fn new(meta: &ProviderMeta, resource: &'static str) -> Self {
        Self {
            client: meta.client.clone(),
            resource,
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    /// Start a request against `path`
    pub fn request(&self, path: &str) -> RequestBuilder<'_> {
        self.client.request(path)
    }

    /// Send a write and check its status; the body is left to the caller
    pub async fn send(
        &self,
        request: RequestBuilder<'_>,
        verb: Verb,
        expect: Expect,
        op: Operation,
    ) -> Result<Response> {
        let response = match verb {
            Verb::Post => request.post().await,
            Verb::Put => request.put().await,
            Verb::Patch => request.patch().await,
        }
        .map_err(|e| self.failed(op, e))?;

        if !expect.accepts(response.status()) {
            return Err(self.failed(op, unexpected(response)));
        }
        Ok(response)
    }

    /// Create and decode the created document
    pub async fn create<R: DeserializeOwned>(
        &self,
        request: RequestBuilder<'_>,
        verb: Verb,
    ) -> Result<R> {
        let response = self
            .send(request, verb, Expect::for_create(verb), Operation::Create)
            .await?;
        debug!(resource = self.resource, status = %response.status(), "created");
        response.json().map_err(|e| self.failed(Operation::Create, e))
    }

    /// Read a document; `None` means it no longer exists remotely
    ///
    /// The caller removes the resource from state on `None`.
    pub async fn read<R: DeserializeOwned>(&self, request: RequestBuilder<'_>) -> Result<Option<R>> {
        let response = request
            .get()
            .await
            .map_err(|e| self.failed(Operation::Read, e))?;

        if response.is_not_found() {
            warn!(
                resource = self.resource,
                url = %response.url(),
                "resource not found; removing from state"
            );
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| self.failed(Operation::Read, e))?;
        response
            .json()
            .map(Some)
            .map_err(|e| self.failed(Operation::Read, e))
    }

    /// Update and decode the updated document
    pub async fn update<R: DeserializeOwned>(
        &self,
        request: RequestBuilder<'_>,
        verb: Verb,
        expect: Expect,
    ) -> Result<R> {
        let response = self.send(request, verb, expect, Operation::Update).await?;
        debug!(resource = self.resource, status = %response.status(), "updated");
        response.json().map_err(|e| self.failed(Operation::Update, e))
    }

    /// Delete; already-gone resources count as deleted
    pub async fn delete(&self, request: RequestBuilder<'_>) -> Result<()> {
        let response = request
            .delete()
            .await
            .map_err(|e| self.failed(Operation::Delete, e))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(resource = self.resource, "already deleted");
                Ok(())
            }
            _ if response.is_error() => Err(self.failed(Operation::Delete, response.into_error())),
            _ => Err(self.failed(Operation::Delete, unexpected(response))),
        }
    }

    /// Warning for resources the platform cannot delete
    ///
    /// The resource is dropped from local state only.
    pub fn delete_unsupported(&self, detail: impl Into<String>) -> Diagnostic {
        let detail = detail.into();
        warn!(resource = self.resource, "{}", detail);
        Diagnostic::warning(format!("{} cannot be deleted", self.resource), detail)
    }

    fn failed(&self, op: Operation, source: ClientError) -> ResourceError {
        ResourceError::failed(op, self.resource, source)
    }
}

/// Turn a response with the wrong status into an API error
fn unexpected(response: Response) -> ClientError {
    if response.is_error() {
        return response.into_error();
    }
    ClientError::Api {
        status: response.status().as_u16(),
        message: format!("unexpected response status {}", response.status()),
    }
}

/// Split an import identifier on the first `:`
///
/// Returns the leading part and the optional trailing part; an empty trailing
/// part is treated as absent.
pub fn split_import_id(id: &str) -> (&str, Option<&str>) {
    match id.split_once(':') {
        Some((head, tail)) if !tail.is_empty() => (head, Some(tail)),
        Some((head, _)) => (head, None),
        None => (id, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect() {
        assert!(Expect::for_create(Verb::Post).accepts(StatusCode::CREATED));
        assert!(!Expect::for_create(Verb::Post).accepts(StatusCode::OK));
        assert!(Expect::for_create(Verb::Put).accepts(StatusCode::OK));
        assert!(Expect::for_create(Verb::Put).accepts(StatusCode::NO_CONTENT));
        assert!(!Expect::AnySuccess.accepts(StatusCode::NOT_FOUND));
        assert!(Expect::Status(StatusCode::OK).accepts(StatusCode::OK));
    }

    #[test]
    fn test_split_import_id() {
        assert_eq!(split_import_id("qa"), ("qa", None));
        assert_eq!(split_import_id("proj-qa:proj"), ("proj-qa", Some("proj")));
        assert_eq!(split_import_id("proj-qa:"), ("proj-qa", None));
        assert_eq!(split_import_id(":proj"), ("", Some("proj")));
    }

    #[test]
    fn test_delete_unsupported_is_warning() {
        let meta = ProviderMeta::new(PlatformClient::new("https://platform.example.com").unwrap());
        let adapter = RestAdapter::new(&meta, "platform_lifecycle");
        let diag = adapter.delete_unsupported("removed from state only");

        assert!(!diag.is_error());
        assert_eq!(diag.summary, "platform_lifecycle cannot be deleted");
    }
}
