//! Error types for resource operations

use miette::Diagnostic;
use platform_client::ClientError;
use platform_core::{BridgeError, Diagnostics};
use thiserror::Error;

/// Result type for resource operations
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Which lifecycle operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

/// Coarse error classes surfaced to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigInvalid,
    Transport,
    ApiError,
    NotFoundOnUpdate,
    Internal,
}

/// Errors that can occur while running a resource operation
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum ResourceError {
    /// Validation refused the configuration before any HTTP call
    #[error("invalid configuration for {resource}: {diagnostics}")]
    #[diagnostic(code(platform::resource::config))]
    ConfigInvalid {
        resource: String,
        diagnostics: Diagnostics,
    },

    #[error("failed to create {resource}: {source}")]
    #[diagnostic(code(platform::resource::create))]
    FailedToCreate {
        resource: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to refresh {resource}: {source}")]
    #[diagnostic(code(platform::resource::refresh))]
    FailedToRefresh {
        resource: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to update {resource}: {source}")]
    #[diagnostic(code(platform::resource::update))]
    FailedToUpdate {
        resource: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to delete {resource}: {source}")]
    #[diagnostic(code(platform::resource::delete))]
    FailedToDelete {
        resource: String,
        #[source]
        source: ClientError,
    },

    /// The scope-verification read before an update found nothing
    #[error("{kind} '{name}' does not exist in {scope} scope")]
    #[diagnostic(
        code(platform::resource::missing_in_scope),
        help("refusing to update a same-named {kind} in another scope; check project_key")
    )]
    MissingInScope {
        kind: &'static str,
        name: String,
        scope: String,
    },

    #[error("invalid import identifier '{id}' for {resource}: expected {expected}")]
    #[diagnostic(code(platform::resource::import))]
    InvalidImportId {
        resource: String,
        id: String,
        expected: &'static str,
    },

    #[error("unknown resource type '{name}'")]
    #[diagnostic(code(platform::provider::unknown_type))]
    UnknownResourceType {
        name: String,
        #[help]
        help: Option<String>,
    },

    #[error("state conversion failed for {resource}: {source}")]
    #[diagnostic(code(platform::resource::state))]
    Bridge {
        resource: String,
        #[source]
        source: BridgeError,
    },
}

impl ResourceError {
    /// Wrap a client error for the operation that produced it
    pub fn failed(op: Operation, resource: &str, source: ClientError) -> Self {
        let resource = resource.to_string();
        match op {
            Operation::Create => ResourceError::FailedToCreate { resource, source },
            Operation::Read => ResourceError::FailedToRefresh { resource, source },
            Operation::Update => ResourceError::FailedToUpdate { resource, source },
            Operation::Delete => ResourceError::FailedToDelete { resource, source },
        }
    }

    pub fn bridge(resource: &str, source: BridgeError) -> Self {
        ResourceError::Bridge {
            resource: resource.to_string(),
            source,
        }
    }

    pub fn config(resource: &str, diagnostics: Diagnostics) -> Self {
        ResourceError::ConfigInvalid {
            resource: resource.to_string(),
            diagnostics,
        }
    }

    /// Underlying client error, if any
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            ResourceError::FailedToCreate { source, .. }
            | ResourceError::FailedToRefresh { source, .. }
            | ResourceError::FailedToUpdate { source, .. }
            | ResourceError::FailedToDelete { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ResourceError::ConfigInvalid { .. }
            | ResourceError::InvalidImportId { .. }
            | ResourceError::UnknownResourceType { .. } => ErrorKind::ConfigInvalid,
            ResourceError::MissingInScope { .. } => ErrorKind::NotFoundOnUpdate,
            ResourceError::Bridge { .. } => ErrorKind::Internal,
            _ => match self.client_error() {
                Some(e) if e.is_transport() => ErrorKind::Transport,
                _ => ErrorKind::ApiError,
            },
        }
    }

    /// HTTP status reported by the platform, if any
    pub fn status(&self) -> Option<u16> {
        self.client_error().and_then(ClientError::status)
    }
}
