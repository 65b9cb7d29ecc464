//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use std::path::Path;

use miette::Diagnostic;
use platform_client::ClientError;
use platform_resources::{ErrorKind, ResourceError};
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Configuration has validation errors
    #[error("Validation failed: {message}")]
    #[diagnostic(code(platform::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Resource operation failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resource(#[from] ResourceError),

    /// Provider could not be configured
    #[error("Invalid provider configuration: {source}")]
    #[diagnostic(code(platform::cli::provider))]
    Provider {
        #[source]
        source: ClientError,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {path}: {message}")]
    #[diagnostic(code(platform::cli::io))]
    Io { path: String, message: String },

    /// Input file is not valid JSON, or does not fit the schema
    #[error("Invalid input in {path}: {message}")]
    #[diagnostic(code(platform::cli::input))]
    Input { path: String, message: String },

    /// Invalid arguments or options
    #[error("{message}")]
    #[diagnostic(code(platform::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Resource(err) => match err.kind() {
                ErrorKind::ConfigInvalid => exit_codes::VALIDATION_ERROR,
                ErrorKind::Transport | ErrorKind::ApiError | ErrorKind::NotFoundOnUpdate => {
                    exit_codes::API_ERROR
                }
                ErrorKind::Internal => exit_codes::ERROR,
            },
            CliError::Provider { .. } | CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Input { .. } => exit_codes::ERROR,
        }
    }

    /// Create a validation error with help text
    pub fn validation_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn provider(source: ClientError) -> Self {
        let help = match &source {
            ClientError::InvalidRequest { .. } => {
                Some("pass --url (or PLATFORM_URL) as an http:// or https:// URL".to_string())
            }
            ClientError::Transport { .. } => {
                Some("check that the platform is reachable, or pass --access-version".to_string())
            }
            _ => None,
        };
        Self::Provider { source, help }
    }

    pub fn usage(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an IO error for `path`
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub fn input(path: &Path, message: impl Into<String>) -> Self {
        Self::Input {
            path: path.display().to_string(),
            message: message.into(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use platform_resources::Operation;

    #[test]
    fn test_exit_codes() {
        let api = CliError::from(ResourceError::failed(
            Operation::Delete,
            "platform_lifecycle_stage",
            ClientError::Api {
                status: 400,
                message: "in use".to_string(),
            },
        ));
        assert_eq!(api.exit_code(), exit_codes::API_ERROR);

        let config = CliError::from(ResourceError::config(
            "platform_lifecycle",
            Default::default(),
        ));
        assert_eq!(config.exit_code(), exit_codes::VALIDATION_ERROR);

        let io = CliError::io(
            Path::new("state.json"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert_eq!(io.exit_code(), exit_codes::IO_ERROR);
    }

    #[test]
    fn test_provider_help() {
        let err = CliError::provider(ClientError::InvalidRequest {
            message: "unsupported URL scheme 'ftp'".to_string(),
        });
        assert_eq!(err.exit_code(), exit_codes::USAGE_ERROR);
        assert!(matches!(err, CliError::Provider { help: Some(_), .. }));
    }
}
