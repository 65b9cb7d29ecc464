//! Core error types

use thiserror::Error;

use crate::path::AttributePath;

/// Errors converting between host values and typed records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: AttributePath,
        expected: String,
        found: String,
    },

    #[error("value at {path} is not yet known")]
    UnknownValue { path: AttributePath },

    #[error("failed to decode record: {message}")]
    Decode { message: String },

    #[error("failed to encode record: {message}")]
    Encode { message: String },
}

pub type Result<T> = std::result::Result<T, BridgeError>;
