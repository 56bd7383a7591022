//! Error types for dmnx Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Opaque {0} cannot be serialized")]
    OpaqueHandle(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
