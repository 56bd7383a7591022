//! Compiler error types

use thiserror::Error;

/// Compiler error
#[derive(Error, Debug)]
pub enum CompileError {
    /// Two loaded documents declare the same namespace
    #[error("Duplicate model namespace '{namespace}' ({first} and {second})")]
    DuplicateNamespace {
        namespace: String,
        first: String,
        second: String,
    },

    /// Invalid expression
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// Generic compilation error
    #[error("Compilation error: {0}")]
    CompileError(String),
}

impl From<dmnx_parser::ParseError> for CompileError {
    fn from(err: dmnx_parser::ParseError) -> Self {
        CompileError::InvalidExpression(err.to_string())
    }
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
