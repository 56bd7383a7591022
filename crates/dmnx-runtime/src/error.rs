//! Runtime error types

use dmnx_core::MessageType;
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Type error
    #[error("Type error: {0}")]
    TypeError(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Unknown function or non-invocable value
    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    /// Wrong argument count or type for a function
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Decision table hit policy violated
    #[error("Hit policy violation: {0}")]
    HitPolicyViolation(String),

    /// Generic runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl RuntimeError {
    /// Diagnostic classification of this error
    pub fn message_type(&self) -> MessageType {
        match self {
            RuntimeError::HitPolicyViolation(_) => MessageType::DecisionTableHitPolicy,
            _ => MessageType::FeelEvaluationError,
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
