//! SDK error types

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline failures. Each one ends the invocation with the failure document.
#[derive(Error, Debug)]
pub enum SdkError {
    /// Main model file does not exist
    #[error("Model file not found: {}", path.display())]
    ResourceNotFound { path: PathBuf },

    /// Input is not a JSON object
    #[error("Invalid input JSON: {0}")]
    InputParseError(String),

    /// No runtime could be built from the resources
    #[error("Failed to compile models: {0}")]
    CompilationFailed(String),

    /// Selection found no model
    #[error("Could not find model '{0}'")]
    ModelNotFound(String),

    /// Selected model compiled with structural errors
    #[error("Model '{name}' has errors")]
    ModelHasErrors { name: String, messages: Vec<String> },

    #[error("Decision '{0}' not found")]
    DecisionNotFound(String),

    #[error("Decision service '{name}' not found. Available: {}", list(.available))]
    ServiceNotFound { name: String, available: Vec<String> },

    /// A command was invoked without a required option
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn list(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

impl SdkError {
    /// Texts for the `errors` array of the failure document
    pub fn messages(&self) -> Vec<String> {
        match self {
            SdkError::ModelHasErrors { messages, .. } if !messages.is_empty() => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

impl From<config::ConfigError> for SdkError {
    fn from(e: config::ConfigError) -> Self {
        SdkError::Config(e.to_string())
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_not_found_mentions_path() {
        let error = SdkError::ResourceNotFound {
            path: PathBuf::from("/models/missing.dmn"),
        };
        assert!(error.to_string().contains("/models/missing.dmn"));
        assert_eq!(error.messages().len(), 1);
    }

    #[test]
    fn test_service_not_found_lists_available() {
        let error = SdkError::ServiceNotFound {
            name: "Nonexistent".to_string(),
            available: vec!["Scoring".to_string(), "Routing".to_string()],
        };
        let text = error.to_string();
        assert!(text.contains("'Nonexistent'"));
        assert!(text.contains("Scoring, Routing"));

        let none = SdkError::ServiceNotFound {
            name: "X".to_string(),
            available: vec![],
        };
        assert!(none.to_string().ends_with("Available: none"));
    }

    #[test]
    fn test_model_has_errors_messages() {
        let error = SdkError::ModelHasErrors {
            name: "Loan".to_string(),
            messages: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(error.messages(), vec!["first", "second"]);

        let empty = SdkError::ModelHasErrors {
            name: "Loan".to_string(),
            messages: vec![],
        };
        assert_eq!(empty.messages(), vec!["Model 'Loan' has errors"]);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let sdk_error: SdkError = io_error.into();
        assert!(sdk_error.to_string().contains("I/O error"));
        assert!(sdk_error.to_string().contains("gone"));
    }
}
