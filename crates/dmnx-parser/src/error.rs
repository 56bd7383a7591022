//! Parser error types

use thiserror::Error;

/// Parser error
#[derive(Error, Debug)]
pub enum ParseError {
    /// XML is not well-formed
    #[error("XML parsing error: {0}")]
    XmlError(#[from] roxmltree::Error),

    /// Well-formed XML that is not a DMN document
    #[error("Invalid DMN document: {0}")]
    InvalidDocument(String),

    /// Missing required attribute
    #[error("Missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    /// Invalid attribute value
    #[error("Invalid value for attribute '{attribute}': {message}")]
    InvalidValue { attribute: String, message: String },

    /// Invalid expression syntax
    #[error("Invalid expression syntax: {0}")]
    InvalidExpression(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
