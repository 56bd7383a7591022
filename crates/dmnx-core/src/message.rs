//! Diagnostics reported by the compiler and the runtime

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warn,
    Info,
}

/// Message classification, rendered as SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// A requirement href does not resolve to a node
    ReqNotFound,
    /// An import namespace matches no loaded model
    ImportNotFound,
    /// Two nodes in one model share a name
    DuplicateName,
    /// Decisions depend on each other in a loop
    RequirementCycle,
    /// A decision or BKM has no logic
    MissingExpression,
    /// FEEL text failed to parse
    FeelSyntaxError,
    /// FEEL text refers to a name that is not in scope
    UnknownVariable,
    /// Unknown typeRef
    TypeDefNotFound,
    /// FEEL evaluation raised an error
    FeelEvaluationError,
    /// Decision table hit policy was violated
    DecisionTableHitPolicy,
    /// A required dependency failed or was skipped
    DependencyFailed,
    /// An input value does not conform to its declared type
    ReqDepInvalidType,
    /// A decision result does not conform to its declared type
    ErrorEvalNodeResultWrongType,
    /// Named decision does not exist
    DecisionNotFound,
    /// Named decision service does not exist
    DecisionServiceNotFound,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        f.write_str(&name)
    }
}

/// A severity-tagged diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub severity: Severity,
    pub message_type: MessageType,
    pub text: String,
    /// Name of the node the message is about, if any
    #[serde(default)]
    pub source: Option<String>,
}

impl Message {
    pub fn error(message_type: MessageType, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message_type,
            text: text.into(),
            source: None,
        }
    }

    pub fn warn(message_type: MessageType, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warn,
            message_type,
            text: text.into(),
            source: None,
        }
    }

    /// Attach the node name the message refers to
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
