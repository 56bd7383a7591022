//! Evaluation results

use dmnx_core::{Context, Message, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Evaluation status of one decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationStatus {
    Succeeded,
    /// A dependency failed, so the decision was not attempted
    Skipped,
    /// The decision's own logic raised an error
    Failed,
    /// The decision has no logic to evaluate
    NotEvaluated,
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvaluationStatus::Succeeded => "SUCCEEDED",
            EvaluationStatus::Skipped => "SKIPPED",
            EvaluationStatus::Failed => "FAILED",
            EvaluationStatus::NotEvaluated => "NOT_EVALUATED",
        };
        f.write_str(s)
    }
}

/// Outcome of one decision
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionResult {
    pub name: String,
    pub status: EvaluationStatus,
    /// `Value::Null` unless the decision succeeded
    pub result: Value,
}

impl DecisionResult {
    pub fn succeeded(&self) -> bool {
        self.status == EvaluationStatus::Succeeded
    }
}

/// Everything one evaluation call produced
#[derive(Debug, Clone, Default)]
pub struct EvaluationResult {
    /// Evaluated decisions, in evaluation order
    pub decision_results: Vec<DecisionResult>,
    pub messages: Vec<Message>,
    /// Inputs plus every computed value
    pub context: Context,
}

impl EvaluationResult {
    /// Returns true if any error message was recorded
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(Message::is_error)
    }

    pub fn decision_result(&self, name: &str) -> Option<&DecisionResult> {
        self.decision_results.iter().find(|r| r.name == name)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmnx_core::MessageType;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_value(EvaluationStatus::NotEvaluated).unwrap(),
            serde_json::json!("NOT_EVALUATED")
        );
        assert_eq!(EvaluationStatus::Succeeded.to_string(), "SUCCEEDED");
    }

    #[test]
    fn test_has_errors() {
        let mut result = EvaluationResult::default();
        assert!(!result.has_errors());
        result
            .messages
            .push(Message::warn(MessageType::DependencyFailed, "skipped"));
        assert!(!result.has_errors());
        result
            .messages
            .push(Message::error(MessageType::FeelEvaluationError, "boom"));
        assert!(result.has_errors());
        assert_eq!(result.errors().count(), 1);
    }
}
