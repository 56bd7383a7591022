//! Output documents and exit codes

use crate::error::SdkError;
use crate::sanitizer::{sanitize, Sanitized};
use dmnx_core::Context;
use dmnx_runtime::EvaluationResult;
use serde_json::{json, Map, Value as Json};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// The document printed for one invocation and the process exit code
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub document: Json,
    pub exit_code: i32,
}

impl Outcome {
    pub fn success(document: Json) -> Self {
        Self {
            document,
            exit_code: EXIT_SUCCESS,
        }
    }

    /// `{success: false, errors: [...]}` with exit code 1
    pub fn failure(error: &SdkError) -> Self {
        tracing::debug!("invocation failed: {}", error);
        Self {
            document: failure_document(error.messages()),
            exit_code: EXIT_FAILURE,
        }
    }

    /// Pretty-printed document
    pub fn render(&self) -> String {
        serde_json::to_string_pretty(&self.document).unwrap_or_else(|e| {
            failure_document(vec![format!("Failed to render output: {}", e)]).to_string()
        })
    }
}

pub fn failure_document(errors: Vec<String>) -> Json {
    json!({ "success": false, "errors": errors })
}

/// Success or partial-failure document for an evaluation.
///
/// `results` holds every context entry that was not part of the input.
pub fn result_document(result: &EvaluationResult, input: &Context) -> Json {
    let mut decisions = Map::new();
    for decision in &result.decision_results {
        decisions.insert(
            decision.name.clone(),
            json!({
                "result": sanitize(&decision.result).into_json(),
                "status": decision.status.to_string(),
            }),
        );
    }

    let mut results = Map::new();
    for (name, value) in &result.context {
        if input.contains_key(name) {
            continue;
        }
        if let Sanitized::Value(json) = sanitize(value) {
            results.insert(name.clone(), json);
        }
    }

    let mut document = Map::new();
    document.insert("success".to_string(), Json::Bool(!result.has_errors()));
    document.insert("decisions".to_string(), Json::Object(decisions));
    document.insert("results".to_string(), Json::Object(results));
    if result.has_errors() {
        let errors: Vec<Json> = result
            .errors()
            .map(|m| json!({ "message": m.text, "type": m.message_type.to_string() }))
            .collect();
        document.insert("errors".to_string(), Json::Array(errors));
    }
    Json::Object(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmnx_core::{Handle, HandleKind, Message, MessageType, Value};
    use dmnx_runtime::{DecisionResult, EvaluationStatus};
    use std::sync::Arc;

    fn decision(name: &str, status: EvaluationStatus, result: Value) -> DecisionResult {
        DecisionResult {
            name: name.to_string(),
            status,
            result,
        }
    }

    fn input() -> Context {
        let mut ctx = Context::new();
        ctx.insert("age".to_string(), Value::from(25));
        ctx
    }

    #[test]
    fn test_success_document() {
        let mut context = input();
        context.insert("Eligible".to_string(), Value::Bool(true));
        let result = EvaluationResult {
            decision_results: vec![decision("Eligible", EvaluationStatus::Succeeded, Value::Bool(true))],
            messages: vec![],
            context,
        };

        assert_eq!(
            result_document(&result, &input()),
            json!({
                "success": true,
                "decisions": {"Eligible": {"result": true, "status": "SUCCEEDED"}},
                "results": {"Eligible": true}
            })
        );
    }

    #[test]
    fn test_partial_failure_document() {
        let mut context = input();
        context.insert("A".to_string(), Value::from(1));
        context.insert("B".to_string(), Value::Null);
        context.insert(
            "Helper".to_string(),
            Value::Handle(Handle::new(HandleKind::Function, "Helper", Arc::new(()))),
        );
        let result = EvaluationResult {
            decision_results: vec![
                decision("A", EvaluationStatus::Succeeded, Value::from(1)),
                decision("B", EvaluationStatus::Failed, Value::Null),
            ],
            messages: vec![
                Message::warn(MessageType::FeelEvaluationError, "just a warning"),
                Message::error(MessageType::FeelEvaluationError, "B exploded").with_source("B"),
            ],
            context,
        };

        let doc = result_document(&result, &input());
        assert_eq!(doc["success"], json!(false));
        assert_eq!(doc["decisions"]["A"], json!({"result": 1, "status": "SUCCEEDED"}));
        assert_eq!(doc["decisions"]["B"], json!({"result": null, "status": "FAILED"}));
        assert_eq!(doc["results"], json!({"A": 1, "B": null}));
        assert_eq!(
            doc["errors"],
            json!([{"message": "B exploded", "type": "FEEL_EVALUATION_ERROR"}])
        );
    }

    #[test]
    fn test_failure_outcome() {
        let outcome = Outcome::failure(&SdkError::DecisionNotFound("X".to_string()));
        assert_eq!(outcome.exit_code, EXIT_FAILURE);
        assert_eq!(
            outcome.document,
            json!({"success": false, "errors": ["Decision 'X' not found"]})
        );
        assert!(outcome.render().contains("\"success\": false"));
    }
}
