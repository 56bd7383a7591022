//! Execution dispatch: whole model, one decision or one decision service

use crate::adapter::ModelCollection;
use crate::error::{Result, SdkError};
use dmnx_core::Context;
use dmnx_runtime::EvaluationResult;

/// What to evaluate in the target model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    All,
    Decision(&'a str),
    Service(&'a str),
}

impl<'a> Target<'a> {
    /// A service name wins over a decision name
    pub fn from_names(decision: Option<&'a str>, service: Option<&'a str>) -> Self {
        match (service, decision) {
            (Some(service), _) => Target::Service(service),
            (None, Some(decision)) => Target::Decision(decision),
            (None, None) => Target::All,
        }
    }
}

/// Evaluate `target` in model `model` once.
///
/// Per-decision failures come back inside the result. Only an errored
/// model or an unknown decision/service name is an `Err`.
pub fn dispatch(
    collection: &dyn ModelCollection,
    model: usize,
    context: &Context,
    target: Target<'_>,
) -> Result<EvaluationResult> {
    let compiled = collection
        .models()
        .get(model)
        .ok_or_else(|| SdkError::ModelNotFound(format!("#{}", model)))?;

    if compiled.has_errors() {
        return Err(SdkError::ModelHasErrors {
            name: compiled.name.clone(),
            messages: compiled.messages.iter().map(|m| m.text.clone()).collect(),
        });
    }

    tracing::info!(model = %compiled.name, ?target, "evaluating");
    let result = match target {
        Target::All => collection.evaluate_all(model, context),
        Target::Decision(name) => {
            if compiled.decision_by_name(name).is_none() {
                return Err(SdkError::DecisionNotFound(name.to_string()));
            }
            collection.evaluate_by_name(model, context, name)
        }
        Target::Service(name) => {
            if compiled.service_by_name(name).is_none() {
                return Err(SdkError::ServiceNotFound {
                    name: name.to_string(),
                    available: compiled.services.iter().map(|s| s.name.clone()).collect(),
                });
            }
            collection.evaluate_decision_service(model, context, name)
        }
    };

    if result.has_errors() {
        tracing::info!(
            errors = result.errors().count(),
            "evaluation finished with errors"
        );
    }
    Ok(result)
}
