//! Result sanitization
//!
//! Evaluation contexts can hold opaque engine handles (BKM functions,
//! decision service entry points). They have no JSON form and their
//! payloads may reference each other in cycles, so they are never
//! descended into: each handle becomes [`Sanitized::Elided`] and is then
//! removed from whatever list or context contained it.

use dmnx_core::Value;
use serde_json::{Map, Value as Json};

/// Outcome of sanitizing one value
#[derive(Debug, Clone, PartialEq)]
pub enum Sanitized {
    /// Remove this value from its container
    Elided,
    Value(Json),
}

impl Sanitized {
    /// JSON form, with an elided value rendered as `null`
    pub fn into_json(self) -> Json {
        match self {
            Sanitized::Elided => Json::Null,
            Sanitized::Value(json) => json,
        }
    }
}

/// Recursively convert a value into plain JSON without handles.
///
/// A non-empty list or context whose every element was elided is itself
/// elided, so removal propagates outward. Nulls are kept.
pub fn sanitize(value: &Value) -> Sanitized {
    match value {
        Value::Handle(_) => Sanitized::Elided,
        Value::Null => Sanitized::Value(Json::Null),
        Value::Bool(b) => Sanitized::Value(Json::Bool(*b)),
        Value::Number(n) => Sanitized::Value(Value::number_to_json(n)),
        Value::String(s) => Sanitized::Value(Json::String(s.clone())),
        Value::List(items) => {
            let kept: Vec<Json> = items
                .iter()
                .filter_map(|item| match sanitize(item) {
                    Sanitized::Value(json) => Some(json),
                    Sanitized::Elided => None,
                })
                .collect();
            if kept.is_empty() && !items.is_empty() {
                Sanitized::Elided
            } else {
                Sanitized::Value(Json::Array(kept))
            }
        }
        Value::Context(ctx) => {
            let mut kept = Map::new();
            for (key, item) in ctx {
                if let Sanitized::Value(json) = sanitize(item) {
                    kept.insert(key.clone(), json);
                }
            }
            if kept.is_empty() && !ctx.is_empty() {
                Sanitized::Elided
            } else {
                Sanitized::Value(Json::Object(kept))
            }
        }
    }
}
