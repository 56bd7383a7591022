//! Type conformance of values against declared `typeRef`s

use crate::engine::Evaluator;
use crate::error::Result;
use crate::runtime::DmnRuntime;
use dmnx_core::ast::ItemDefinition;
use dmnx_core::{Context, Value};
use dmnx_parser::ExpressionParser;

/// Nesting limit for self-referencing item definitions
const MAX_TYPE_DEPTH: usize = 32;

/// Checks values against the types declared in one model
pub(crate) struct TypeChecker<'r> {
    runtime: &'r DmnRuntime,
}

impl<'r> TypeChecker<'r> {
    pub(crate) fn new(runtime: &'r DmnRuntime) -> Self {
        Self { runtime }
    }

    /// Returns true if `value` conforms to `type_ref` as seen from `model`
    pub(crate) fn conforms(&self, model: usize, type_ref: &str, value: &Value) -> Result<bool> {
        self.conforms_to(model, type_ref, value, 0)
    }

    fn conforms_to(&self, model: usize, type_ref: &str, value: &Value, depth: usize) -> Result<bool> {
        if value.is_null() || depth > MAX_TYPE_DEPTH {
            return Ok(true);
        }
        if let Some(result) = builtin_conforms(type_ref, value) {
            return Ok(result);
        }
        match self.resolve(model, type_ref) {
            Some((owner, def)) => self.conforms_item(owner, def, value, depth + 1, false),
            // unresolved types are reported at compile time
            None => Ok(true),
        }
    }

    fn resolve(&self, model: usize, type_ref: &str) -> Option<(usize, &'r ItemDefinition)> {
        let models = self.runtime.models();
        let compiled = models.get(model)?;
        if let Some(def) = compiled.item_definition(type_ref) {
            return Some((model, def));
        }
        let (alias, name) = type_ref.split_once('.')?;
        let import = compiled.imports.iter().find(|i| i.alias == alias)?;
        models
            .get(import.model)?
            .item_definition(name)
            .map(|def| (import.model, def))
    }

    fn conforms_item(
        &self,
        model: usize,
        def: &ItemDefinition,
        value: &Value,
        depth: usize,
        element: bool,
    ) -> Result<bool> {
        if value.is_null() {
            return Ok(true);
        }

        if def.is_collection && !element {
            let Value::List(items) = value else {
                return Ok(false);
            };
            for item in items {
                if !self.conforms_item(model, def, item, depth, true)? {
                    return Ok(false);
                }
            }
            return Ok(true);
        }

        if !def.components.is_empty() {
            let Value::Context(ctx) = value else {
                return Ok(false);
            };
            for component in &def.components {
                let field = ctx.get(&component.name).unwrap_or(&Value::Null);
                if !self.conforms_item(model, component, field, depth + 1, false)? {
                    return Ok(false);
                }
            }
        } else if let Some(type_ref) = &def.type_ref {
            if !self.conforms_to(model, type_ref, value, depth + 1)? {
                return Ok(false);
            }
        }

        match &def.allowed_values {
            Some(text) => self.allowed(text, value),
            None => Ok(true),
        }
    }

    fn allowed(&self, text: &str, value: &Value) -> Result<bool> {
        let tests = match ExpressionParser::parse_unary_tests(text) {
            Ok(tests) => tests,
            Err(e) => {
                tracing::warn!("Ignoring unparsable allowed values '{}': {}", text, e);
                return Ok(true);
            }
        };
        Evaluator::new(self.runtime, Context::new()).satisfies(value, &tests)
    }
}

/// Conformance to a FEEL built-in type, or `None` for other names
fn builtin_conforms(type_ref: &str, value: &Value) -> Option<bool> {
    let conforms = match type_ref {
        "Any" => true,
        "string" => matches!(value, Value::String(_)),
        "number" => matches!(value, Value::Number(_)),
        "boolean" => matches!(value, Value::Bool(_)),
        "context" => matches!(value, Value::Context(_)),
        "list" => matches!(value, Value::List(_)),
        "function" => value.is_handle(),
        // temporal values travel as strings
        "date" | "time" | "date and time" | "dateTime" | "duration" | "dayTimeDuration"
        | "yearMonthDuration" | "days and time duration" | "years and months duration" => {
            matches!(value, Value::String(_))
        }
        _ => return None,
    };
    Some(conforms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RuntimeOptions;
    use dmnx_core::ast::Definitions;
    use dmnx_core::ir::CompiledModel;
    use serde_json::json;

    fn runtime_with(item_definitions: Vec<ItemDefinition>) -> DmnRuntime {
        let model = CompiledModel {
            name: "m".to_string(),
            namespace: "urn:m".to_string(),
            definitions: Definitions::default(),
            imports: vec![],
            item_definitions,
            inputs: vec![],
            decisions: vec![],
            bkms: vec![],
            services: vec![],
            messages: vec![],
        };
        DmnRuntime::new(vec![model], RuntimeOptions::default())
    }

    fn item(name: &str, type_ref: Option<&str>) -> ItemDefinition {
        ItemDefinition {
            name: name.to_string(),
            type_ref: type_ref.map(str::to_string),
            ..ItemDefinition::default()
        }
    }

    #[test]
    fn test_builtin_types() {
        let runtime = runtime_with(vec![]);
        let checker = TypeChecker::new(&runtime);
        assert!(checker.conforms(0, "number", &Value::from(1)).unwrap());
        assert!(!checker.conforms(0, "number", &Value::from("1")).unwrap());
        assert!(checker.conforms(0, "string", &Value::Null).unwrap());
        assert!(checker.conforms(0, "date", &Value::from("2024-01-01")).unwrap());
    }

    #[test]
    fn test_structured_and_collection_types() {
        let mut applicant = item("tApplicant", None);
        applicant.components = vec![item("age", Some("number")), item("name", Some("string"))];
        let mut ages = item("tAges", Some("number"));
        ages.is_collection = true;
        let runtime = runtime_with(vec![applicant, ages]);
        let checker = TypeChecker::new(&runtime);

        let ok = Value::from(json!({"age": 30, "name": "Ann"}));
        let bad = Value::from(json!({"age": "thirty"}));
        assert!(checker.conforms(0, "tApplicant", &ok).unwrap());
        assert!(!checker.conforms(0, "tApplicant", &bad).unwrap());
        assert!(checker.conforms(0, "tAges", &Value::from(json!([1, 2]))).unwrap());
        assert!(!checker.conforms(0, "tAges", &Value::from(json!([1, "x"]))).unwrap());
    }

    #[test]
    fn test_allowed_values() {
        let mut risk = item("tRisk", Some("string"));
        risk.allowed_values = Some(r#""Low","High""#.to_string());
        let runtime = runtime_with(vec![risk]);
        let checker = TypeChecker::new(&runtime);
        assert!(checker.conforms(0, "tRisk", &Value::from("Low")).unwrap());
        assert!(!checker.conforms(0, "tRisk", &Value::from("Medium")).unwrap());
    }
}
