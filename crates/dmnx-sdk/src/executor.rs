//! The command pipeline: resolve, compile, select, dispatch, format

use crate::adapter::{DmnEngine, EngineAdapter, ModelCollection};
use crate::config::{ExecutorConfig, RunOptions};
use crate::dispatcher::{dispatch, Target};
use crate::error::{Result, SdkError};
use crate::introspect::describe;
use crate::output::{result_document, Outcome};
use crate::resolver::ResourceResolver;
use crate::selector::select_model;
use dmnx_core::{Context, Value};
use serde_json::Value as Json;

/// Parse the input document. Only a JSON object is accepted.
pub fn parse_input(text: Option<&str>) -> Result<Context> {
    let text = match text.map(str::trim) {
        None | Some("") => return Ok(Context::new()),
        Some(text) => text,
    };
    let json: Json = serde_json::from_str(text).map_err(|e| SdkError::InputParseError(e.to_string()))?;
    match Value::from(json) {
        Value::Context(ctx) => Ok(ctx),
        other => Err(SdkError::InputParseError(format!(
            "input must be a JSON object, got {}",
            other.type_name()
        ))),
    }
}

/// Runs `execute`, `service` and `info` against an engine adapter
pub struct Executor<A: EngineAdapter = DmnEngine> {
    adapter: A,
    config: ExecutorConfig,
}

impl Executor<DmnEngine> {
    pub fn new(config: ExecutorConfig) -> Self {
        Self::with_adapter(DmnEngine::new(), config)
    }
}

impl Default for Executor<DmnEngine> {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

impl<A: EngineAdapter> Executor<A> {
    pub fn with_adapter(adapter: A, config: ExecutorConfig) -> Self {
        Self { adapter, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Evaluate the whole model, one decision, or (with a service name) one service
    pub fn execute(&self, options: &RunOptions) -> Outcome {
        Self::finish(self.evaluate(options))
    }

    /// Evaluate through a decision service. The service name is required.
    pub fn service(&self, options: &RunOptions) -> Outcome {
        if options.service.is_none() {
            return Outcome::failure(&SdkError::MissingArgument(
                "decision service name (--service <name>)".to_string(),
            ));
        }
        self.execute(options)
    }

    /// Describe every loaded model
    pub fn info(&self, options: &RunOptions) -> Outcome {
        Self::finish(
            self.load(options)
                .map(|collection| describe(collection.models())),
        )
    }

    fn finish(result: Result<Json>) -> Outcome {
        match result {
            Ok(document) => Outcome::success(document),
            Err(e) => Outcome::failure(&e),
        }
    }

    fn load(&self, options: &RunOptions) -> Result<Box<dyn ModelCollection>> {
        let resources = ResourceResolver::new(self.config.model_extension.as_str()).resolve(
            &options.model_path,
            &options.imports,
            options.auto_import,
        )?;
        tracing::info!(resources = resources.len(), "compiling models");
        self.adapter.compile(&resources, options.typecheck)
    }

    fn evaluate(&self, options: &RunOptions) -> Result<Json> {
        // a missing model file is reported before bad input
        if !options.model_path.is_file() {
            return Err(SdkError::ResourceNotFound {
                path: options.model_path.clone(),
            });
        }
        let input = parse_input(options.input.as_deref())?;
        let collection = self.load(options)?;

        let model = select_model(
            collection.models(),
            options.model_name.as_deref(),
            &options.model_path,
        )?;
        let target = Target::from_names(options.decision.as_deref(), options.service.as_deref());
        let result = dispatch(collection.as_ref(), model, &input, target)?;

        Ok(result_document(&result, &input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResourceSet;
    use dmnx_core::ast::Definitions;
    use dmnx_core::ir::CompiledModel;
    use dmnx_runtime::{DecisionResult, EvaluationResult, EvaluationStatus};
    use serde_json::json;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Echoes the input back as a single decision named after the model
    struct EchoCollection {
        models: Vec<CompiledModel>,
    }

    impl EchoCollection {
        fn echo(&self, model: usize, context: &Context) -> EvaluationResult {
            let name = self.models[model].name.clone();
            let value = Value::Context(context.clone());
            let mut out = context.clone();
            out.insert(name.clone(), value.clone());
            EvaluationResult {
                decision_results: vec![DecisionResult {
                    name,
                    status: EvaluationStatus::Succeeded,
                    result: value,
                }],
                messages: vec![],
                context: out,
            }
        }
    }

    impl ModelCollection for EchoCollection {
        fn models(&self) -> &[CompiledModel] {
            &self.models
        }

        fn evaluate_all(&self, model: usize, context: &Context) -> EvaluationResult {
            self.echo(model, context)
        }

        fn evaluate_by_name(&self, model: usize, context: &Context, _decision: &str) -> EvaluationResult {
            self.echo(model, context)
        }

        fn evaluate_decision_service(&self, model: usize, context: &Context, _service: &str) -> EvaluationResult {
            self.echo(model, context)
        }
    }

    /// Names one model per resource after its file stem and remembers the calls
    #[derive(Default)]
    struct StubAdapter {
        compiled: RefCell<Vec<(usize, bool)>>,
    }

    impl EngineAdapter for StubAdapter {
        fn compile(&self, resources: &ResourceSet, typecheck: bool) -> Result<Box<dyn ModelCollection>> {
            self.compiled.borrow_mut().push((resources.len(), typecheck));
            let models = resources
                .paths()
                .iter()
                .map(|p| CompiledModel {
                    name: p.file_stem().unwrap().to_string_lossy().into_owned(),
                    namespace: p.display().to_string(),
                    definitions: Definitions::default(),
                    imports: vec![],
                    item_definitions: vec![],
                    inputs: vec![],
                    decisions: vec![],
                    bkms: vec![],
                    services: vec![],
                    messages: vec![],
                })
                .collect();
            Ok(Box::new(EchoCollection { models }))
        }
    }

    fn workspace(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            fs::write(dir.path().join(file), "<definitions/>").unwrap();
        }
        dir
    }

    #[test]
    fn test_parse_input() {
        assert!(parse_input(None).unwrap().is_empty());
        assert!(parse_input(Some("  ")).unwrap().is_empty());
        assert_eq!(parse_input(Some(r#"{"age": 25}"#)).unwrap()["age"], Value::from(25));
        assert!(matches!(parse_input(Some("[1]")), Err(SdkError::InputParseError(_))));
        assert!(matches!(parse_input(Some("{oops")), Err(SdkError::InputParseError(_))));
    }

    #[test]
    fn test_execute_selects_model_by_file_name() {
        let dir = workspace(&["alpha.dmn", "main.dmn"]);
        let executor = Executor::with_adapter(StubAdapter::default(), ExecutorConfig::default());
        let options = RunOptions::new(dir.path().join("main.dmn")).with_input(r#"{"x": 1}"#);

        let outcome = executor.execute(&options);
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(
            outcome.document,
            json!({
                "success": true,
                "decisions": {"main": {"result": {"x": 1}, "status": "SUCCEEDED"}},
                "results": {"main": {"x": 1}}
            })
        );
    }

    #[test]
    fn test_typecheck_flag_reaches_adapter() {
        let dir = workspace(&["main.dmn", "other.dmn"]);
        let executor = Executor::with_adapter(StubAdapter::default(), ExecutorConfig::default());
        let mut options = RunOptions::new(dir.path().join("main.dmn"));
        options.typecheck = false;
        options.auto_import = false;

        executor.execute(&options);
        assert_eq!(*executor.adapter.compiled.borrow(), vec![(1, false)]);
    }

    #[test]
    fn test_missing_file_wins_over_bad_input() {
        let dir = workspace(&[]);
        let executor = Executor::with_adapter(StubAdapter::default(), ExecutorConfig::default());
        let options = RunOptions::new(dir.path().join("missing.dmn")).with_input("not json");

        let outcome = executor.execute(&options);
        assert_eq!(outcome.exit_code, 1);
        let errors = outcome.document["errors"].as_array().unwrap();
        assert!(errors[0].as_str().unwrap().contains("missing.dmn"));
        assert!(executor.adapter.compiled.borrow().is_empty());
    }

    #[test]
    fn test_bad_input_is_not_compiled() {
        let dir = workspace(&["main.dmn"]);
        let executor = Executor::with_adapter(StubAdapter::default(), ExecutorConfig::default());
        let outcome = executor.execute(&RunOptions::new(dir.path().join("main.dmn")).with_input("42"));

        assert_eq!(outcome.exit_code, 1);
        assert_eq!(outcome.document["success"], json!(false));
        assert!(executor.adapter.compiled.borrow().is_empty());
    }

    #[test]
    fn test_service_requires_name() {
        let dir = workspace(&["main.dmn"]);
        let executor = Executor::with_adapter(StubAdapter::default(), ExecutorConfig::default());
        let outcome = executor.service(&RunOptions::new(dir.path().join("main.dmn")));

        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.document["errors"][0]
            .as_str()
            .unwrap()
            .contains("--service"));
    }

    #[test]
    fn test_unknown_service_lists_none() {
        let dir = workspace(&["main.dmn"]);
        let executor = Executor::with_adapter(StubAdapter::default(), ExecutorConfig::default());
        let options = RunOptions::new(dir.path().join("main.dmn")).with_service("Ghost");

        let outcome = executor.service(&options);
        assert_eq!(outcome.exit_code, 1);
        assert_eq!(
            outcome.document["errors"][0],
            json!("Decision service 'Ghost' not found. Available: none")
        );
    }

    #[test]
    fn test_info_lists_all_models() {
        let dir = workspace(&["main.dmn", "b.dmn", "a.dmn"]);
        let executor = Executor::with_adapter(StubAdapter::default(), ExecutorConfig::default());

        let outcome = executor.info(&RunOptions::new(dir.path().join("main.dmn")));
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.document["modelsLoaded"], json!(3));
        let names: Vec<&str> = outcome.document["models"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["main", "a", "b"]);
    }

    #[test]
    fn test_explicit_model_name_not_found() {
        let dir = workspace(&["main.dmn"]);
        let executor = Executor::with_adapter(StubAdapter::default(), ExecutorConfig::default());
        let options = RunOptions::new(dir.path().join("main.dmn")).with_model_name("Other");

        let outcome = executor.execute(&options);
        assert_eq!(outcome.exit_code, 1);
        assert_eq!(outcome.document["errors"][0], json!("Could not find model 'Other'"));
    }
}
