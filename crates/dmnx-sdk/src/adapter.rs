//! Engine adapter: the only place the SDK touches the compiler and runtime

use crate::error::{Result, SdkError};
use crate::resolver::ResourceSet;
use dmnx_compiler::Compiler;
use dmnx_core::ir::CompiledModel;
use dmnx_core::Context;
use dmnx_parser::DmnParser;
use dmnx_runtime::{DmnRuntime, EvaluationResult, RuntimeOptions};

/// Compiled models ready for evaluation
pub trait ModelCollection {
    /// Models in load order
    fn models(&self) -> &[CompiledModel];

    fn evaluate_all(&self, model: usize, context: &Context) -> EvaluationResult;

    fn evaluate_by_name(&self, model: usize, context: &Context, decision: &str) -> EvaluationResult;

    fn evaluate_decision_service(&self, model: usize, context: &Context, service: &str) -> EvaluationResult;
}

/// Turns a resource set into a model collection
pub trait EngineAdapter {
    /// Compile every resource together. `typecheck` enables input and result type checks.
    fn compile(&self, resources: &ResourceSet, typecheck: bool) -> Result<Box<dyn ModelCollection>>;
}

impl ModelCollection for DmnRuntime {
    fn models(&self) -> &[CompiledModel] {
        DmnRuntime::models(self)
    }

    fn evaluate_all(&self, model: usize, context: &Context) -> EvaluationResult {
        DmnRuntime::evaluate_all(self, model, context)
    }

    fn evaluate_by_name(&self, model: usize, context: &Context, decision: &str) -> EvaluationResult {
        DmnRuntime::evaluate_by_name(self, model, context, decision)
    }

    fn evaluate_decision_service(&self, model: usize, context: &Context, service: &str) -> EvaluationResult {
        DmnRuntime::evaluate_decision_service(self, model, context, service)
    }
}

/// Production adapter over `dmnx-parser`, `dmnx-compiler` and `dmnx-runtime`
#[derive(Debug, Clone, Default)]
pub struct DmnEngine {
    compiler: Compiler,
}

impl DmnEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compiler(compiler: Compiler) -> Self {
        Self { compiler }
    }
}

impl EngineAdapter for DmnEngine {
    fn compile(&self, resources: &ResourceSet, typecheck: bool) -> Result<Box<dyn ModelCollection>> {
        let mut definitions = Vec::with_capacity(resources.len());
        for path in resources.paths() {
            let parsed = DmnParser::parse_file(path).map_err(|e| {
                SdkError::CompilationFailed(format!("{}: {}", path.display(), e))
            })?;
            tracing::debug!("Parsed model '{}' from {}", parsed.name, path.display());
            definitions.push(parsed);
        }

        let models = self
            .compiler
            .compile(definitions)
            .map_err(|e| SdkError::CompilationFailed(e.to_string()))?;
        tracing::info!(models = models.len(), typecheck, "models compiled");

        Ok(Box::new(DmnRuntime::new(models, RuntimeOptions { typecheck })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MODEL: &str = r##"<definitions name="Greeting" namespace="urn:greeting">
      <inputData id="i_name" name="Name"><variable name="Name" typeRef="string"/></inputData>
      <decision id="d_hello" name="Hello">
        <informationRequirement><requiredInput href="#i_name"/></informationRequirement>
        <literalExpression><text>"Hello " + Name</text></literalExpression>
      </decision>
    </definitions>"##;

    fn resources(dir: &TempDir, files: &[(&str, &str)]) -> ResourceSet {
        let mut set = ResourceSet::new();
        for (name, content) in files {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            set.insert(&path).unwrap();
        }
        set
    }

    #[test]
    fn test_compile_and_evaluate() {
        let dir = TempDir::new().unwrap();
        let set = resources(&dir, &[("greeting.dmn", MODEL)]);
        let collection = DmnEngine::new().compile(&set, true).unwrap();

        assert_eq!(collection.models().len(), 1);
        assert_eq!(collection.models()[0].name, "Greeting");

        let mut context = Context::new();
        context.insert("Name".to_string(), "Ada".into());
        let result = collection.evaluate_all(0, &context);
        assert_eq!(result.decision_results[0].result, "Hello Ada".into());
    }

    #[test]
    fn test_malformed_resource_fails_compilation() {
        let dir = TempDir::new().unwrap();
        let set = resources(&dir, &[("broken.dmn", "<definitions")]);
        let err = DmnEngine::new().compile(&set, true).err().expect("compilation should fail");

        assert!(matches!(err, SdkError::CompilationFailed(_)));
        assert!(err.to_string().contains("broken.dmn"));
    }

    #[test]
    fn test_duplicate_namespace_fails_compilation() {
        let dir = TempDir::new().unwrap();
        let set = resources(&dir, &[("a.dmn", MODEL), ("b.dmn", MODEL)]);
        let err = DmnEngine::new().compile(&set, true).err().expect("compilation should fail");
        assert!(matches!(err, SdkError::CompilationFailed(_)));
    }
}
