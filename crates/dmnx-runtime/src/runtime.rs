//! Decision runtime
//!
//! Evaluates compiled models against an input context. Decisions are
//! evaluated lazily in dependency order and memoised per call.

use crate::engine::{Callable, Evaluator};
use crate::error::{Result, RuntimeError};
use crate::result::{DecisionResult, EvaluationResult, EvaluationStatus};
use crate::typecheck::TypeChecker;
use dmnx_core::ir::{CompiledModel, Dependency, FunctionLogic, NodeKind, NodeRef};
use dmnx_core::{Context, Message, MessageType, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// Runtime options
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Check inputs and decision results against their declared types
    pub typecheck: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self { typecheck: true }
    }
}

/// Evaluates decisions of a compiled model collection
#[derive(Debug)]
pub struct DmnRuntime {
    models: Vec<CompiledModel>,
    options: RuntimeOptions,
}

impl DmnRuntime {
    /// Create a runtime over compiled models
    pub fn new(models: Vec<CompiledModel>, options: RuntimeOptions) -> Self {
        Self { models, options }
    }

    /// All loaded models, in load order
    pub fn models(&self) -> &[CompiledModel] {
        &self.models
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Evaluate every decision of `model`
    pub fn evaluate_all(&self, model: usize, context: &Context) -> EvaluationResult {
        let Some(compiled) = self.models.get(model) else {
            return missing_model(model);
        };
        debug!(model = %compiled.name, "evaluating all decisions");

        let mut session = Session::new(self, model, context.clone());
        for index in 0..compiled.decisions.len() {
            session.decision(NodeRef {
                model,
                kind: NodeKind::Decision,
                index,
            });
        }
        session.finish()
    }

    /// Evaluate one decision of `model` (and whatever it requires)
    pub fn evaluate_by_name(&self, model: usize, context: &Context, name: &str) -> EvaluationResult {
        let Some(compiled) = self.models.get(model) else {
            return missing_model(model);
        };
        let Some((index, _)) = compiled.decision_by_name(name) else {
            return not_found(
                MessageType::DecisionNotFound,
                format!("Decision '{}' not found in model '{}'", name, compiled.name),
                context,
            );
        };
        debug!(model = %compiled.name, decision = name, "evaluating decision");

        let node = NodeRef {
            model,
            kind: NodeKind::Decision,
            index,
        };
        let mut session = Session::new(self, model, context.clone());
        session.record = Some(std::iter::once(node).collect());
        session.decision(node);
        session.finish()
    }

    /// Evaluate the output decisions of a decision service.
    ///
    /// Input data and input decisions are read from `context`; only output
    /// decisions appear in the result.
    pub fn evaluate_decision_service(&self, model: usize, context: &Context, name: &str) -> EvaluationResult {
        let Some(compiled) = self.models.get(model) else {
            return missing_model(model);
        };
        let Some((index, _)) = compiled.service_by_name(name) else {
            return not_found(
                MessageType::DecisionServiceNotFound,
                format!("Decision service '{}' not found in model '{}'", name, compiled.name),
                context,
            );
        };
        debug!(model = %compiled.name, service = name, "evaluating decision service");

        let node = NodeRef {
            model,
            kind: NodeKind::DecisionService,
            index,
        };
        let mut session = Session::for_service(self, node, context.clone());
        session.evaluate_service_outputs(node);
        session.finish()
    }

    /// Opaque handle for a BKM or decision service node
    pub(crate) fn handle_for(&self, node: NodeRef) -> Value {
        let Some(model) = self.models.get(node.model) else {
            return Value::Null;
        };
        match node.kind {
            NodeKind::Bkm => model
                .bkms
                .get(node.index)
                .map(|bkm| Callable::Bkm(node).into_value(bkm.name.clone()))
                .unwrap_or_default(),
            NodeKind::DecisionService => model
                .services
                .get(node.index)
                .map(|service| Callable::Service(node).into_value(service.name.clone()))
                .unwrap_or_default(),
            NodeKind::InputData | NodeKind::Decision => Value::Null,
        }
    }

    /// Function body of a BKM and the scope it closes over
    pub(crate) fn bkm_function(&self, node: NodeRef) -> Result<(&FunctionLogic, Context)> {
        let bkm = self
            .models
            .get(node.model)
            .and_then(|m| m.bkms.get(node.index))
            .ok_or_else(|| RuntimeError::FunctionNotFound(format!("{:?}", node)))?;
        let function = bkm.function.as_ref().ok_or_else(|| {
            RuntimeError::RuntimeError(format!(
                "Business knowledge model '{}' has no function definition",
                bkm.name
            ))
        })?;

        let mut closure = Context::new();
        for dep in &bkm.dependencies {
            bind(&mut closure, dep, self.handle_for(dep.target));
        }
        closure.insert(bkm.name.clone(), self.handle_for(node));
        Ok((function, closure))
    }

    /// Parameter names of a decision service invoked as a function
    pub(crate) fn service_parameters(&self, node: NodeRef) -> Vec<String> {
        let Some(model) = self.models.get(node.model) else {
            return Vec::new();
        };
        let Some(service) = model.services.get(node.index) else {
            return Vec::new();
        };
        service
            .input_decisions
            .iter()
            .chain(&service.input_data)
            .filter_map(|n| self.node_name(*n))
            .map(str::to_string)
            .collect()
    }

    /// Invoke a decision service as a function.
    ///
    /// A single output yields its value; several yield a context.
    pub(crate) fn invoke_service(&self, node: NodeRef, inputs: Context) -> Result<Value> {
        let mut session = Session::for_service(self, node, inputs);
        session.evaluate_service_outputs(node);
        let result = session.finish();

        if let Some(error) = result.errors().next() {
            return Err(RuntimeError::RuntimeError(format!(
                "Decision service '{}' failed: {}",
                self.node_name(node).unwrap_or_default(),
                error.text
            )));
        }
        let mut outputs = result.decision_results.into_iter();
        match (outputs.next(), outputs.len()) {
            (Some(only), 0) => Ok(only.result),
            (first, _) => {
                let mut ctx = Context::new();
                for output in first.into_iter().chain(outputs) {
                    ctx.insert(output.name, output.result);
                }
                Ok(Value::Context(ctx))
            }
        }
    }

    fn node_name(&self, node: NodeRef) -> Option<&str> {
        let model = self.models.get(node.model)?;
        let name = match node.kind {
            NodeKind::InputData => &model.inputs.get(node.index)?.name,
            NodeKind::Decision => &model.decisions.get(node.index)?.name,
            NodeKind::Bkm => &model.bkms.get(node.index)?.name,
            NodeKind::DecisionService => &model.services.get(node.index)?.name,
        };
        Some(name.as_str())
    }
}

fn missing_model(model: usize) -> EvaluationResult {
    EvaluationResult {
        messages: vec![Message::error(
            MessageType::FeelEvaluationError,
            format!("No model at index {}", model),
        )],
        ..EvaluationResult::default()
    }
}

fn not_found(message_type: MessageType, text: String, context: &Context) -> EvaluationResult {
    EvaluationResult {
        messages: vec![Message::error(message_type, text)],
        context: context.clone(),
        ..EvaluationResult::default()
    }
}

/// Bind a dependency value into a scope, under its import alias if any
fn bind(scope: &mut Context, dep: &Dependency, value: Value) {
    match &dep.import_alias {
        None => {
            scope.insert(dep.name.clone(), value);
        }
        Some(alias) => {
            let entry = scope
                .entry(alias.clone())
                .or_insert_with(|| Value::Context(Context::new()));
            if let Value::Context(ctx) = entry {
                ctx.insert(dep.name.clone(), value);
            }
        }
    }
}

/// Memoised state of one node
#[derive(Debug, Clone)]
enum Outcome {
    Value(Value),
    Failed,
    Skipped,
    /// Input value does not conform to its declared type
    InvalidInput(String),
}

/// One evaluation call
struct Session<'r> {
    runtime: &'r DmnRuntime,
    root: usize,
    input: Context,
    /// Import alias path from the root model to every reachable model
    paths: HashMap<usize, Vec<String>>,
    outcomes: HashMap<NodeRef, Outcome>,
    in_progress: HashSet<NodeRef>,
    /// Decisions whose values are read from the input context
    given: HashSet<NodeRef>,
    /// Decisions reported in the result; all root decisions when `None`
    record: Option<HashSet<NodeRef>>,
    result: EvaluationResult,
}

impl<'r> Session<'r> {
    fn new(runtime: &'r DmnRuntime, root: usize, input: Context) -> Self {
        Self {
            runtime,
            root,
            paths: import_paths(runtime.models(), root),
            result: EvaluationResult {
                context: input.clone(),
                ..EvaluationResult::default()
            },
            input,
            outcomes: HashMap::new(),
            in_progress: HashSet::new(),
            given: HashSet::new(),
            record: None,
        }
    }

    fn for_service(runtime: &'r DmnRuntime, service: NodeRef, input: Context) -> Self {
        let mut session = Self::new(runtime, service.model, input);
        if let Some(node) = runtime
            .models()
            .get(service.model)
            .and_then(|m| m.services.get(service.index))
        {
            session.given = node.input_decisions.iter().copied().collect();
            session.record = Some(node.outputs.iter().copied().collect());
        }
        session
    }

    fn evaluate_service_outputs(&mut self, service: NodeRef) {
        let outputs = self
            .runtime
            .models()
            .get(service.model)
            .and_then(|m| m.services.get(service.index))
            .map(|s| s.outputs.clone())
            .unwrap_or_default();
        for output in outputs {
            self.decision(output);
        }
    }

    fn finish(self) -> EvaluationResult {
        self.result
    }

    fn model(&self, index: usize) -> &'r CompiledModel {
        &self.runtime.models()[index]
    }

    /// The part of the input context that belongs to `model`
    fn model_input(&self, model: usize) -> Option<&Context> {
        let mut ctx = &self.input;
        for alias in self.paths.get(&model)? {
            match ctx.get(alias) {
                Some(Value::Context(inner)) => ctx = inner,
                _ => return None,
            }
        }
        Some(ctx)
    }

    fn input(&mut self, node: NodeRef) -> Outcome {
        if let Some(outcome) = self.outcomes.get(&node) {
            return outcome.clone();
        }
        let input = &self.model(node.model).inputs[node.index];
        let value = self
            .model_input(node.model)
            .and_then(|ctx| ctx.get(&input.name))
            .cloned()
            .unwrap_or_default();

        let outcome = match (&input.type_ref, self.runtime.options().typecheck) {
            (Some(type_ref), true) => {
                match TypeChecker::new(self.runtime).conforms(node.model, type_ref, &value) {
                    Ok(true) => Outcome::Value(value),
                    Ok(false) => Outcome::InvalidInput(format!(
                        "input '{}' declares type '{}' but the value {} is not an instance of it",
                        input.name,
                        type_ref,
                        describe(&value)
                    )),
                    Err(e) => Outcome::InvalidInput(format!(
                        "type check of input '{}' failed: {}",
                        input.name, e
                    )),
                }
            }
            _ => Outcome::Value(value),
        };
        self.outcomes.insert(node, outcome.clone());
        outcome
    }

    fn decision(&mut self, node: NodeRef) -> Outcome {
        if let Some(outcome) = self.outcomes.get(&node) {
            return outcome.clone();
        }
        let decision = &self.model(node.model).decisions[node.index];

        if self.given.contains(&node) {
            let value = self
                .input
                .get(&decision.name)
                .cloned()
                .unwrap_or_default();
            let outcome = Outcome::Value(value);
            self.outcomes.insert(node, outcome.clone());
            return outcome;
        }

        if !self.in_progress.insert(node) {
            self.message(
                node,
                MessageType::RequirementCycle,
                format!("Decision '{}' depends on itself", decision.name),
            );
            return Outcome::Failed;
        }

        let (status, value) = self.evaluate_decision(node);
        self.in_progress.remove(&node);

        if status == EvaluationStatus::Succeeded {
            debug!(decision = %decision.name, "decision succeeded");
        } else {
            warn!(decision = %decision.name, status = %status, "decision did not succeed");
        }

        let outcome = match status {
            EvaluationStatus::Succeeded => Outcome::Value(value.clone()),
            EvaluationStatus::Skipped => Outcome::Skipped,
            EvaluationStatus::Failed | EvaluationStatus::NotEvaluated => Outcome::Failed,
        };
        self.outcomes.insert(node, outcome.clone());

        let recorded = match &self.record {
            Some(nodes) => nodes.contains(&node),
            None => node.model == self.root,
        };
        if recorded {
            self.result
                .context
                .insert(decision.name.clone(), value.clone());
            self.result.decision_results.push(DecisionResult {
                name: decision.name.clone(),
                status,
                result: value,
            });
        }
        outcome
    }

    fn evaluate_decision(&mut self, node: NodeRef) -> (EvaluationStatus, Value) {
        let model = self.model(node.model);
        let decision = &model.decisions[node.index];

        let mut scope = Context::new();
        for dep in &decision.dependencies {
            let value = match dep.target.kind {
                NodeKind::InputData => match self.input(dep.target) {
                    Outcome::Value(v) => v,
                    Outcome::InvalidInput(detail) => {
                        self.message(
                            node,
                            MessageType::ReqDepInvalidType,
                            format!("Decision '{}' cannot be evaluated: {}", decision.name, detail),
                        );
                        return (EvaluationStatus::Failed, Value::Null);
                    }
                    Outcome::Failed | Outcome::Skipped => Value::Null,
                },
                NodeKind::Decision => match self.decision(dep.target) {
                    Outcome::Value(v) => v,
                    _ => {
                        self.message(
                            node,
                            MessageType::DependencyFailed,
                            format!(
                                "Unable to evaluate decision '{}' as it requires decision '{}', which did not succeed",
                                decision.name, dep.name
                            ),
                        );
                        return (EvaluationStatus::Skipped, Value::Null);
                    }
                },
                NodeKind::Bkm | NodeKind::DecisionService => {
                    let handle = self.runtime.handle_for(dep.target);
                    if node.model == self.root && dep.import_alias.is_none() {
                        self.result
                            .context
                            .entry(dep.name.clone())
                            .or_insert_with(|| handle.clone());
                    }
                    handle
                }
            };
            bind(&mut scope, dep, value);
        }

        let Some(logic) = &decision.logic else {
            self.message(
                node,
                MessageType::MissingExpression,
                format!("Decision '{}' has no expression to evaluate", decision.name),
            );
            return (EvaluationStatus::NotEvaluated, Value::Null);
        };

        let value = match Evaluator::new(self.runtime, scope).evaluate_logic(logic) {
            Ok(value) => value,
            Err(e) => {
                self.message(
                    node,
                    e.message_type(),
                    format!("Error evaluating decision '{}': {}", decision.name, e),
                );
                return (EvaluationStatus::Failed, Value::Null);
            }
        };

        if let (Some(type_ref), true) = (&decision.type_ref, self.runtime.options().typecheck) {
            let conforms = TypeChecker::new(self.runtime)
                .conforms(node.model, type_ref, &value)
                .unwrap_or(false);
            if !conforms {
                self.message(
                    node,
                    MessageType::ErrorEvalNodeResultWrongType,
                    format!(
                        "Decision '{}' declares type '{}' but produced {}",
                        decision.name,
                        type_ref,
                        describe(&value)
                    ),
                );
                return (EvaluationStatus::Failed, Value::Null);
            }
        }

        (EvaluationStatus::Succeeded, value)
    }

    fn message(&mut self, node: NodeRef, message_type: MessageType, text: String) {
        let source = self.runtime.node_name(node).unwrap_or_default().to_string();
        self.result
            .messages
            .push(Message::error(message_type, text).with_source(source));
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\" (string)", s),
        Value::Handle(_) => format!("a {}", value.type_name()),
        other => format!("{} ({})", other, other.type_name()),
    }
}

/// Breadth-first alias paths from `root` through model imports
fn import_paths(models: &[CompiledModel], root: usize) -> HashMap<usize, Vec<String>> {
    let mut paths = HashMap::new();
    paths.insert(root, Vec::new());
    let mut queue = VecDeque::from([root]);
    while let Some(model) = queue.pop_front() {
        let Some(compiled) = models.get(model) else {
            continue;
        };
        let base = paths.get(&model).cloned().unwrap_or_default();
        for import in &compiled.imports {
            if !paths.contains_key(&import.model) {
                let mut path = base.clone();
                path.push(import.alias.clone());
                paths.insert(import.model, path);
                queue.push_back(import.model);
            }
        }
    }
    paths
}
