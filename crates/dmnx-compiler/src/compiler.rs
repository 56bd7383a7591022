//! Main compiler
//!
//! Compiles the full set of loaded documents at once, since requirements
//! and imports may cross model boundaries.

use crate::codegen::LogicCompiler;
use crate::error::Result;
use crate::import_resolver::ImportResolver;
use crate::semantic::SemanticAnalyzer;
use dmnx_core::ast::{Definitions, ItemDefinition, Requirement};
use dmnx_core::builtins::is_builtin_type;
use dmnx_core::ir::{
    BkmNode, CompiledModel, DecisionNode, Dependency, InputNode, NodeKind, NodeRef,
    ResolvedImport, ServiceNode,
};
use dmnx_core::{Message, MessageType};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Compiler options
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Report free names that are not in scope
    pub check_names: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self { check_names: true }
    }
}

/// The main dmnx compiler
#[derive(Debug, Clone)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Create a new compiler instance with default options
    pub fn new() -> Self {
        Self::with_options(CompilerOptions::default())
    }

    /// Create a new compiler instance with custom options
    pub fn with_options(options: CompilerOptions) -> Self {
        Self { options }
    }

    /// Compile every document of a model set.
    ///
    /// Problems local to one model are recorded as messages on that model.
    /// Only problems that make the set as a whole unusable (such as two
    /// documents sharing a namespace) are returned as errors.
    pub fn compile(&self, definitions: Vec<Definitions>) -> Result<Vec<CompiledModel>> {
        let resolver = ImportResolver::new(&definitions)?;

        let mut models: Vec<CompiledModel> = definitions
            .iter()
            .enumerate()
            .map(|(index, defs)| ModelBuilder::new(index, defs, &definitions, &resolver, &self.options).build())
            .collect();

        detect_cycles(&mut models);

        for model in &models {
            let errors = model.messages.iter().filter(|m| m.is_error()).count();
            if errors > 0 {
                warn!(model = %model.name, errors, "model compiled with errors");
            } else {
                debug!(
                    model = %model.name,
                    decisions = model.decisions.len(),
                    services = model.services.len(),
                    "model compiled"
                );
            }
        }

        Ok(models)
    }
}

/// Compiles one document against the resolver of the whole set
struct ModelBuilder<'a> {
    index: usize,
    defs: &'a Definitions,
    all: &'a [Definitions],
    resolver: &'a ImportResolver,
    options: &'a CompilerOptions,
    imports: Vec<ResolvedImport>,
    messages: Vec<Message>,
}

impl<'a> ModelBuilder<'a> {
    fn new(
        index: usize,
        defs: &'a Definitions,
        all: &'a [Definitions],
        resolver: &'a ImportResolver,
        options: &'a CompilerOptions,
    ) -> Self {
        Self {
            index,
            defs,
            all,
            resolver,
            options,
            imports: Vec::new(),
            messages: Vec::new(),
        }
    }

    fn build(mut self) -> CompiledModel {
        let defs = self.defs;
        self.resolve_imports();
        self.check_duplicate_names();
        self.check_item_definitions();

        let inputs = defs
            .input_data
            .iter()
            .map(|input| {
                self.check_type_ref(input.type_ref.as_deref(), &input.name);
                InputNode {
                    id: input.id.clone(),
                    name: input.name.clone(),
                    type_ref: input.type_ref.clone(),
                }
            })
            .collect::<Vec<_>>();

        let decisions = defs
            .decisions
            .iter()
            .map(|decision| self.build_decision(decision))
            .collect::<Vec<_>>();

        let bkms = defs
            .business_knowledge_models
            .iter()
            .map(|bkm| self.build_bkm(bkm))
            .collect::<Vec<_>>();

        let services = defs
            .decision_services
            .iter()
            .map(|service| self.build_service(service))
            .collect::<Vec<_>>();

        CompiledModel {
            name: defs.name.clone(),
            namespace: defs.namespace.clone(),
            definitions: defs.clone(),
            imports: self.imports,
            item_definitions: defs.item_definitions.clone(),
            inputs,
            decisions,
            bkms,
            services,
            messages: self.messages,
        }
    }

    fn error(&mut self, message_type: MessageType, text: String, source: &str) {
        self.messages
            .push(Message::error(message_type, text).with_source(source));
    }

    fn resolve_imports(&mut self) {
        let defs = self.defs;
        for import in &defs.imports {
            match self.resolver.resolve_import(import) {
                Some(resolved) => self.imports.push(resolved),
                None => {
                    let text = format!(
                        "Import '{}' refers to namespace '{}', which matches no loaded model",
                        import.name, import.namespace
                    );
                    self.error(MessageType::ImportNotFound, text, &import.name);
                }
            }
        }
    }

    fn check_duplicate_names(&mut self) {
        let mut seen = HashSet::new();
        let names = self
            .defs
            .input_data
            .iter()
            .map(|n| &n.name)
            .chain(self.defs.decisions.iter().map(|n| &n.name))
            .chain(self.defs.business_knowledge_models.iter().map(|n| &n.name))
            .chain(self.defs.decision_services.iter().map(|n| &n.name))
            .cloned()
            .collect::<Vec<_>>();
        for name in names {
            if !seen.insert(name.clone()) {
                self.error(
                    MessageType::DuplicateName,
                    format!("Duplicate node name '{}' in model '{}'", name, self.defs.name),
                    &name,
                );
            }
        }
    }

    fn check_item_definitions(&mut self) {
        fn collect<'d>(def: &'d ItemDefinition, out: &mut Vec<(&'d str, &'d str)>) {
            if let Some(type_ref) = def.type_ref.as_deref() {
                out.push((type_ref, def.name.as_str()));
            }
            for component in &def.components {
                collect(component, out);
            }
        }
        let defs = self.defs;
        let mut refs = Vec::new();
        for def in &defs.item_definitions {
            collect(def, &mut refs);
        }
        for (type_ref, owner) in refs {
            self.check_type_ref(Some(type_ref), owner);
        }
    }

    /// Record TYPE_DEF_NOT_FOUND for a typeRef that names no known type
    fn check_type_ref(&mut self, type_ref: Option<&str>, owner: &str) {
        let Some(type_ref) = type_ref else { return };
        if self.type_known(type_ref) {
            return;
        }
        self.error(
            MessageType::TypeDefNotFound,
            format!("Unknown type '{}' referenced by '{}'", type_ref, owner),
            owner,
        );
    }

    fn type_known(&self, type_ref: &str) -> bool {
        if is_builtin_type(type_ref)
            || self.defs.item_definitions.iter().any(|d| d.name == type_ref)
        {
            return true;
        }
        // alias.tType from an imported model
        if let Some((alias, name)) = type_ref.split_once('.') {
            return self
                .imports
                .iter()
                .filter(|i| i.alias == alias)
                .any(|i| self.all[i.model].item_definitions.iter().any(|d| d.name == name));
        }
        false
    }

    /// Resolve an href to a node of one of the expected kinds
    fn resolve(&mut self, href: &str, expected: &[NodeKind], owner: &str) -> Option<NodeRef> {
        let resolved = self
            .resolver
            .resolve_href(self.index, href)
            .filter(|node| expected.contains(&node.kind))
            .filter(|node| node.model == self.index || self.alias_of(node.model).is_some());
        if resolved.is_none() {
            self.error(
                MessageType::ReqNotFound,
                format!("Requirement '{}' of '{}' does not resolve to a node", href, owner),
                owner,
            );
        }
        resolved
    }

    fn alias_of(&self, model: usize) -> Option<&str> {
        self.imports
            .iter()
            .find(|i| i.model == model)
            .map(|i| i.alias.as_str())
    }

    fn dependency(&mut self, href: &str, expected: &[NodeKind], owner: &str) -> Option<Dependency> {
        let target = self.resolve(href, expected, owner)?;
        let name = self.resolver.name_of(target)?.to_string();
        let import_alias = if target.model == self.index {
            None
        } else {
            self.alias_of(target.model).map(str::to_string)
        };
        Some(Dependency {
            name,
            import_alias,
            target,
        })
    }

    /// Names visible to logic with the given dependencies
    fn scope(&self, dependencies: &[Dependency]) -> Vec<String> {
        dependencies
            .iter()
            .filter(|d| d.import_alias.is_none())
            .map(|d| d.name.clone())
            .chain(self.imports.iter().map(|i| i.alias.clone()))
            .collect()
    }

    fn report_unknown(&mut self, unknown: Vec<String>, owner: &str) {
        for name in unknown {
            self.error(
                MessageType::UnknownVariable,
                format!("Unknown variable '{}' in '{}'", name, owner),
                owner,
            );
        }
    }

    fn build_decision(&mut self, decision: &dmnx_core::ast::Decision) -> DecisionNode {
        self.check_type_ref(decision.type_ref.as_deref(), &decision.name);

        let mut dependencies = Vec::new();
        for requirement in &decision.information_requirements {
            let expected: &[NodeKind] = match requirement {
                Requirement::Input(_) => &[NodeKind::InputData],
                Requirement::Decision(_) => &[NodeKind::Decision],
            };
            if let Some(dep) = self.dependency(requirement.href(), expected, &decision.name) {
                dependencies.push(dep);
            }
        }
        for href in &decision.knowledge_requirements {
            if let Some(dep) = self.dependency(
                href,
                &[NodeKind::Bkm, NodeKind::DecisionService],
                &decision.name,
            ) {
                dependencies.push(dep);
            }
        }

        let logic = match &decision.logic {
            None => {
                self.error(
                    MessageType::MissingExpression,
                    format!("Decision '{}' has no expression", decision.name),
                    &decision.name,
                );
                None
            }
            Some(boxed) => match LogicCompiler::compile(boxed) {
                Ok(logic) => Some(logic),
                Err(e) => {
                    self.error(
                        MessageType::FeelSyntaxError,
                        format!("Decision '{}': {}", decision.name, e),
                        &decision.name,
                    );
                    None
                }
            },
        };

        if self.options.check_names {
            if let Some(logic) = &logic {
                let unknown = SemanticAnalyzer::new(self.scope(&dependencies)).analyze_logic(logic);
                self.report_unknown(unknown, &decision.name);
            }
        }

        DecisionNode {
            id: decision.id.clone(),
            name: decision.name.clone(),
            type_ref: decision.type_ref.clone(),
            dependencies,
            logic,
        }
    }

    fn build_bkm(&mut self, bkm: &dmnx_core::ast::BusinessKnowledgeModel) -> BkmNode {
        self.check_type_ref(bkm.type_ref.as_deref(), &bkm.name);

        let mut dependencies = Vec::new();
        for href in &bkm.knowledge_requirements {
            if let Some(dep) = self.dependency(href, &[NodeKind::Bkm, NodeKind::DecisionService], &bkm.name) {
                dependencies.push(dep);
            }
        }

        let function = match &bkm.logic {
            None => {
                self.error(
                    MessageType::MissingExpression,
                    format!("Business knowledge model '{}' has no function definition", bkm.name),
                    &bkm.name,
                );
                None
            }
            Some(definition) => {
                for param in &definition.parameters {
                    self.check_type_ref(param.type_ref.as_deref(), &bkm.name);
                }
                match LogicCompiler::compile_function(definition) {
                    Ok(function) => Some(function),
                    Err(e) => {
                        self.error(
                            MessageType::FeelSyntaxError,
                            format!("Business knowledge model '{}': {}", bkm.name, e),
                            &bkm.name,
                        );
                        None
                    }
                }
            }
        };

        if self.options.check_names {
            if let Some(function) = &function {
                let mut scope = self.scope(&dependencies);
                // recursive invocation
                scope.push(bkm.name.clone());
                let unknown = SemanticAnalyzer::new(scope).analyze_function(function);
                self.report_unknown(unknown, &bkm.name);
            }
        }

        BkmNode {
            id: bkm.id.clone(),
            name: bkm.name.clone(),
            dependencies,
            function,
        }
    }

    fn build_service(&mut self, service: &dmnx_core::ast::DecisionService) -> ServiceNode {
        self.check_type_ref(service.type_ref.as_deref(), &service.name);

        let mut resolve_all = |hrefs: &[String], kind: NodeKind| -> Vec<NodeRef> {
            hrefs
                .iter()
                .filter_map(|href| self.resolve(href, &[kind], &service.name))
                .collect()
        };
        let outputs = resolve_all(&service.output_decisions, NodeKind::Decision);
        let encapsulated = resolve_all(&service.encapsulated_decisions, NodeKind::Decision);
        let input_decisions = resolve_all(&service.input_decisions, NodeKind::Decision);
        let input_data = resolve_all(&service.input_data, NodeKind::InputData);

        ServiceNode {
            id: service.id.clone(),
            name: service.name.clone(),
            type_ref: service.type_ref.clone(),
            outputs,
            encapsulated,
            input_decisions,
            input_data,
        }
    }
}

/// Mark every model whose decisions take part in a requirement cycle
fn detect_cycles(models: &mut [CompiledModel]) {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit(
        node: NodeRef,
        models: &[CompiledModel],
        marks: &mut HashMap<NodeRef, Mark>,
        cycles: &mut Vec<NodeRef>,
    ) {
        match marks.get(&node) {
            Some(Mark::Done) => return,
            Some(Mark::Visiting) => {
                cycles.push(node);
                return;
            }
            None => {}
        }
        marks.insert(node, Mark::Visiting);
        if let Some(decision) = models
            .get(node.model)
            .and_then(|m| m.decisions.get(node.index))
        {
            for dep in &decision.dependencies {
                if dep.target.kind == NodeKind::Decision {
                    visit(dep.target, models, marks, cycles);
                }
            }
        }
        marks.insert(node, Mark::Done);
    }

    let mut marks = HashMap::new();
    let mut cycles = Vec::new();
    for (model, compiled) in models.iter().enumerate() {
        for index in 0..compiled.decisions.len() {
            let node = NodeRef {
                model,
                kind: NodeKind::Decision,
                index,
            };
            visit(node, models, &mut marks, &mut cycles);
        }
    }

    for node in cycles {
        let model = &mut models[node.model];
        let name = model.decisions[node.index].name.clone();
        model.messages.push(
            Message::error(
                MessageType::RequirementCycle,
                format!("Decision '{}' is part of a requirement cycle", name),
            )
            .with_source(name),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmnx_core::ast::{BoxedExpression, Decision, InputData};

    fn decision(id: &str, name: &str, reqs: Vec<Requirement>, text: Option<&str>) -> Decision {
        Decision {
            id: id.to_string(),
            name: name.to_string(),
            type_ref: None,
            information_requirements: reqs,
            knowledge_requirements: vec![],
            logic: text.map(|t| BoxedExpression::Literal(t.to_string())),
        }
    }

    fn model(decisions: Vec<Decision>) -> Definitions {
        Definitions {
            name: "m".to_string(),
            namespace: "urn:m".to_string(),
            input_data: vec![InputData {
                id: "i_age".to_string(),
                name: "Age".to_string(),
                type_ref: Some("number".to_string()),
            }],
            decisions,
            ..Definitions::default()
        }
    }

    fn types(model: &CompiledModel) -> Vec<MessageType> {
        model.messages.iter().map(|m| m.message_type).collect()
    }

    #[test]
    fn test_compile_clean_model() {
        let defs = model(vec![decision(
            "d_adult",
            "Adult",
            vec![Requirement::Input("#i_age".to_string())],
            Some("Age >= 18"),
        )]);
        let models = Compiler::new().compile(vec![defs]).unwrap();
        assert!(!models[0].has_errors());
        assert_eq!(models[0].decisions[0].dependencies[0].name, "Age");
    }

    #[test]
    fn test_unresolved_href() {
        let defs = model(vec![decision(
            "d",
            "D",
            vec![Requirement::Input("#nope".to_string())],
            Some("1"),
        )]);
        let models = Compiler::new().compile(vec![defs]).unwrap();
        assert_eq!(types(&models[0]), vec![MessageType::ReqNotFound]);
    }

    #[test]
    fn test_wrong_requirement_kind() {
        let defs = model(vec![decision(
            "d",
            "D",
            vec![Requirement::Decision("#i_age".to_string())],
            Some("1"),
        )]);
        let models = Compiler::new().compile(vec![defs]).unwrap();
        assert!(types(&models[0]).contains(&MessageType::ReqNotFound));
    }

    #[test]
    fn test_missing_logic_and_syntax_error() {
        let defs = model(vec![
            decision("d1", "Empty", vec![], None),
            decision("d2", "Broken", vec![], Some("1 +")),
        ]);
        let models = Compiler::new().compile(vec![defs]).unwrap();
        assert_eq!(
            types(&models[0]),
            vec![MessageType::MissingExpression, MessageType::FeelSyntaxError]
        );
        assert_eq!(models[0].messages[1].source.as_deref(), Some("Broken"));
    }

    #[test]
    fn test_unknown_variable_can_be_disabled() {
        let defs = model(vec![decision("d", "D", vec![], Some("Age + 1"))]);
        let models = Compiler::new().compile(vec![defs.clone()]).unwrap();
        assert_eq!(types(&models[0]), vec![MessageType::UnknownVariable]);

        let lenient = Compiler::with_options(CompilerOptions { check_names: false });
        assert!(!lenient.compile(vec![defs]).unwrap()[0].has_errors());
    }

    #[test]
    fn test_requirement_cycle() {
        let defs = model(vec![
            decision("a", "A", vec![Requirement::Decision("#b".to_string())], Some("B")),
            decision("b", "B", vec![Requirement::Decision("#a".to_string())], Some("A")),
        ]);
        let models = Compiler::new().compile(vec![defs]).unwrap();
        assert!(types(&models[0]).contains(&MessageType::RequirementCycle));
    }

    #[test]
    fn test_duplicate_names() {
        let defs = model(vec![decision("d", "Age", vec![], Some("1"))]);
        let models = Compiler::new().compile(vec![defs]).unwrap();
        assert_eq!(types(&models[0]), vec![MessageType::DuplicateName]);
    }

    #[test]
    fn test_unknown_type_ref() {
        let mut defs = model(vec![]);
        defs.input_data[0].type_ref = Some("tMissing".to_string());
        let models = Compiler::new().compile(vec![defs]).unwrap();
        assert_eq!(types(&models[0]), vec![MessageType::TypeDefNotFound]);
    }
}
