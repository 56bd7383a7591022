//! Compiled model graph

use super::logic::{FunctionLogic, Logic};
use crate::ast::{Definitions, ItemDefinition};
use crate::message::Message;

/// Kind of node a [`NodeRef`] points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    InputData,
    Decision,
    Bkm,
    DecisionService,
}

/// Reference to a node anywhere in the loaded model collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    /// Index of the owning model in load order
    pub model: usize,
    pub kind: NodeKind,
    /// Index within the owning model's node list of that kind
    pub index: usize,
}

/// A resolved requirement: what the dependent node sees, and where it comes from
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    /// Variable name the value is bound to
    pub name: String,
    /// Import alias when the node lives in an imported model
    pub import_alias: Option<String>,
    pub target: NodeRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImport {
    pub alias: String,
    pub namespace: String,
    pub model: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputNode {
    pub id: String,
    pub name: String,
    pub type_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionNode {
    pub id: String,
    pub name: String,
    pub type_ref: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub logic: Option<Logic>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BkmNode {
    pub id: String,
    pub name: String,
    pub dependencies: Vec<Dependency>,
    pub function: Option<FunctionLogic>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceNode {
    pub id: String,
    pub name: String,
    pub type_ref: Option<String>,
    pub outputs: Vec<NodeRef>,
    pub encapsulated: Vec<NodeRef>,
    pub input_decisions: Vec<NodeRef>,
    pub input_data: Vec<NodeRef>,
}

/// A model ready for evaluation (or carrying the errors that prevent it)
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledModel {
    pub name: String,
    pub namespace: String,
    /// Source document, kept for static introspection
    pub definitions: Definitions,
    pub imports: Vec<ResolvedImport>,
    pub item_definitions: Vec<ItemDefinition>,
    pub inputs: Vec<InputNode>,
    pub decisions: Vec<DecisionNode>,
    pub bkms: Vec<BkmNode>,
    pub services: Vec<ServiceNode>,
    pub messages: Vec<Message>,
}

impl CompiledModel {
    /// Returns true if compilation reported any error for this model
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(Message::is_error)
    }

    pub fn decision_by_name(&self, name: &str) -> Option<(usize, &DecisionNode)> {
        self.decisions.iter().enumerate().find(|(_, d)| d.name == name)
    }

    pub fn service_by_name(&self, name: &str) -> Option<(usize, &ServiceNode)> {
        self.services.iter().enumerate().find(|(_, s)| s.name == name)
    }

    pub fn item_definition(&self, name: &str) -> Option<&ItemDefinition> {
        self.item_definitions.iter().find(|d| d.name == name)
    }

    pub fn import_alias_for(&self, model: usize) -> Option<&str> {
        self.imports
            .iter()
            .find(|i| i.model == model)
            .map(|i| i.alias.as_str())
    }
}
