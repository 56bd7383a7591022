//! Import and href resolution across the loaded model set
//!
//! Every document compiled together is addressable by namespace. A
//! requirement href is either local (`#id`) or qualified with the namespace
//! of an imported model (`urn:other#id`).

use crate::error::{CompileError, Result};
use dmnx_core::ast::{Definitions, Import};
use dmnx_core::ir::{NodeKind, NodeRef, ResolvedImport};
use std::collections::HashMap;

/// Resolves imports and hrefs for a set of definitions compiled together
pub struct ImportResolver {
    /// namespace -> model index
    namespaces: HashMap<String, usize>,
    /// per model: element id -> node
    ids: Vec<HashMap<String, NodeRef>>,
    /// per model: node name, by kind and index
    names: Vec<HashMap<NodeRef, String>>,
}

impl ImportResolver {
    /// Index every model's namespace and element ids
    pub fn new(definitions: &[Definitions]) -> Result<Self> {
        let mut namespaces = HashMap::new();
        let mut ids = Vec::with_capacity(definitions.len());
        let mut names = Vec::with_capacity(definitions.len());

        for (model, defs) in definitions.iter().enumerate() {
            if let Some(first) = namespaces.insert(defs.namespace.clone(), model) {
                return Err(CompileError::DuplicateNamespace {
                    namespace: defs.namespace.clone(),
                    first: definitions[first].name.clone(),
                    second: defs.name.clone(),
                });
            }

            let mut model_ids = HashMap::new();
            let mut model_names = HashMap::new();
            let mut add = |kind: NodeKind, index: usize, id: &str, name: &str| {
                let node = NodeRef { model, kind, index };
                model_ids.insert(id.to_string(), node);
                model_names.insert(node, name.to_string());
            };
            for (i, n) in defs.input_data.iter().enumerate() {
                add(NodeKind::InputData, i, &n.id, &n.name);
            }
            for (i, n) in defs.decisions.iter().enumerate() {
                add(NodeKind::Decision, i, &n.id, &n.name);
            }
            for (i, n) in defs.business_knowledge_models.iter().enumerate() {
                add(NodeKind::Bkm, i, &n.id, &n.name);
            }
            for (i, n) in defs.decision_services.iter().enumerate() {
                add(NodeKind::DecisionService, i, &n.id, &n.name);
            }
            ids.push(model_ids);
            names.push(model_names);
        }

        Ok(Self {
            namespaces,
            ids,
            names,
        })
    }

    /// Resolve one `<import>` of model `model`
    pub fn resolve_import(&self, import: &Import) -> Option<ResolvedImport> {
        self.namespaces
            .get(&import.namespace)
            .map(|&target| ResolvedImport {
                alias: import.name.clone(),
                namespace: import.namespace.clone(),
                model: target,
            })
    }

    /// Resolve an href as seen from model `model`
    pub fn resolve_href(&self, model: usize, href: &str) -> Option<NodeRef> {
        let (namespace, id) = match href.rsplit_once('#') {
            Some((ns, id)) => (ns, id),
            None => ("", href),
        };
        let target = if namespace.is_empty() {
            model
        } else {
            *self.namespaces.get(namespace)?
        };
        self.ids.get(target)?.get(id).copied()
    }

    /// Name of a resolved node
    pub fn name_of(&self, node: NodeRef) -> Option<&str> {
        self.names.get(node.model)?.get(&node).map(String::as_str)
    }

    pub fn model_count(&self) -> usize {
        self.ids.len()
    }
}
