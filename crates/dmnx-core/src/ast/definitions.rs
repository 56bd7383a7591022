//! DMN definitions AST
//!
//! Mirrors the structure of a DMN `definitions` document. FEEL text is
//! kept verbatim; it is compiled later by `dmnx-compiler`.

use super::boxed::{BoxedExpression, FunctionDefinition};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A parsed DMN model document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Definitions {
    pub id: Option<String>,
    pub name: String,
    pub namespace: String,
    /// File the document was read from
    #[serde(default)]
    pub source_path: Option<PathBuf>,
    #[serde(default)]
    pub imports: Vec<Import>,
    #[serde(default)]
    pub item_definitions: Vec<ItemDefinition>,
    #[serde(default)]
    pub input_data: Vec<InputData>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub business_knowledge_models: Vec<BusinessKnowledgeModel>,
    #[serde(default)]
    pub decision_services: Vec<DecisionService>,
}

/// `<import>` of another model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub namespace: String,
    /// Alias under which the imported model's elements are visible
    pub name: String,
    pub location_uri: Option<String>,
    pub import_type: Option<String>,
}

/// Custom type definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub name: String,
    pub type_ref: Option<String>,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(default)]
    pub components: Vec<ItemDefinition>,
    /// Unary tests restricting the allowed values
    pub allowed_values: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputData {
    pub id: String,
    pub name: String,
    pub type_ref: Option<String>,
}

/// Information requirement of a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Requirement {
    /// `requiredInput href`
    Input(String),
    /// `requiredDecision href`
    Decision(String),
}

impl Requirement {
    pub fn href(&self) -> &str {
        match self {
            Requirement::Input(href) | Requirement::Decision(href) => href,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    pub name: String,
    pub type_ref: Option<String>,
    #[serde(default)]
    pub information_requirements: Vec<Requirement>,
    /// `requiredKnowledge href`s (BKMs or decision services)
    #[serde(default)]
    pub knowledge_requirements: Vec<String>,
    pub logic: Option<BoxedExpression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessKnowledgeModel {
    pub id: String,
    pub name: String,
    pub type_ref: Option<String>,
    #[serde(default)]
    pub knowledge_requirements: Vec<String>,
    pub logic: Option<FunctionDefinition>,
}

/// Decision service: a named subset of decisions with an explicit
/// input/output contract. All lists hold raw hrefs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecisionService {
    pub id: String,
    pub name: String,
    pub type_ref: Option<String>,
    #[serde(default)]
    pub output_decisions: Vec<String>,
    #[serde(default)]
    pub encapsulated_decisions: Vec<String>,
    #[serde(default)]
    pub input_decisions: Vec<String>,
    #[serde(default)]
    pub input_data: Vec<String>,
}

impl Definitions {
    /// Look up a node name by its element id
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.input_data
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.name.as_str())
            .or_else(|| self.decisions.iter().find(|n| n.id == id).map(|n| n.name.as_str()))
            .or_else(|| {
                self.business_knowledge_models
                    .iter()
                    .find(|n| n.id == id)
                    .map(|n| n.name.as_str())
            })
            .or_else(|| {
                self.decision_services
                    .iter()
                    .find(|n| n.id == id)
                    .map(|n| n.name.as_str())
            })
    }
}
