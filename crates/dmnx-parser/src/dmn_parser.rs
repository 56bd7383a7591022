//! DMN XML document parser
//!
//! Reads DMN 1.1 - 1.5 `definitions` documents. Elements are matched by
//! local name so every DMN namespace revision is accepted.

use crate::error::{ParseError, Result};
use dmnx_core::ast::{
    Aggregation, BoxedExpression, BusinessKnowledgeModel, ContextEntry, Decision, DecisionRule,
    DecisionService, DecisionTable, Definitions, FunctionDefinition, HitPolicy, Import, InputClause,
    InputData, ItemDefinition, OutputClause, Parameter, Requirement,
};
use roxmltree::{Document, Node};
use std::path::Path;

/// Element names that carry decision logic
const BOXED_EXPRESSIONS: &[&str] = &[
    "literalExpression",
    "decisionTable",
    "context",
    "invocation",
    "list",
    "relation",
    "functionDefinition",
];

/// DMN document parser
pub struct DmnParser;

impl DmnParser {
    /// Parse a DMN document from a file
    pub fn parse_file(path: &Path) -> Result<Definitions> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source, Some(path))
    }

    /// Parse a DMN document from its XML text
    pub fn parse(source: &str, path: Option<&Path>) -> Result<Definitions> {
        let doc = Document::parse(source)?;
        let root = doc.root_element();

        if root.tag_name().name() != "definitions" {
            return Err(ParseError::InvalidDocument(format!(
                "root element is <{}>, expected <definitions>",
                root.tag_name().name()
            )));
        }

        let name = root
            .attribute("name")
            .map(str::to_string)
            .or_else(|| {
                path.and_then(|p| p.file_stem())
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .ok_or_else(|| ParseError::MissingAttribute {
                element: "definitions".to_string(),
                attribute: "name".to_string(),
            })?;

        let mut definitions = Definitions {
            id: root.attribute("id").map(str::to_string),
            name,
            namespace: root.attribute("namespace").unwrap_or_default().to_string(),
            source_path: path.map(Path::to_path_buf),
            ..Definitions::default()
        };

        for node in root.children().filter(Node::is_element) {
            match node.tag_name().name() {
                "import" => definitions.imports.push(parse_import(node)?),
                "itemDefinition" => definitions.item_definitions.push(parse_item_definition(node)),
                "inputData" => definitions.input_data.push(parse_input_data(node)?),
                "decision" => definitions.decisions.push(parse_decision(node)?),
                "businessKnowledgeModel" => definitions
                    .business_knowledge_models
                    .push(parse_bkm(node)?),
                "decisionService" => definitions.decision_services.push(parse_decision_service(node)?),
                _ => {}
            }
        }

        tracing::debug!(
            "Parsed DMN model '{}' ({} decisions, {} inputs, {} services)",
            definitions.name,
            definitions.decisions.len(),
            definitions.input_data.len(),
            definitions.decision_services.len()
        );

        Ok(definitions)
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |c| c.is_element() && c.tag_name().name() == name)
}

/// Text content of a `<text>` child
fn text_child(node: Node) -> Option<String> {
    child(node, "text").map(|t| t.text().unwrap_or_default().trim().to_string())
}

fn required_attr(node: Node, attribute: &str) -> Result<String> {
    node.attribute(attribute)
        .map(str::to_string)
        .ok_or_else(|| ParseError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: attribute.to_string(),
        })
}

/// Element id, falling back to its name when absent
fn node_id(node: Node, name: &str) -> String {
    node.attribute("id").unwrap_or(name).to_string()
}

/// Strip a namespace prefix (`feel:number` -> `number`)
fn local_type_name(type_ref: &str) -> String {
    let type_ref = type_ref.trim();
    match type_ref.rsplit_once(':') {
        Some((_, local)) if !type_ref.contains(' ') => local.to_string(),
        _ => type_ref.to_string(),
    }
}

/// typeRef as attribute (DMN 1.2+) or child element (DMN 1.1)
fn type_ref_of(node: Node) -> Option<String> {
    node.attribute("typeRef")
        .map(str::to_string)
        .or_else(|| child(node, "typeRef").and_then(|t| t.text()).map(str::to_string))
        .map(|t| local_type_name(&t))
}

fn variable_type_ref(node: Node) -> Option<String> {
    child(node, "variable")
        .and_then(type_ref_of)
        .or_else(|| type_ref_of(node))
}

fn hrefs(node: Node, element: &str) -> Vec<String> {
    children(node, element)
        .filter_map(|c| c.attribute("href").map(str::to_string))
        .collect()
}

fn parse_import(node: Node) -> Result<Import> {
    Ok(Import {
        namespace: required_attr(node, "namespace")?,
        name: node.attribute("name").unwrap_or_default().to_string(),
        location_uri: node.attribute("locationURI").map(str::to_string),
        import_type: node.attribute("importType").map(str::to_string),
    })
}

fn parse_item_definition(node: Node) -> ItemDefinition {
    ItemDefinition {
        name: node.attribute("name").unwrap_or_default().to_string(),
        type_ref: type_ref_of(node),
        is_collection: node.attribute("isCollection") == Some("true"),
        components: children(node, "itemComponent")
            .map(parse_item_definition)
            .collect(),
        allowed_values: child(node, "allowedValues").and_then(text_child),
    }
}

fn parse_input_data(node: Node) -> Result<InputData> {
    let name = required_attr(node, "name")?;
    Ok(InputData {
        id: node_id(node, &name),
        type_ref: variable_type_ref(node),
        name,
    })
}

fn parse_decision(node: Node) -> Result<Decision> {
    let name = required_attr(node, "name")?;

    let mut information_requirements = Vec::new();
    for req in children(node, "informationRequirement") {
        if let Some(href) = child(req, "requiredInput").and_then(|r| r.attribute("href")) {
            information_requirements.push(Requirement::Input(href.to_string()));
        }
        if let Some(href) = child(req, "requiredDecision").and_then(|r| r.attribute("href")) {
            information_requirements.push(Requirement::Decision(href.to_string()));
        }
    }

    Ok(Decision {
        id: node_id(node, &name),
        type_ref: variable_type_ref(node),
        information_requirements,
        knowledge_requirements: knowledge_requirements(node),
        logic: first_boxed_expression(node)?,
        name,
    })
}

fn knowledge_requirements(node: Node) -> Vec<String> {
    children(node, "knowledgeRequirement")
        .flat_map(|req| hrefs(req, "requiredKnowledge"))
        .collect()
}

fn parse_bkm(node: Node) -> Result<BusinessKnowledgeModel> {
    let name = required_attr(node, "name")?;
    let logic = match child(node, "encapsulatedLogic") {
        Some(logic) => Some(parse_function_definition(logic)?),
        None => None,
    };
    Ok(BusinessKnowledgeModel {
        id: node_id(node, &name),
        type_ref: variable_type_ref(node),
        knowledge_requirements: knowledge_requirements(node),
        logic,
        name,
    })
}

fn parse_decision_service(node: Node) -> Result<DecisionService> {
    let name = required_attr(node, "name")?;
    Ok(DecisionService {
        id: node_id(node, &name),
        type_ref: variable_type_ref(node),
        output_decisions: hrefs(node, "outputDecision"),
        encapsulated_decisions: hrefs(node, "encapsulatedDecision"),
        input_decisions: hrefs(node, "inputDecision"),
        input_data: hrefs(node, "inputData"),
        name,
    })
}

fn first_boxed_expression(node: Node) -> Result<Option<BoxedExpression>> {
    match node
        .children()
        .find(|c| c.is_element() && BOXED_EXPRESSIONS.contains(&c.tag_name().name()))
    {
        Some(expr) => parse_boxed_expression(expr).map(Some),
        None => Ok(None),
    }
}

fn parse_boxed_expression(node: Node) -> Result<BoxedExpression> {
    match node.tag_name().name() {
        "literalExpression" => Ok(BoxedExpression::Literal(text_child(node).unwrap_or_default())),
        "decisionTable" => parse_decision_table(node).map(BoxedExpression::DecisionTable),
        "context" => {
            let mut entries = Vec::new();
            for entry in children(node, "contextEntry") {
                let variable = child(entry, "variable")
                    .and_then(|v| v.attribute("name"))
                    .map(str::to_string);
                if let Some(value) = first_boxed_expression(entry)? {
                    entries.push(ContextEntry { variable, value });
                }
            }
            Ok(BoxedExpression::Context(entries))
        }
        "invocation" => {
            let callee = child(node, "literalExpression")
                .and_then(text_child)
                .unwrap_or_default();
            let mut bindings = Vec::new();
            for binding in children(node, "binding") {
                let parameter = child(binding, "parameter")
                    .and_then(|p| p.attribute("name"))
                    .unwrap_or_default()
                    .to_string();
                bindings.push((parameter, first_boxed_expression(binding)?));
            }
            Ok(BoxedExpression::Invocation { callee, bindings })
        }
        "list" => {
            let items = node
                .children()
                .filter(|c| c.is_element() && BOXED_EXPRESSIONS.contains(&c.tag_name().name()))
                .map(parse_boxed_expression)
                .collect::<Result<Vec<_>>>()?;
            Ok(BoxedExpression::List(items))
        }
        "relation" => {
            let columns = children(node, "column")
                .filter_map(|c| c.attribute("name").map(str::to_string))
                .collect();
            let mut rows = Vec::new();
            for row in children(node, "row") {
                rows.push(
                    row.children()
                        .filter(|c| c.is_element() && BOXED_EXPRESSIONS.contains(&c.tag_name().name()))
                        .map(parse_boxed_expression)
                        .collect::<Result<Vec<_>>>()?,
                );
            }
            Ok(BoxedExpression::Relation { columns, rows })
        }
        "functionDefinition" => parse_function_definition(node).map(BoxedExpression::Function),
        other => Err(ParseError::InvalidDocument(format!(
            "unsupported boxed expression <{}>",
            other
        ))),
    }
}

fn parse_function_definition(node: Node) -> Result<FunctionDefinition> {
    let parameters = children(node, "formalParameter")
        .map(|p| Parameter {
            name: p.attribute("name").unwrap_or_default().to_string(),
            type_ref: type_ref_of(p),
        })
        .collect();
    Ok(FunctionDefinition {
        parameters,
        body: first_boxed_expression(node)?.map(Box::new),
    })
}

fn parse_decision_table(node: Node) -> Result<DecisionTable> {
    let hit_policy = match node.attribute("hitPolicy") {
        Some(attr) => HitPolicy::from_attr(attr).ok_or_else(|| ParseError::InvalidValue {
            attribute: "hitPolicy".to_string(),
            message: format!("unknown hit policy '{}'", attr),
        })?,
        None => HitPolicy::Unique,
    };

    let aggregation = match node.attribute("aggregation") {
        Some(attr) => Some(Aggregation::from_attr(attr).ok_or_else(|| ParseError::InvalidValue {
            attribute: "aggregation".to_string(),
            message: format!("unknown aggregation '{}'", attr),
        })?),
        None => None,
    };

    let inputs = children(node, "input")
        .map(|input| InputClause {
            label: input.attribute("label").map(str::to_string),
            expression: child(input, "inputExpression")
                .and_then(text_child)
                .unwrap_or_default(),
            input_values: child(input, "inputValues").and_then(text_child),
        })
        .collect();

    let outputs = children(node, "output")
        .map(|output| OutputClause {
            name: output.attribute("name").map(str::to_string),
            output_values: child(output, "outputValues").and_then(text_child),
            default_output: child(output, "defaultOutputEntry").and_then(text_child),
        })
        .collect();

    let rules = children(node, "rule")
        .map(|rule| DecisionRule {
            input_entries: children(rule, "inputEntry")
                .map(|e| text_child(e).unwrap_or_default())
                .collect(),
            output_entries: children(rule, "outputEntry")
                .map(|e| text_child(e).unwrap_or_default())
                .collect(),
        })
        .collect();

    Ok(DecisionTable {
        hit_policy,
        aggregation,
        inputs,
        outputs,
        rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_type_name() {
        assert_eq!(local_type_name("feel:number"), "number");
        assert_eq!(local_type_name("tApplicant"), "tApplicant");
        assert_eq!(local_type_name("date and time"), "date and time");
    }

    #[test]
    fn test_rejects_non_definitions_root() {
        let err = DmnParser::parse("<model/>", None).unwrap_err();
        assert!(matches!(err, ParseError::InvalidDocument(_)));
    }

    #[test]
    fn test_rejects_malformed_xml() {
        let err = DmnParser::parse("<definitions>", None).unwrap_err();
        assert!(matches!(err, ParseError::XmlError(_)));
    }

    #[test]
    fn test_name_falls_back_to_file_stem() {
        let defs = DmnParser::parse(
            r#"<definitions namespace="urn:x"/>"#,
            Some(Path::new("/tmp/pricing.dmn")),
        )
        .unwrap();
        assert_eq!(defs.name, "pricing");
        assert_eq!(defs.namespace, "urn:x");
    }
}
