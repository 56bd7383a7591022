//! Integration tests: parse DMN XML, then compile the model set

use dmnx_compiler::{CompileError, Compiler};
use dmnx_core::ir::NodeKind;
use dmnx_core::MessageType;
use dmnx_parser::DmnParser;

const COMMON: &str = r##"<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/"
    name="Common" namespace="urn:common">
  <itemDefinition name="tScore"><typeRef>number</typeRef></itemDefinition>
  <inputData id="i_score" name="Score"><variable name="Score" typeRef="number"/></inputData>
  <decision id="d_good" name="Good Score">
    <variable name="Good Score" typeRef="boolean"/>
    <informationRequirement><requiredInput href="#i_score"/></informationRequirement>
    <literalExpression><text>Score &gt;= 600</text></literalExpression>
  </decision>
</definitions>"##;

const MAIN: &str = r##"<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/"
    name="Main" namespace="urn:main">
  <import namespace="urn:common" name="common"/>
  <inputData id="i_amount" name="Amount"><variable name="Amount" typeRef="common.tScore"/></inputData>
  <decision id="d_approve" name="Approve">
    <variable name="Approve" typeRef="boolean"/>
    <informationRequirement><requiredDecision href="urn:common#d_good"/></informationRequirement>
    <informationRequirement><requiredInput href="#i_amount"/></informationRequirement>
    <literalExpression><text>common.Good Score and Amount &lt; 1000</text></literalExpression>
  </decision>
</definitions>"##;

fn parse(source: &str) -> dmnx_core::ast::Definitions {
    DmnParser::parse(source, None).unwrap()
}

#[test]
fn test_imported_requirement_resolves_with_alias() {
    let models = Compiler::new()
        .compile(vec![parse(COMMON), parse(MAIN)])
        .unwrap();

    let main = &models[1];
    assert!(!main.has_errors(), "unexpected messages: {:?}", main.messages);
    assert_eq!(main.imports[0].alias, "common");
    assert_eq!(main.imports[0].model, 0);

    let approve = &main.decisions[0];
    let imported = &approve.dependencies[0];
    assert_eq!(imported.name, "Good Score");
    assert_eq!(imported.import_alias.as_deref(), Some("common"));
    assert_eq!(imported.target.model, 0);
    assert_eq!(imported.target.kind, NodeKind::Decision);
    assert!(approve.dependencies[1].import_alias.is_none());
}

#[test]
fn test_missing_import_is_model_error() {
    let models = Compiler::new().compile(vec![parse(MAIN)]).unwrap();
    let types: Vec<_> = models[0].messages.iter().map(|m| m.message_type).collect();
    assert!(types.contains(&MessageType::ImportNotFound));
    assert!(types.contains(&MessageType::ReqNotFound));
    assert!(models[0].has_errors());
}

#[test]
fn test_duplicate_namespace_fails_whole_set() {
    let result = Compiler::new().compile(vec![parse(COMMON), parse(COMMON)]);
    assert!(matches!(result, Err(CompileError::DuplicateNamespace { .. })));
}
