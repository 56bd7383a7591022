//! Boxed expression code generation
//!
//! Parses the FEEL text held by boxed expressions into [`Logic`] trees.

use crate::error::{CompileError, Result};
use dmnx_core::ast::{BoxedExpression, DecisionTable, FunctionDefinition};
use dmnx_core::ir::{CompiledDecisionTable, CompiledOutput, CompiledRule, FunctionLogic, Logic};
use dmnx_parser::ExpressionParser;

/// Compiles boxed expressions into executable logic
pub struct LogicCompiler;

impl LogicCompiler {
    /// Compile a boxed expression
    pub fn compile(expr: &BoxedExpression) -> Result<Logic> {
        match expr {
            BoxedExpression::Literal(text) => Ok(Logic::Literal(ExpressionParser::parse(text)?)),
            BoxedExpression::DecisionTable(table) => {
                Self::compile_decision_table(table).map(Logic::DecisionTable)
            }
            BoxedExpression::Context(entries) => {
                let compiled = entries
                    .iter()
                    .map(|entry| -> Result<(Option<String>, Logic)> {
                        Ok((entry.variable.clone(), Self::compile(&entry.value)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Logic::Context(compiled))
            }
            BoxedExpression::Invocation { callee, bindings } => {
                let callee = ExpressionParser::parse(callee)?;
                let bindings = bindings
                    .iter()
                    .map(|(name, value)| -> Result<(String, Option<Logic>)> {
                        let value = value.as_ref().map(Self::compile).transpose()?;
                        Ok((name.clone(), value))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Logic::Invocation { callee, bindings })
            }
            BoxedExpression::List(items) => Ok(Logic::List(
                items.iter().map(Self::compile).collect::<Result<Vec<_>>>()?,
            )),
            BoxedExpression::Relation { columns, rows } => {
                for row in rows {
                    if row.len() != columns.len() {
                        return Err(CompileError::InvalidExpression(format!(
                            "relation row has {} cells but {} columns are declared",
                            row.len(),
                            columns.len()
                        )));
                    }
                }
                let rows = rows
                    .iter()
                    .map(|row| row.iter().map(Self::compile).collect::<Result<Vec<_>>>())
                    .collect::<Result<Vec<_>>>()?;
                Ok(Logic::Relation {
                    columns: columns.clone(),
                    rows,
                })
            }
            BoxedExpression::Function(function) => Self::compile_function(function).map(Logic::Function),
        }
    }

    /// Compile a function definition (BKM encapsulated logic)
    pub fn compile_function(function: &FunctionDefinition) -> Result<FunctionLogic> {
        let body = function
            .body
            .as_deref()
            .ok_or_else(|| CompileError::InvalidExpression("function definition has no body".to_string()))?;
        Ok(FunctionLogic {
            parameters: function.parameters.clone(),
            body: Box::new(Self::compile(body)?),
        })
    }

    fn compile_decision_table(table: &DecisionTable) -> Result<CompiledDecisionTable> {
        if table.outputs.is_empty() {
            return Err(CompileError::InvalidExpression(
                "decision table declares no outputs".to_string(),
            ));
        }
        if table.outputs.len() > 1 && table.outputs.iter().any(|o| o.name.is_none()) {
            return Err(CompileError::InvalidExpression(
                "decision table with several outputs must name every output".to_string(),
            ));
        }

        let inputs = table
            .inputs
            .iter()
            .map(|input| ExpressionParser::parse(&input.expression))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let input_values = table
            .inputs
            .iter()
            .map(|input| {
                input
                    .input_values
                    .as_deref()
                    .map(ExpressionParser::parse_unary_tests)
                    .transpose()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let outputs = table
            .outputs
            .iter()
            .map(|output| -> Result<CompiledOutput> {
                Ok(CompiledOutput {
                    name: output.name.clone(),
                    priorities: output
                        .output_values
                        .as_deref()
                        .map(ExpressionParser::parse_unary_tests)
                        .transpose()?,
                    default: output
                        .default_output
                        .as_deref()
                        .map(ExpressionParser::parse)
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rules = Vec::with_capacity(table.rules.len());
        for (i, rule) in table.rules.iter().enumerate() {
            if rule.input_entries.len() != table.inputs.len()
                || rule.output_entries.len() != table.outputs.len()
            {
                return Err(CompileError::InvalidExpression(format!(
                    "rule {} has {} input and {} output entries, table declares {} and {}",
                    i + 1,
                    rule.input_entries.len(),
                    rule.output_entries.len(),
                    table.inputs.len(),
                    table.outputs.len()
                )));
            }
            rules.push(CompiledRule {
                inputs: rule
                    .input_entries
                    .iter()
                    .map(|e| ExpressionParser::parse_unary_tests(e))
                    .collect::<std::result::Result<Vec<_>, _>>()?,
                outputs: rule
                    .output_entries
                    .iter()
                    .map(|e| ExpressionParser::parse(e))
                    .collect::<std::result::Result<Vec<_>, _>>()?,
            });
        }

        Ok(CompiledDecisionTable {
            hit_policy: table.hit_policy,
            aggregation: table.aggregation,
            inputs,
            input_values,
            outputs,
            rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmnx_core::ast::{ContextEntry, DecisionRule, InputClause, OutputClause};

    fn table(rules: Vec<DecisionRule>) -> DecisionTable {
        DecisionTable {
            inputs: vec![InputClause {
                label: None,
                expression: "age".to_string(),
                input_values: None,
            }],
            outputs: vec![OutputClause {
                name: Some("band".to_string()),
                output_values: Some(r#""young","old""#.to_string()),
                default_output: None,
            }],
            rules,
            ..DecisionTable::default()
        }
    }

    #[test]
    fn test_compile_literal() {
        let logic = LogicCompiler::compile(&BoxedExpression::Literal("age >= 18".to_string())).unwrap();
        assert!(matches!(logic, Logic::Literal(_)));
    }

    #[test]
    fn test_compile_literal_syntax_error() {
        let err = LogicCompiler::compile(&BoxedExpression::Literal("age >=".to_string())).unwrap_err();
        assert!(matches!(err, CompileError::InvalidExpression(_)));
    }

    #[test]
    fn test_compile_decision_table() {
        let logic = LogicCompiler::compile(&BoxedExpression::DecisionTable(table(vec![DecisionRule {
            input_entries: vec!["< 30".to_string()],
            output_entries: vec![r#""young""#.to_string()],
        }])))
        .unwrap();

        if let Logic::DecisionTable(compiled) = logic {
            assert_eq!(compiled.rules.len(), 1);
            assert_eq!(compiled.outputs[0].priorities.as_ref().unwrap().len(), 2);
        } else {
            panic!("Expected decision table");
        }
    }

    #[test]
    fn test_compile_decision_table_entry_count_mismatch() {
        let err = LogicCompiler::compile(&BoxedExpression::DecisionTable(table(vec![DecisionRule {
            input_entries: vec!["< 30".to_string(), "-".to_string()],
            output_entries: vec![r#""young""#.to_string()],
        }])))
        .unwrap_err();
        assert!(err.to_string().contains("rule 1"));
    }

    #[test]
    fn test_compile_context() {
        let logic = LogicCompiler::compile(&BoxedExpression::Context(vec![
            ContextEntry {
                variable: Some("base".to_string()),
                value: BoxedExpression::Literal("10".to_string()),
            },
            ContextEntry {
                variable: None,
                value: BoxedExpression::Literal("base * 2".to_string()),
            },
        ]))
        .unwrap();
        assert!(matches!(logic, Logic::Context(ref entries) if entries.len() == 2));
    }
}
