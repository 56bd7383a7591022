//! Decision table evaluation

use super::evaluator::Evaluator;
use super::operators::{compare_values, values_equal};
use crate::error::{Result, RuntimeError};
use dmnx_core::ast::{Aggregation, HitPolicy, UnaryTest};
use dmnx_core::ir::CompiledDecisionTable;
use dmnx_core::{BigDecimal, Context, Value};
use std::cmp::Ordering;

/// One matched rule with its evaluated outputs
struct Hit {
    rule: usize,
    outputs: Vec<Value>,
}

impl<'r> Evaluator<'r> {
    pub(crate) fn evaluate_decision_table(&mut self, table: &CompiledDecisionTable) -> Result<Value> {
        let mut inputs = Vec::with_capacity(table.inputs.len());
        for (i, expr) in table.inputs.iter().enumerate() {
            let value = self.evaluate(expr)?;
            if let Some(Some(allowed)) = table.input_values.get(i) {
                if !value.is_null() && !self.satisfies(&value, allowed)? {
                    return Err(RuntimeError::InvalidArgument(format!(
                        "Input {} value '{}' is not among the allowed input values",
                        i + 1,
                        value
                    )));
                }
            }
            inputs.push(value);
        }

        let mut hits = Vec::new();
        for (index, rule) in table.rules.iter().enumerate() {
            let mut matched = true;
            for (input, tests) in inputs.iter().zip(&rule.inputs) {
                if !self.satisfies(input, tests)? {
                    matched = false;
                    break;
                }
            }
            if matched {
                let outputs = rule
                    .outputs
                    .iter()
                    .map(|expr| self.evaluate(expr))
                    .collect::<Result<Vec<_>>>()?;
                hits.push(Hit {
                    rule: index,
                    outputs,
                });
            }
        }
        tracing::debug!(
            hit_policy = ?table.hit_policy,
            matched = hits.len(),
            "decision table evaluated"
        );

        if hits.is_empty() {
            return if table.hit_policy.is_multi_hit() {
                Ok(match table.aggregation {
                    Some(Aggregation::Count) => Value::from(0),
                    Some(_) => Value::Null,
                    None => Value::List(Vec::new()),
                })
            } else {
                self.default_output(table)
            };
        }

        match table.hit_policy {
            HitPolicy::Unique => {
                if hits.len() > 1 {
                    let rules: Vec<String> = hits.iter().map(|h| (h.rule + 1).to_string()).collect();
                    return Err(RuntimeError::HitPolicyViolation(format!(
                        "UNIQUE hit policy allows one matching rule, but rules {} matched",
                        rules.join(", ")
                    )));
                }
                Ok(shape(table, first_outputs(hits)))
            }
            HitPolicy::Any => {
                let first = &hits[0].outputs;
                if let Some(other) = hits.iter().find(|h| {
                    h.outputs.len() != first.len()
                        || !h.outputs.iter().zip(first).all(|(a, b)| values_equal(a, b))
                }) {
                    return Err(RuntimeError::HitPolicyViolation(format!(
                        "ANY hit policy requires equal outputs, but rules {} and {} differ",
                        hits[0].rule + 1,
                        other.rule + 1
                    )));
                }
                Ok(shape(table, first_outputs(hits)))
            }
            HitPolicy::First => Ok(shape(table, first_outputs(hits))),
            HitPolicy::Priority => {
                let ordered = self.by_priority(table, hits)?;
                Ok(shape(table, first_outputs(ordered)))
            }
            HitPolicy::OutputOrder => {
                let ordered = self.by_priority(table, hits)?;
                Ok(Value::List(
                    ordered.into_iter().map(|h| shape(table, h.outputs)).collect(),
                ))
            }
            HitPolicy::RuleOrder => Ok(Value::List(
                hits.into_iter().map(|h| shape(table, h.outputs)).collect(),
            )),
            HitPolicy::Collect => {
                let values: Vec<Value> = hits.into_iter().map(|h| shape(table, h.outputs)).collect();
                match table.aggregation {
                    None => Ok(Value::List(values)),
                    Some(aggregation) => {
                        if table.outputs.len() > 1 {
                            return Err(RuntimeError::HitPolicyViolation(
                                "COLLECT aggregation requires a single output".to_string(),
                            ));
                        }
                        aggregate(aggregation, values)
                    }
                }
            }
        }
    }

    fn default_output(&mut self, table: &CompiledDecisionTable) -> Result<Value> {
        if table.outputs.iter().all(|o| o.default.is_none()) {
            return Ok(Value::Null);
        }
        let mut outputs = Vec::with_capacity(table.outputs.len());
        for output in &table.outputs {
            outputs.push(match &output.default {
                Some(expr) => self.evaluate(expr)?,
                None => Value::Null,
            });
        }
        Ok(shape(table, outputs))
    }

    /// Sort hits by output value priority, keeping rule order among equals
    fn by_priority(&mut self, table: &CompiledDecisionTable, hits: Vec<Hit>) -> Result<Vec<Hit>> {
        let mut ranked = Vec::with_capacity(hits.len());
        for hit in hits {
            let mut rank = Vec::with_capacity(table.outputs.len());
            for (output, value) in table.outputs.iter().zip(&hit.outputs) {
                rank.push(match &output.priorities {
                    Some(priorities) => self.priority_of(value, priorities)?,
                    None => usize::MAX,
                });
            }
            ranked.push((rank, hit));
        }
        ranked.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(ranked.into_iter().map(|(_, hit)| hit).collect())
    }

    fn priority_of(&mut self, value: &Value, priorities: &[UnaryTest]) -> Result<usize> {
        for (i, test) in priorities.iter().enumerate() {
            if self.satisfies(value, std::slice::from_ref(test))? {
                return Ok(i);
            }
        }
        Ok(usize::MAX)
    }
}

fn first_outputs(hits: Vec<Hit>) -> Vec<Value> {
    hits.into_iter().next().map(|h| h.outputs).unwrap_or_default()
}

/// Single output as a bare value, several outputs as a context
fn shape(table: &CompiledDecisionTable, outputs: Vec<Value>) -> Value {
    if table.outputs.len() == 1 {
        return outputs.into_iter().next().unwrap_or_default();
    }
    let mut ctx = Context::new();
    for (output, value) in table.outputs.iter().zip(outputs) {
        let name = output.name.clone().unwrap_or_default();
        ctx.insert(name, value);
    }
    Value::Context(ctx)
}

fn aggregate(aggregation: Aggregation, values: Vec<Value>) -> Result<Value> {
    match aggregation {
        Aggregation::Count => Ok(Value::from(values.len())),
        Aggregation::Sum => {
            let mut total = BigDecimal::from(0);
            for value in &values {
                total += value.as_number().ok_or_else(|| {
                    RuntimeError::TypeError(format!("Cannot sum a {}", value.type_name()))
                })?;
            }
            Ok(Value::Number(total))
        }
        Aggregation::Min | Aggregation::Max => {
            let wanted = if aggregation == Aggregation::Min {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            let mut best: Option<Value> = None;
            for value in values {
                best = match best {
                    Some(current) if compare_values(&value, &current)? != wanted => Some(current),
                    _ => Some(value),
                };
            }
            Ok(best.unwrap_or(Value::Null))
        }
    }
}
