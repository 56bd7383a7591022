//! Compiled decision logic

use crate::ast::{Aggregation, Expression, HitPolicy, Parameter, UnaryTest};

/// Executable form of a boxed expression
#[derive(Debug, Clone, PartialEq)]
pub enum Logic {
    Literal(Expression),
    DecisionTable(CompiledDecisionTable),
    /// Entries evaluated in order; `None` names the final result entry
    Context(Vec<(Option<String>, Logic)>),
    Invocation {
        callee: Expression,
        bindings: Vec<(String, Option<Logic>)>,
    },
    List(Vec<Logic>),
    Relation {
        columns: Vec<String>,
        rows: Vec<Vec<Logic>>,
    },
    Function(FunctionLogic),
}

/// A function body with its formal parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLogic {
    pub parameters: Vec<Parameter>,
    pub body: Box<Logic>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledOutput {
    /// Component name; required when the table has several outputs
    pub name: Option<String>,
    /// Output values in priority order (PRIORITY / OUTPUT ORDER)
    pub priorities: Option<Vec<UnaryTest>>,
    pub default: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    /// One test list per input clause; a list matches if any test matches
    pub inputs: Vec<Vec<UnaryTest>>,
    pub outputs: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDecisionTable {
    pub hit_policy: HitPolicy,
    pub aggregation: Option<Aggregation>,
    pub inputs: Vec<Expression>,
    pub input_values: Vec<Option<Vec<UnaryTest>>>,
    pub outputs: Vec<CompiledOutput>,
    pub rules: Vec<CompiledRule>,
}
