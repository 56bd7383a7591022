//! Boxed expressions: the logic attached to decisions and BKMs

use serde::{Deserialize, Serialize};

/// Decision logic as written in the model document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoxedExpression {
    /// FEEL literal expression text
    Literal(String),
    DecisionTable(DecisionTable),
    /// Context entries; an entry without a variable is the final result
    Context(Vec<ContextEntry>),
    /// Invocation of a BKM or decision service with named bindings
    Invocation {
        callee: String,
        bindings: Vec<(String, Option<BoxedExpression>)>,
    },
    List(Vec<BoxedExpression>),
    Relation {
        columns: Vec<String>,
        rows: Vec<Vec<BoxedExpression>>,
    },
    Function(FunctionDefinition),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub variable: Option<String>,
    pub value: BoxedExpression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub parameters: Vec<Parameter>,
    pub body: Option<Box<BoxedExpression>>,
}

/// Decision table hit policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HitPolicy {
    #[default]
    Unique,
    First,
    Priority,
    Any,
    Collect,
    RuleOrder,
    OutputOrder,
}

impl HitPolicy {
    /// Parse the `hitPolicy` attribute value (`"RULE ORDER"`, `"FIRST"`, ...)
    pub fn from_attr(attr: &str) -> Option<Self> {
        match attr.trim().to_ascii_uppercase().as_str() {
            "UNIQUE" | "U" => Some(HitPolicy::Unique),
            "FIRST" | "F" => Some(HitPolicy::First),
            "PRIORITY" | "P" => Some(HitPolicy::Priority),
            "ANY" | "A" => Some(HitPolicy::Any),
            "COLLECT" | "C" => Some(HitPolicy::Collect),
            "RULE ORDER" | "R" => Some(HitPolicy::RuleOrder),
            "OUTPUT ORDER" | "O" => Some(HitPolicy::OutputOrder),
            _ => None,
        }
    }

    /// Returns true if the table yields a list of outputs
    pub fn is_multi_hit(&self) -> bool {
        matches!(
            self,
            HitPolicy::Collect | HitPolicy::RuleOrder | HitPolicy::OutputOrder
        )
    }
}

/// COLLECT aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Aggregation {
    Sum,
    Count,
    Min,
    Max,
}

impl Aggregation {
    pub fn from_attr(attr: &str) -> Option<Self> {
        match attr.trim().to_ascii_uppercase().as_str() {
            "SUM" => Some(Aggregation::Sum),
            "COUNT" => Some(Aggregation::Count),
            "MIN" => Some(Aggregation::Min),
            "MAX" => Some(Aggregation::Max),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputClause {
    pub label: Option<String>,
    /// FEEL text of the input expression
    pub expression: String,
    /// Unary tests restricting input values
    pub input_values: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputClause {
    pub name: Option<String>,
    /// Unary tests listing output values in priority order
    pub output_values: Option<String>,
    /// FEEL text used when no rule matches
    pub default_output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRule {
    /// Unary-test texts, one per input clause
    pub input_entries: Vec<String>,
    /// FEEL texts, one per output clause
    pub output_entries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecisionTable {
    pub hit_policy: HitPolicy,
    pub aggregation: Option<Aggregation>,
    pub inputs: Vec<InputClause>,
    pub outputs: Vec<OutputClause>,
    pub rules: Vec<DecisionRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_policy_from_attr() {
        assert_eq!(HitPolicy::from_attr("RULE ORDER"), Some(HitPolicy::RuleOrder));
        assert_eq!(HitPolicy::from_attr("first"), Some(HitPolicy::First));
        assert_eq!(HitPolicy::from_attr("bogus"), None);
        assert!(HitPolicy::Collect.is_multi_hit());
        assert!(!HitPolicy::Unique.is_multi_hit());
    }

    #[test]
    fn test_aggregation_from_attr() {
        assert_eq!(Aggregation::from_attr("sum"), Some(Aggregation::Sum));
        assert_eq!(Aggregation::from_attr("AVG"), None);
    }
}
