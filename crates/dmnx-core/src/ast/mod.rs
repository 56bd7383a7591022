//! Abstract Syntax Tree (AST) definitions for dmnx
//!
//! This module contains the AST node definitions for:
//! - FEEL expressions and unary tests
//! - DMN definitions (input data, decisions, BKMs, decision services, item definitions)
//! - Boxed expressions (literal expressions, decision tables, contexts, ...)

pub mod boxed;
pub mod definitions;
pub mod expression;
pub mod operator;

pub use boxed::{
    Aggregation, BoxedExpression, ContextEntry, DecisionRule, DecisionTable, FunctionDefinition,
    HitPolicy, InputClause, OutputClause, Parameter,
};
pub use definitions::{
    BusinessKnowledgeModel, Decision, DecisionService, Definitions, Import, InputData,
    ItemDefinition, Requirement,
};
pub use expression::{Arguments, Expression, Quantifier, UnaryOperator, UnaryTest};
pub use operator::Operator;
