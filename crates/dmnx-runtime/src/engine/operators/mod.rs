//! Operator execution modules
//!
//! Implementation of FEEL operator evaluation for the expression evaluator.

mod binary;
mod comparison;
mod unary;

pub(crate) use binary::{execute_binary_op, execute_logical_op};
pub(crate) use comparison::{compare_values, execute_compare, values_equal};
pub(crate) use unary::execute_unary_op;
