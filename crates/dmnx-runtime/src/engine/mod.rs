//! FEEL evaluation engine
//!
//! Expression evaluation, decision tables, built-in functions and the
//! invocation of function handles.

mod builtins;
mod decision_table;
mod evaluator;
mod function;
mod operators;

pub(crate) use evaluator::Evaluator;
pub(crate) use function::Callable;
