//! Unary operator execution

use crate::error::{Result, RuntimeError};
use dmnx_core::ast::UnaryOperator;
use dmnx_core::Value;

/// Execute a unary operation
pub(crate) fn execute_unary_op(operand: &Value, op: UnaryOperator) -> Result<Value> {
    match (op, operand) {
        (UnaryOperator::Negate, Value::Number(n)) => Ok(Value::Number(-n.clone())),
        (UnaryOperator::Negate, Value::Null) => Ok(Value::Null),
        _ => Err(RuntimeError::InvalidOperation(format!(
            "Cannot negate {}",
            operand.type_name()
        ))),
    }
}
