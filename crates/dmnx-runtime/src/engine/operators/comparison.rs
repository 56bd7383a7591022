//! Comparison operator execution

use crate::error::{Result, RuntimeError};
use dmnx_core::ast::Operator;
use dmnx_core::Value;
use std::cmp::Ordering;

/// FEEL equality: deep on lists and contexts, `null = null` holds
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::List(l), Value::List(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| values_equal(a, b))
        }
        (Value::Context(l), Value::Context(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(k, v)| r.get(k).map(|o| values_equal(v, o)).unwrap_or(false))
        }
        _ => left == right,
    }
}

/// Order two values of the same comparable type
pub(crate) fn compare_values(left: &Value, right: &Value) -> Result<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok(l.cmp(r)),
        (Value::String(l), Value::String(r)) => Ok(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Ok(l.cmp(r)),
        _ => Err(RuntimeError::InvalidOperation(format!(
            "Cannot compare {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Execute a comparison operation.
///
/// `=` and `!=` always yield a boolean. Ordering comparisons with a null
/// operand yield null.
pub(crate) fn execute_compare(left: &Value, op: Operator, right: &Value) -> Result<Value> {
    match op {
        Operator::Eq => return Ok(Value::Bool(values_equal(left, right))),
        Operator::Ne => return Ok(Value::Bool(!values_equal(left, right))),
        _ => {}
    }

    if left.is_null() || right.is_null() {
        tracing::debug!(
            "Null comparison: {:?} {:?} {:?}, returning Null",
            left,
            op,
            right
        );
        return Ok(Value::Null);
    }

    let ordering = compare_values(left, right)?;
    let result = match op {
        Operator::Gt => ordering == Ordering::Greater,
        Operator::Ge => ordering != Ordering::Less,
        Operator::Lt => ordering == Ordering::Less,
        Operator::Le => ordering != Ordering::Greater,
        _ => {
            return Err(RuntimeError::InvalidOperation(format!(
                "'{}' is not a comparison operator",
                op.symbol()
            )))
        }
    };
    Ok(Value::Bool(result))
}
