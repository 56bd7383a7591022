//! Binary operator execution

use crate::error::{Result, RuntimeError};
use dmnx_core::ast::Operator;
use dmnx_core::types::number;
use dmnx_core::Value;

/// Execute an arithmetic operation
pub(crate) fn execute_binary_op(left: &Value, op: Operator, right: &Value) -> Result<Value> {
    // Null in any arithmetic operation returns Null
    if left.is_null() || right.is_null() {
        tracing::debug!(
            "Null in binary operation: {:?} {:?} {:?}, returning Null",
            left,
            op,
            right
        );
        return Ok(Value::Null);
    }

    match (left, op, right) {
        (Value::Number(l), Operator::Add, Value::Number(r)) => Ok(Value::Number(l + r)),
        (Value::Number(l), Operator::Sub, Value::Number(r)) => Ok(Value::Number(l - r)),
        (Value::Number(l), Operator::Mul, Value::Number(r)) => Ok(Value::Number(l * r)),
        (Value::Number(l), Operator::Div, Value::Number(r)) => {
            Ok(number::divide(l, r).map(Value::Number).unwrap_or(Value::Null))
        }
        (Value::Number(l), Operator::Pow, Value::Number(r)) => {
            Ok(number::pow(l, r).map(Value::Number).unwrap_or(Value::Null))
        }

        // String concatenation
        (Value::String(l), Operator::Add, Value::String(r)) => Ok(Value::String(format!("{}{}", l, r))),

        _ => Err(RuntimeError::InvalidOperation(format!(
            "Cannot apply '{}' to {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Three-valued `and` / `or`.
///
/// Non-boolean operands behave like null.
pub(crate) fn execute_logical_op(left: &Value, op: Operator, right: &Value) -> Result<Value> {
    let l = left.as_bool();
    let r = right.as_bool();
    let result = match op {
        Operator::And => match (l, r) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        Operator::Or => match (l, r) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
        _ => {
            return Err(RuntimeError::InvalidOperation(format!(
                "'{}' is not a logical operator",
                op.symbol()
            )))
        }
    };
    Ok(result.map(Value::Bool).unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let r = execute_binary_op(&Value::from(6), Operator::Mul, &Value::from(7)).unwrap();
        assert_eq!(r, Value::from(42));
        let r = execute_binary_op(&Value::from(2), Operator::Pow, &Value::from(10)).unwrap();
        assert_eq!(r, Value::from(1024));
    }

    #[test]
    fn test_decimal_arithmetic_is_exact() {
        let r = execute_binary_op(&Value::from(0.1), Operator::Add, &Value::from(0.2)).unwrap();
        assert_eq!(r.to_string(), "0.3");
        let r = execute_binary_op(&Value::from(1), Operator::Div, &Value::from(8)).unwrap();
        assert_eq!(r, Value::from(0.125));
    }

    #[test]
    fn test_null_propagation_and_division_by_zero() {
        let r = execute_binary_op(&Value::Null, Operator::Add, &Value::from(1)).unwrap();
        assert_eq!(r, Value::Null);
        let r = execute_binary_op(&Value::from(1), Operator::Div, &Value::from(0)).unwrap();
        assert_eq!(r, Value::Null);
    }

    #[test]
    fn test_type_mismatch_is_error() {
        let err = execute_binary_op(&Value::from("a"), Operator::Mul, &Value::from(2)).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidOperation(_)));
    }

    #[test]
    fn test_string_concatenation() {
        let r = execute_binary_op(&Value::from("ab"), Operator::Add, &Value::from("cd")).unwrap();
        assert_eq!(r, Value::from("abcd"));
    }

    #[test]
    fn test_three_valued_logic() {
        let and = |l: Value, r: Value| execute_logical_op(&l, Operator::And, &r).unwrap();
        let or = |l: Value, r: Value| execute_logical_op(&l, Operator::Or, &r).unwrap();
        assert_eq!(and(Value::Bool(false), Value::Null), Value::Bool(false));
        assert_eq!(and(Value::Bool(true), Value::Null), Value::Null);
        assert_eq!(or(Value::Null, Value::Bool(true)), Value::Bool(true));
        assert_eq!(or(Value::Bool(false), Value::Bool(false)), Value::Bool(false));
    }
}
