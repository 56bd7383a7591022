//! Built-in FEEL functions

use super::operators::{compare_values, values_equal};
use crate::error::{Result, RuntimeError};
use bigdecimal::RoundingMode;
use dmnx_core::types::number;
use dmnx_core::{BigDecimal, Value};
use std::cmp::Ordering;

/// Invoke a built-in function by name
pub(crate) fn call_builtin(name: &str, args: Vec<Value>) -> Result<Value> {
    match name {
        "not" => {
            expect_args(name, &args, 1, 1)?;
            Ok(match &args[0] {
                Value::Bool(b) => Value::Bool(!b),
                _ => Value::Null,
            })
        }

        // Strings
        "string length" => {
            expect_args(name, &args, 1, 1)?;
            Ok(string_arg(&args[0])
                .map(|s| Value::from(s.chars().count()))
                .unwrap_or(Value::Null))
        }
        "substring" => {
            expect_args(name, &args, 2, 3)?;
            substring(&args)
        }
        "upper case" => string_map(name, &args, str::to_uppercase),
        "lower case" => string_map(name, &args, str::to_lowercase),
        "contains" => string_predicate(name, &args, |s, m| s.contains(m)),
        "starts with" => string_predicate(name, &args, |s, m| s.starts_with(m)),
        "ends with" => string_predicate(name, &args, |s, m| s.ends_with(m)),
        "string" => {
            expect_args(name, &args, 1, 1)?;
            Ok(match &args[0] {
                Value::Null => Value::Null,
                Value::String(s) => Value::String(s.clone()),
                other => Value::String(other.to_string()),
            })
        }
        "number" => {
            expect_args(name, &args, 1, 1)?;
            Ok(match &args[0] {
                Value::Number(n) => Value::Number(n.clone()),
                Value::String(s) => number::parse_number(s)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            })
        }

        // Lists
        "count" => {
            expect_args(name, &args, 1, 1)?;
            Ok(Value::from(list_arg(name, &args[0])?.len()))
        }
        "sum" => {
            let items = varargs(args);
            let numbers = numbers(name, &items)?;
            Ok(if numbers.is_empty() {
                Value::Null
            } else {
                Value::Number(total(&numbers))
            })
        }
        "mean" => {
            let items = varargs(args);
            let numbers = numbers(name, &items)?;
            Ok(if numbers.is_empty() {
                Value::Null
            } else {
                number::divide(&total(&numbers), &BigDecimal::from(numbers.len() as u64))
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            })
        }
        "min" => extreme(name, varargs(args), Ordering::Less),
        "max" => extreme(name, varargs(args), Ordering::Greater),
        "all" => {
            let items = varargs(args);
            if items.iter().any(|v| v.as_bool() == Some(false)) {
                Ok(Value::Bool(false))
            } else if items.iter().all(|v| v.as_bool() == Some(true)) {
                Ok(Value::Bool(true))
            } else {
                Ok(Value::Null)
            }
        }
        "any" => {
            let items = varargs(args);
            if items.iter().any(|v| v.as_bool() == Some(true)) {
                Ok(Value::Bool(true))
            } else if items.iter().all(|v| v.as_bool() == Some(false)) {
                Ok(Value::Bool(false))
            } else {
                Ok(Value::Null)
            }
        }
        "append" => {
            expect_args(name, &args, 1, usize::MAX)?;
            let mut args = args.into_iter();
            let mut list = args.next().map(into_list).unwrap_or_default();
            list.extend(args);
            Ok(Value::List(list))
        }
        "concatenate" => Ok(Value::List(args.into_iter().flat_map(into_list).collect())),
        "list contains" => {
            expect_args(name, &args, 2, 2)?;
            let list = list_arg(name, &args[0])?;
            Ok(Value::Bool(list.iter().any(|v| values_equal(v, &args[1]))))
        }
        "distinct values" => {
            expect_args(name, &args, 1, 1)?;
            let mut distinct: Vec<Value> = Vec::new();
            for item in list_arg(name, &args[0])? {
                if !distinct.iter().any(|d| values_equal(d, item)) {
                    distinct.push(item.clone());
                }
            }
            Ok(Value::List(distinct))
        }
        "flatten" => {
            expect_args(name, &args, 1, 1)?;
            let mut out = Vec::new();
            flatten_into(list_arg(name, &args[0])?, &mut out);
            Ok(Value::List(out))
        }
        "reverse" => {
            expect_args(name, &args, 1, 1)?;
            let mut list = list_arg(name, &args[0])?.to_vec();
            list.reverse();
            Ok(Value::List(list))
        }

        // Numbers
        "abs" => number_map(name, &args, |n| Some(n.abs())),
        "floor" => number_map(name, &args, |n| Some(number::floor(n))),
        "ceiling" => number_map(name, &args, |n| Some(number::ceiling(n))),
        "sqrt" => number_map(name, &args, number::sqrt),
        "decimal" => rounding(name, &args, RoundingMode::HalfEven),
        "round half up" => rounding(name, &args, RoundingMode::HalfUp),
        "round half down" => rounding(name, &args, RoundingMode::HalfDown),
        "round up" => rounding(name, &args, RoundingMode::Up),
        "round down" => rounding(name, &args, RoundingMode::Down),
        "modulo" => {
            expect_args(name, &args, 2, 2)?;
            Ok(match (args[0].as_number(), args[1].as_number()) {
                (Some(n), Some(d)) => number::modulo(n, d).map(Value::Number).unwrap_or(Value::Null),
                _ => Value::Null,
            })
        }

        // Contexts
        "is defined" => {
            expect_args(name, &args, 1, 1)?;
            Ok(Value::Bool(!args[0].is_null()))
        }
        "get value" => {
            expect_args(name, &args, 2, 2)?;
            Ok(match (&args[0], &args[1]) {
                (Value::Context(ctx), Value::String(key)) => {
                    ctx.get(key).cloned().unwrap_or(Value::Null)
                }
                _ => Value::Null,
            })
        }

        _ => Err(RuntimeError::FunctionNotFound(name.to_string())),
    }
}

fn expect_args(name: &str, args: &[Value], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else if max == usize::MAX {
            format!("at least {}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(RuntimeError::InvalidArgument(format!(
            "'{}' expects {} argument(s), got {}",
            name,
            expected,
            args.len()
        )));
    }
    Ok(())
}

fn string_arg(value: &Value) -> Option<&str> {
    value.as_str()
}

fn list_arg<'v>(name: &str, value: &'v Value) -> Result<&'v [Value]> {
    value.as_list().ok_or_else(|| {
        RuntimeError::InvalidArgument(format!(
            "'{}' expects a list, got {}",
            name,
            value.type_name()
        ))
    })
}

fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::List(items) => items,
        other => vec![other],
    }
}

/// A single list argument, or the arguments themselves
fn varargs(args: Vec<Value>) -> Vec<Value> {
    if args.len() == 1 {
        if let Some(Value::List(_)) = args.first() {
            return args.into_iter().flat_map(into_list).collect();
        }
    }
    args
}

fn numbers<'v>(name: &str, items: &'v [Value]) -> Result<Vec<&'v BigDecimal>> {
    items
        .iter()
        .map(|v| {
            v.as_number().ok_or_else(|| {
                RuntimeError::InvalidArgument(format!(
                    "'{}' expects numbers, got {}",
                    name,
                    v.type_name()
                ))
            })
        })
        .collect()
}

fn total(numbers: &[&BigDecimal]) -> BigDecimal {
    numbers.iter().fold(BigDecimal::from(0), |sum, n| sum + *n)
}

fn extreme(name: &str, items: Vec<Value>, wanted: Ordering) -> Result<Value> {
    let mut best: Option<Value> = None;
    for item in items {
        best = match best {
            None => Some(item),
            Some(current) => {
                let ordering = compare_values(&item, &current).map_err(|_| {
                    RuntimeError::InvalidArgument(format!(
                        "'{}' cannot compare {} and {}",
                        name,
                        item.type_name(),
                        current.type_name()
                    ))
                })?;
                Some(if ordering == wanted { item } else { current })
            }
        };
    }
    Ok(best.unwrap_or(Value::Null))
}

fn flatten_into(items: &[Value], out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::List(inner) => flatten_into(inner, out),
            other => out.push(other.clone()),
        }
    }
}

fn substring(args: &[Value]) -> Result<Value> {
    let (Some(s), Some(start)) = (args[0].as_str(), args[1].as_number()) else {
        return Ok(Value::Null);
    };
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let Some(start) = number::to_integer(&number::truncate(start)) else {
        return Ok(Value::Null);
    };
    let from = if start > 0 { start - 1 } else { len.saturating_add(start) };
    if start == 0 || from < 0 || from > len {
        return Ok(Value::Null);
    }
    let to = match args.get(2).map(Value::as_number) {
        None => len,
        Some(Some(length)) => match number::to_integer(&number::truncate(length)) {
            Some(length) => from.saturating_add(length).min(len),
            None => return Ok(Value::Null),
        },
        Some(None) => return Ok(Value::Null),
    };
    if to < from {
        return Ok(Value::Null);
    }
    Ok(Value::String(chars[from as usize..to as usize].iter().collect()))
}

fn string_map(name: &str, args: &[Value], f: impl Fn(&str) -> String) -> Result<Value> {
    expect_args(name, args, 1, 1)?;
    Ok(string_arg(&args[0])
        .map(|s| Value::String(f(s)))
        .unwrap_or(Value::Null))
}

fn string_predicate(name: &str, args: &[Value], f: impl Fn(&str, &str) -> bool) -> Result<Value> {
    expect_args(name, args, 2, 2)?;
    Ok(match (string_arg(&args[0]), string_arg(&args[1])) {
        (Some(s), Some(m)) => Value::Bool(f(s, m)),
        _ => Value::Null,
    })
}

fn number_map(
    name: &str,
    args: &[Value],
    f: impl Fn(&BigDecimal) -> Option<BigDecimal>,
) -> Result<Value> {
    expect_args(name, args, 1, 1)?;
    Ok(args[0]
        .as_number()
        .and_then(f)
        .map(Value::Number)
        .unwrap_or(Value::Null))
}

fn rounding(name: &str, args: &[Value], mode: RoundingMode) -> Result<Value> {
    expect_args(name, args, 2, 2)?;
    let scale = args[1].as_number().and_then(number::to_integer);
    Ok(match (args[0].as_number(), scale) {
        (Some(n), Some(scale)) => Value::Number(number::round(n, scale, mode)),
        _ => Value::Null,
    })
}
