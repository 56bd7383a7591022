//! FEEL expression and boxed-logic evaluator

use super::builtins::call_builtin;
use super::function::{Args, Callable};
use super::operators::{
    compare_values, execute_binary_op, execute_compare, execute_logical_op, execute_unary_op,
    values_equal,
};
use crate::error::{Result, RuntimeError};
use crate::runtime::DmnRuntime;
use dmnx_core::ast::{Arguments, Expression, Operator, Quantifier, UnaryTest};
use dmnx_core::builtins::is_builtin_function;
use dmnx_core::ir::{FunctionLogic, Logic};
use dmnx_core::types::number;
use dmnx_core::{Context, Value};
use std::cmp::Ordering;

const MAX_CALL_DEPTH: usize = 128;

/// Largest integer range a `for`/`some`/`every` may expand
const MAX_RANGE_ITEMS: u64 = 1_000_000;

/// Evaluates expressions against a stack of scope frames
pub(crate) struct Evaluator<'r> {
    runtime: &'r DmnRuntime,
    frames: Vec<Context>,
    depth: usize,
    /// Inside a filter predicate, unknown names read as null
    lenient: usize,
}

impl<'r> Evaluator<'r> {
    pub(crate) fn new(runtime: &'r DmnRuntime, scope: Context) -> Self {
        Self {
            runtime,
            frames: vec![scope],
            depth: 0,
            lenient: 0,
        }
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    fn with_frame<T>(&mut self, frame: Context, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.frames.push(frame);
        let result = f(self);
        self.frames.pop();
        result
    }

    /// Run `f` with only `frames` visible (lexical scope of a function)
    fn with_scope<T>(&mut self, frames: Vec<Context>, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::RuntimeError(format!(
                "Maximum invocation depth of {} exceeded",
                MAX_CALL_DEPTH
            )));
        }
        let saved = std::mem::replace(&mut self.frames, frames);
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        self.frames = saved;
        result
    }

    /// All visible names flattened into one context, inner frames winning
    fn capture(&self) -> Context {
        let mut closure = Context::new();
        for frame in &self.frames {
            for (k, v) in frame {
                closure.insert(k.clone(), v.clone());
            }
        }
        closure
    }

    /// Evaluate compiled boxed logic
    pub(crate) fn evaluate_logic(&mut self, logic: &Logic) -> Result<Value> {
        match logic {
            Logic::Literal(expr) => self.evaluate(expr),
            Logic::DecisionTable(table) => self.evaluate_decision_table(table),
            Logic::Context(entries) => self.with_frame(Context::new(), |this| {
                let mut result = Context::new();
                for (variable, entry) in entries {
                    let value = this.evaluate_logic(entry)?;
                    match variable {
                        Some(name) => {
                            if let Some(frame) = this.frames.last_mut() {
                                frame.insert(name.clone(), value.clone());
                            }
                            result.insert(name.clone(), value);
                        }
                        None => return Ok(value),
                    }
                }
                Ok(Value::Context(result))
            }),
            Logic::Invocation { callee, bindings } => {
                let function = self.evaluate(callee)?;
                let mut args = Vec::with_capacity(bindings.len());
                for (name, binding) in bindings {
                    let value = match binding {
                        Some(logic) => self.evaluate_logic(logic)?,
                        None => Value::Null,
                    };
                    args.push((name.clone(), value));
                }
                self.invoke(&function, Args::Named(args))
            }
            Logic::List(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| self.evaluate_logic(item))
                    .collect::<Result<Vec<_>>>()?,
            )),
            Logic::Relation { columns, rows } => {
                let mut out = Vec::with_capacity(rows.len());
                for row in rows {
                    let mut entry = Context::new();
                    for (column, cell) in columns.iter().zip(row) {
                        entry.insert(column.clone(), self.evaluate_logic(cell)?);
                    }
                    out.push(Value::Context(entry));
                }
                Ok(Value::List(out))
            }
            Logic::Function(function) => Ok(self.lambda(function)),
        }
    }

    fn lambda(&self, function: &FunctionLogic) -> Value {
        Callable::Lambda {
            parameters: function.parameters.clone(),
            body: (*function.body).clone(),
            closure: self.capture(),
        }
        .into_value("anonymous function")
    }

    /// Evaluate a FEEL expression
    pub(crate) fn evaluate(&mut self, expr: &Expression) -> Result<Value> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::Name(name) => match self.lookup(name) {
                Some(value) => Ok(value.clone()),
                None if self.lenient > 0 => Ok(Value::Null),
                None => Err(RuntimeError::RuntimeError(format!("Unknown variable '{}'", name))),
            },

            Expression::Path { base, field } => {
                let base = self.evaluate(base)?;
                Ok(path(&base, field))
            }

            Expression::Binary { left, op, right } => {
                let l = self.evaluate(left)?;
                match op {
                    Operator::And if l.as_bool() == Some(false) => Ok(Value::Bool(false)),
                    Operator::Or if l.as_bool() == Some(true) => Ok(Value::Bool(true)),
                    Operator::And | Operator::Or => {
                        let r = self.evaluate(right)?;
                        execute_logical_op(&l, *op, &r)
                    }
                    op if op.is_comparison() => {
                        let r = self.evaluate(right)?;
                        execute_compare(&l, *op, &r)
                    }
                    op => {
                        let r = self.evaluate(right)?;
                        execute_binary_op(&l, *op, &r)
                    }
                }
            }

            Expression::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                execute_unary_op(&value, *op)
            }

            Expression::Between { value, low, high } => {
                let value = self.evaluate(value)?;
                let low = self.evaluate(low)?;
                let high = self.evaluate(high)?;
                if value.is_null() || low.is_null() || high.is_null() {
                    return Ok(Value::Null);
                }
                Ok(Value::Bool(
                    compare_values(&value, &low)? != Ordering::Less
                        && compare_values(&value, &high)? != Ordering::Greater,
                ))
            }

            Expression::In { value, tests } => {
                let value = self.evaluate(value)?;
                Ok(Value::Bool(self.satisfies(&value, tests)?))
            }

            Expression::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.as_bool() == Some(true) {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expression::For {
                variable,
                iterable,
                body,
            } => {
                let items = self.iteration_items(iterable)?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let frame = single(variable, item);
                    out.push(self.with_frame(frame, |this| this.evaluate(body))?);
                }
                Ok(Value::List(out))
            }

            Expression::Quantified {
                quantifier,
                variable,
                iterable,
                condition,
            } => {
                let items = self.iteration_items(iterable)?;
                for item in items {
                    let frame = single(variable, item);
                    let holds = self.with_frame(frame, |this| this.evaluate(condition))?.as_bool() == Some(true);
                    match quantifier {
                        Quantifier::Some if holds => return Ok(Value::Bool(true)),
                        Quantifier::Every if !holds => return Ok(Value::Bool(false)),
                        _ => {}
                    }
                }
                Ok(Value::Bool(*quantifier == Quantifier::Every))
            }

            Expression::List(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| self.evaluate(item))
                    .collect::<Result<Vec<_>>>()?,
            )),

            Expression::Range { .. } => Err(RuntimeError::InvalidOperation(
                "A range can only be used as a unary test or iteration domain".to_string(),
            )),

            Expression::Context(entries) => self.with_frame(Context::new(), |this| {
                let mut result = Context::new();
                for (key, entry) in entries {
                    let value = this.evaluate(entry)?;
                    if let Some(frame) = this.frames.last_mut() {
                        frame.insert(key.clone(), value.clone());
                    }
                    result.insert(key.clone(), value);
                }
                Ok(Value::Context(result))
            }),

            Expression::Filter { base, filter } => {
                let base = self.evaluate(base)?;
                self.filter(base, filter)
            }

            Expression::FunctionCall { callee, args } => {
                let args = match args {
                    Arguments::Positional(args) => Args::Positional(
                        args.iter()
                            .map(|a| self.evaluate(a))
                            .collect::<Result<Vec<_>>>()?,
                    ),
                    Arguments::Named(args) => Args::Named(
                        args.iter()
                            .map(|(n, a)| Ok((n.clone(), self.evaluate(a)?)))
                            .collect::<Result<Vec<_>>>()?,
                    ),
                };

                if let Expression::Name(name) = callee.as_ref() {
                    if self.lookup(name).is_none() {
                        if is_builtin_function(name) {
                            return call_builtin(name, args.into_values());
                        }
                        return Err(RuntimeError::FunctionNotFound(name.clone()));
                    }
                }
                let function = self.evaluate(callee)?;
                self.invoke(&function, args)
            }
        }
    }

    /// Items of a `for`/`some`/`every` domain; integer ranges expand
    fn iteration_items(&mut self, iterable: &Expression) -> Result<Vec<Value>> {
        if let Expression::Range { start, end, .. } = iterable {
            let start = self.evaluate(start)?;
            let end = self.evaluate(end)?;
            let bound = |v: &Value| {
                v.as_number()
                    .map(number::truncate)
                    .as_ref()
                    .and_then(number::to_integer)
            };
            let (Some(start), Some(end)) = (bound(&start), bound(&end)) else {
                return Err(RuntimeError::TypeError(
                    "Range bounds must be integer numbers".to_string(),
                ));
            };
            if start.abs_diff(end) >= MAX_RANGE_ITEMS {
                return Err(RuntimeError::InvalidOperation(format!(
                    "Range [{}..{}] is too large to iterate",
                    start, end
                )));
            }
            let items: Vec<Value> = if start <= end {
                (start..=end).map(Value::from).collect()
            } else {
                (end..=start).rev().map(Value::from).collect()
            };
            return Ok(items);
        }
        Ok(match self.evaluate(iterable)? {
            Value::List(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        })
    }

    fn filter(&mut self, base: Value, filter: &Expression) -> Result<Value> {
        let items = match base {
            Value::List(items) => items,
            Value::Null => return Ok(Value::Null),
            other => vec![other],
        };

        let mut kept = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let mut frame = match item {
                Value::Context(ctx) => ctx.clone(),
                _ => Context::new(),
            };
            frame.insert("item".to_string(), item.clone());
            self.lenient += 1;
            let result = self.with_frame(frame, |this| this.evaluate(filter));
            self.lenient -= 1;
            match result? {
                // numeric filter: 1-based index, negative from the end
                Value::Number(n) if i == 0 => {
                    let len = items.len() as i64;
                    let Some(index) = number::to_integer(&number::truncate(&n)) else {
                        return Ok(Value::Null);
                    };
                    let position = if index > 0 { index - 1 } else { len.saturating_add(index) };
                    if index == 0 || position < 0 || position >= len {
                        return Ok(Value::Null);
                    }
                    return Ok(items[position as usize].clone());
                }
                Value::Bool(true) => kept.push(item.clone()),
                _ => {}
            }
        }
        Ok(Value::List(kept))
    }

    /// Invoke a function value
    pub(crate) fn invoke(&mut self, function: &Value, args: Args) -> Result<Value> {
        let callable = match function {
            Value::Handle(handle) => handle.downcast::<Callable>().ok_or_else(|| {
                RuntimeError::FunctionNotFound(format!("'{}' is not invocable", handle.name()))
            })?,
            Value::Null => {
                return Err(RuntimeError::FunctionNotFound(
                    "Cannot invoke null".to_string(),
                ))
            }
            other => {
                return Err(RuntimeError::FunctionNotFound(format!(
                    "Cannot invoke a {}",
                    other.type_name()
                )))
            }
        };

        match callable.as_ref() {
            Callable::Lambda {
                parameters,
                body,
                closure,
            } => {
                let names: Vec<String> = parameters.iter().map(|p| p.name.clone()).collect();
                let frames = vec![closure.clone(), args.bind(&names)];
                self.with_scope(frames, |this| this.evaluate_logic(body))
            }
            Callable::Bkm(node) => {
                let runtime = self.runtime;
                let (function, closure) = runtime.bkm_function(*node)?;
                let names: Vec<String> = function.parameters.iter().map(|p| p.name.clone()).collect();
                if let Args::Positional(values) = &args {
                    if values.len() > names.len() {
                        return Err(RuntimeError::InvalidArgument(format!(
                            "Function expects {} argument(s), got {}",
                            names.len(),
                            args.len()
                        )));
                    }
                }
                let frames = vec![closure, args.bind(&names)];
                self.with_scope(frames, |this| this.evaluate_logic(&function.body))
            }
            Callable::Service(node) => {
                let runtime = self.runtime;
                let parameters = runtime.service_parameters(*node);
                let inputs = args.bind(&parameters);
                runtime.invoke_service(*node, inputs)
            }
        }
    }

    /// Returns true if `input` satisfies any of `tests`
    pub(crate) fn satisfies(&mut self, input: &Value, tests: &[UnaryTest]) -> Result<bool> {
        for test in tests {
            if self.satisfies_one(input, test)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn satisfies_one(&mut self, input: &Value, test: &UnaryTest) -> Result<bool> {
        match test {
            UnaryTest::Any => Ok(true),
            UnaryTest::Not(inner) => Ok(!self.satisfies(input, inner)?),
            UnaryTest::Compare { op, value } => {
                let value = self.evaluate(value)?;
                Ok(execute_compare(input, *op, &value)?.as_bool() == Some(true))
            }
            UnaryTest::Interval {
                start,
                end,
                start_closed,
                end_closed,
            } => {
                let start = self.evaluate(start)?;
                let end = self.evaluate(end)?;
                if input.is_null() || start.is_null() || end.is_null() {
                    return Ok(false);
                }
                let lower = compare_values(input, &start)?;
                let upper = compare_values(input, &end)?;
                let above = lower == Ordering::Greater || (*start_closed && lower == Ordering::Equal);
                let below = upper == Ordering::Less || (*end_closed && upper == Ordering::Equal);
                Ok(above && below)
            }
            UnaryTest::Expression(expr) if expr.mentions_input() => {
                let frame = single("?", input.clone());
                let result = self.with_frame(frame, |this| this.evaluate(expr))?;
                Ok(result.as_bool() == Some(true))
            }
            UnaryTest::Expression(expr) => {
                let value = self.evaluate(expr)?;
                Ok(match value {
                    Value::List(items) if !matches!(input, Value::List(_)) => {
                        items.iter().any(|item| values_equal(item, input))
                    }
                    // boolean expression not mentioning the input
                    Value::Bool(b) if !matches!(input, Value::Bool(_)) => b,
                    other => values_equal(&other, input),
                })
            }
        }
    }
}

fn single(name: &str, value: Value) -> Context {
    let mut frame = Context::new();
    frame.insert(name.to_string(), value);
    frame
}

/// `base.field`; lists project the field over their items
fn path(base: &Value, field: &str) -> Value {
    match base {
        Value::Context(ctx) => ctx.get(field).cloned().unwrap_or(Value::Null),
        Value::List(items) => Value::List(items.iter().map(|item| path(item, field)).collect()),
        _ => Value::Null,
    }
}
