//! Runtime value types for DMN evaluation
//!
//! The `Value` enum represents every value a decision can produce. Most
//! variants are plain data; `Handle` wraps engine-internal objects
//! (business knowledge model functions, decision service entry points)
//! that are meaningful only inside the runtime and are never serializable.

use super::number::{format_number, from_f64, parse_number};
use crate::error::CoreError;
use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Ordered name-to-value mapping (FEEL context)
pub type Context = IndexMap<String, Value>;

/// Runtime value type
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Arbitrary-precision decimal number
    Number(BigDecimal),
    /// String value
    String(String),
    /// Ordered list of values
    List(Vec<Value>),
    /// FEEL context (ordered key-value map)
    Context(Context),
    /// Engine-internal opaque handle
    Handle(Handle),
}

/// What an opaque handle stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// Invocable function (business knowledge model or FEEL function)
    Function,
    /// Decision service entry point
    DecisionService,
}

/// Opaque reference to an engine-internal object.
///
/// The payload is owned by the runtime and can only be recovered with
/// [`Handle::downcast`]. Everything outside the runtime sees the kind and
/// name only.
#[derive(Clone)]
pub struct Handle {
    kind: HandleKind,
    name: String,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Handle {
    /// Wrap an engine object
    pub fn new<T: Any + Send + Sync>(kind: HandleKind, name: impl Into<String>, payload: Arc<T>) -> Self {
        Self {
            kind,
            name: name.into(),
            payload,
        }
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recover the engine object if it has type `T`
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.payload).downcast::<T>().ok()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:?}, {:?})", self.kind, self.name)
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.name == other.name
            && std::ptr::addr_eq(Arc::as_ptr(&self.payload), Arc::as_ptr(&other.payload))
    }
}

impl Value {
    /// FEEL type name of this value, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Context(_) => "context",
            Value::Handle(h) => match h.kind() {
                HandleKind::Function => "function",
                HandleKind::DecisionService => "decision service",
            },
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value is an engine-internal handle
    pub fn is_handle(&self) -> bool {
        matches!(self, Value::Handle(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&BigDecimal> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<&Context> {
        match self {
            Value::Context(ctx) => Some(ctx),
            _ => None,
        }
    }

    /// Convert to a JSON number, keeping the exact decimal digits.
    ///
    /// Integral values have no fractional part in the output.
    pub fn number_to_json(n: &BigDecimal) -> serde_json::Value {
        serde_json::from_str::<serde_json::Number>(&format_number(n))
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => parse_number(&n.to_string())
                .map(Value::Number)
                .unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Context(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<BigDecimal> for Value {
    fn from(n: BigDecimal) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(BigDecimal::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(BigDecimal::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(BigDecimal::from(n as u64))
    }
}

/// Non-finite floats have no decimal form and become null
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Plain data serializes like JSON; handles refuse to serialize.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => Value::number_to_json(n).serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Context(ctx) => {
                let mut map = serializer.serialize_map(Some(ctx.len()))?;
                for (k, v) in ctx {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Handle(h) => Err(S::Error::custom(CoreError::OpaqueHandle(format!(
                "{} '{}'",
                self.type_name(),
                h.name()
            )))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(n)),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Context(ctx) => {
                write!(f, "{{")?;
                for (i, (k, v)) in ctx.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Handle(h) => write!(f, "<{} {}>", self.type_name(), h.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from_json_object_keeps_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"b": 1, "a": [true, null], "c": "x"}"#).unwrap();
        let value = Value::from(json);

        let ctx = value.as_context().unwrap();
        let keys: Vec<&str> = ctx.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(ctx["b"], Value::from(1));
        assert_eq!(ctx["a"], Value::List(vec![Value::Bool(true), Value::Null]));
    }

    #[test]
    fn test_number_to_json_keeps_digits() {
        assert_eq!(Value::number_to_json(&BigDecimal::from(25)), serde_json::json!(25));
        assert_eq!(Value::number_to_json(&super::parse_number("2.50").unwrap()), serde_json::json!(2.5));
        assert_eq!(Value::from(f64::NAN), Value::Null);
    }

    #[test]
    fn test_large_integer_passes_through_unchanged() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"x": 12345678901234567891, "y": 0.1}"#).unwrap();
        let value = Value::from(json);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"x":12345678901234567891,"y":0.1}"#
        );
    }

    #[test]
    fn test_plain_value_serializes() {
        let mut ctx = Context::new();
        ctx.insert("age".to_string(), Value::from(42));
        ctx.insert("name".to_string(), Value::from("Ada"));
        let json = serde_json::to_string(&Value::Context(ctx)).unwrap();
        assert_eq!(json, r#"{"age":42,"name":"Ada"}"#);
    }

    #[test]
    fn test_handle_refuses_serialization() {
        let handle = Handle::new(HandleKind::Function, "Discount", Arc::new(7u32));
        let value = Value::List(vec![Value::from(1), Value::Handle(handle)]);
        let err = serde_json::to_string(&value).unwrap_err();
        assert!(err.to_string().contains("Opaque"));
        assert!(err.to_string().contains("Discount"));
    }

    #[test]
    fn test_handle_downcast_and_equality() {
        let payload = Arc::new(String::from("body"));
        let a = Handle::new(HandleKind::DecisionService, "Svc", Arc::clone(&payload));
        let b = a.clone();
        let c = Handle::new(HandleKind::DecisionService, "Svc", Arc::new(String::from("body")));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast::<String>().unwrap().as_str(), "body");
        assert!(a.downcast::<u32>().is_none());
        assert_eq!(Value::Handle(a).type_name(), "decision service");
    }
}
