//! Invocable values
//!
//! Business knowledge models, decision services and FEEL function
//! definitions travel through contexts as [`Value::Handle`]s whose payload
//! is a [`Callable`].

use dmnx_core::ast::Parameter;
use dmnx_core::ir::{Logic, NodeRef};
use dmnx_core::{Context, Handle, HandleKind, Value};
use std::sync::Arc;

/// Engine object behind a function handle
#[derive(Debug)]
pub(crate) enum Callable {
    /// Business knowledge model, resolved against the runtime on call
    Bkm(NodeRef),
    /// Decision service invoked as a function
    Service(NodeRef),
    /// Function definition evaluated inside a context
    Lambda {
        parameters: Vec<Parameter>,
        body: Logic,
        closure: Context,
    },
}

impl Callable {
    /// Wrap into an opaque value
    pub(crate) fn into_value(self, name: impl Into<String>) -> Value {
        let kind = match self {
            Callable::Service(_) => HandleKind::DecisionService,
            Callable::Bkm(_) | Callable::Lambda { .. } => HandleKind::Function,
        };
        Value::Handle(Handle::new(kind, name, Arc::new(self)))
    }
}

/// Arguments of one invocation
#[derive(Debug, Clone)]
pub(crate) enum Args {
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

impl Args {
    /// Bind arguments to parameter names; missing arguments are null
    pub(crate) fn bind(self, parameters: &[String]) -> Context {
        let mut frame = Context::new();
        match self {
            Args::Positional(values) => {
                let mut values = values.into_iter();
                for name in parameters {
                    frame.insert(name.clone(), values.next().unwrap_or_default());
                }
            }
            Args::Named(mut values) => {
                for name in parameters {
                    let value = values
                        .iter()
                        .position(|(n, _)| n == name)
                        .map(|i| values.swap_remove(i).1)
                        .unwrap_or_default();
                    frame.insert(name.clone(), value);
                }
            }
        }
        frame
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Args::Positional(values) => values.len(),
            Args::Named(values) => values.len(),
        }
    }

    /// Argument values in call order
    pub(crate) fn into_values(self) -> Vec<Value> {
        match self {
            Args::Positional(values) => values,
            Args::Named(values) => values.into_iter().map(|(_, v)| v).collect(),
        }
    }
}
