//! dmnx Runtime - decision evaluation
//!
//! Evaluates [`CompiledModel`](dmnx_core::ir::CompiledModel)s produced by
//! `dmnx-compiler`. Evaluation never aborts on a single failing decision:
//! each decision gets a status and errors are collected as messages.

pub(crate) mod engine;
pub mod error;
pub mod result;
pub mod runtime;
pub(crate) mod typecheck;

// Re-export main types
pub use error::{Result, RuntimeError};
pub use result::{DecisionResult, EvaluationResult, EvaluationStatus};
pub use runtime::{DmnRuntime, RuntimeOptions};
