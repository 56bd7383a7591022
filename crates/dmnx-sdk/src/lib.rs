//! dmnx SDK - the DMN executor pipeline
//!
//! Resolves which model files to load, compiles them through an
//! [`EngineAdapter`], selects the target model, dispatches evaluation and
//! renders one JSON document per invocation. Engine-internal handles in
//! results are elided by the [`sanitizer`] before anything is serialized.

pub mod adapter;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod introspect;
pub mod output;
pub mod resolver;
pub mod sanitizer;
pub mod selector;

// Re-export main types
pub use adapter::{DmnEngine, EngineAdapter, ModelCollection};
pub use crate::config::{ExecutorConfig, RunOptions};
pub use dispatcher::{dispatch, Target};
pub use error::{Result, SdkError};
pub use executor::{parse_input, Executor};
pub use introspect::{describe, local_reference};
pub use output::{Outcome, EXIT_FAILURE, EXIT_SUCCESS};
pub use resolver::{ResourceResolver, ResourceSet};
pub use sanitizer::{sanitize, Sanitized};
pub use selector::select_model;

// Re-export commonly used types from dependencies
pub use dmnx_core::{Context, Value};
pub use dmnx_runtime::{EvaluationResult, EvaluationStatus};
