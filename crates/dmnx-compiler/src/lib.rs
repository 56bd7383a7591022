//! dmnx Compiler - DMN definitions to executable models
//!
//! This crate compiles parsed DMN [`Definitions`](dmnx_core::ast::Definitions)
//! into [`CompiledModel`](dmnx_core::ir::CompiledModel)s: imports and
//! requirement hrefs are resolved, FEEL text is parsed, and semantic
//! problems are recorded as model messages.

pub mod codegen;
pub mod compiler;
pub mod error;
pub mod import_resolver;
pub mod semantic;

// Re-export main types
pub use codegen::LogicCompiler;
pub use compiler::{Compiler, CompilerOptions};
pub use error::{CompileError, Result};
pub use import_resolver::ImportResolver;
pub use semantic::SemanticAnalyzer;
