//! dmnx Core - Core types and definitions for the dmnx DMN executor
//!
//! This crate provides the fundamental types used across the dmnx crates:
//! - Value types for runtime data, including opaque engine handles
//! - DMN definitions AST (as parsed from model documents)
//! - FEEL expression AST
//! - Compiled model IR consumed by the runtime
//! - Diagnostics and error types

pub mod ast;
pub mod builtins;
pub mod error;
pub mod ir;
pub mod message;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use message::{Message, MessageType, Severity};
pub use types::{Context, Handle, HandleKind, Value};
pub use bigdecimal::BigDecimal;
