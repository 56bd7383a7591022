//! dmnx Parser - DMN XML and FEEL parsers
//!
//! This crate converts DMN model documents into the definitions AST and
//! FEEL text into expression trees.

pub mod dmn_parser;
pub mod error;
pub mod expression_parser;

// Re-export main parser types
pub use dmn_parser::DmnParser;
pub use error::{ParseError, Result};
pub use expression_parser::ExpressionParser;
