//! Runtime value types

pub mod number;
pub mod value;

pub use value::{Context, Handle, HandleKind, Value};
