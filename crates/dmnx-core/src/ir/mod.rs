//! Intermediate Representation (IR) of compiled DMN models
//!
//! The compiler turns [`Definitions`](crate::ast::Definitions) into
//! [`CompiledModel`]s: requirement hrefs resolved to [`NodeRef`]s and FEEL
//! text parsed into [`Expression`](crate::ast::Expression) trees. The runtime
//! evaluates this IR only.

pub mod logic;
pub mod model;

pub use logic::{CompiledDecisionTable, CompiledOutput, CompiledRule, FunctionLogic, Logic};
pub use model::{
    BkmNode, CompiledModel, DecisionNode, Dependency, InputNode, NodeKind, NodeRef,
    ResolvedImport, ServiceNode,
};
