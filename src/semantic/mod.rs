// Semantic model - class registry, conformance lattice, scopes

pub mod builder;
pub mod context;
pub mod scope;
pub mod types;

pub use builder::ContextBuilder;
pub use context::{Context, ContextError};
pub use scope::{Scope, ScopeId, VariableInfo};
pub use types::{Attribute, Method, Ty, Type};
