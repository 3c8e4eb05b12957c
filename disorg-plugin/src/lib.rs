//! Disorg Plugin System
//!
//! Provides:
//! - Handler traits with declared arity and an eager or lazy evaluation policy
//! - The registry, which is the immutable builtin scope frame
//! - The Scope Stack for per-evaluation bindings
//! - `EvalContext`, the expression evaluator

mod traits;
mod registry;
mod scope;
mod context;

pub use traits::{
    ArgMeta, Arity, Callable, EvalPolicy,
    FunctionMeta, FunctionPlugin, LazyPlugin,
};
pub use registry::{ConstantDef, PluginRegistry};
pub use scope::{Binding, Scope, Scopes};
pub use context::{CellSource, EvalContext, CELL, IDENT};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        ArgMeta, Arity, Callable, CellSource, EvalContext, EvalPolicy,
        FunctionMeta, FunctionPlugin, LazyPlugin, PluginRegistry, Scope,
    };
    pub use disorg_core::prelude::*;
}
