//! Plugin traits

use disorg_core::{Expr, Value};
use crate::EvalContext;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Metadata about a function argument
#[derive(Debug, Clone, Serialize)]
pub struct ArgMeta {
    pub name: &'static str,
    pub typ: &'static str,
    pub description: &'static str,
    pub variadic: bool,
}

impl ArgMeta {
    pub const fn required(name: &'static str, typ: &'static str, description: &'static str) -> Self {
        Self { name, typ, description, variadic: false }
    }

    pub const fn variadic(name: &'static str, typ: &'static str, description: &'static str) -> Self {
        Self { name, typ, description, variadic: true }
    }
}

/// Number of arguments a handler accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(k) => write!(f, "{}", k),
            Arity::AtLeast(k) => write!(f, "at least {}", k),
        }
    }
}

/// When a handler's arguments are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalPolicy {
    /// The evaluator reduces every argument before the call
    Eager,
    /// The handler receives the argument subtrees and evaluates them itself
    Lazy,
}

/// Metadata for a function plugin
#[derive(Debug, Clone, Serialize)]
pub struct FunctionMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub args: &'static [ArgMeta],
    pub arity: Arity,
    pub returns: &'static str,
    pub examples: &'static [&'static str],
    pub category: &'static str,
    pub related: &'static [&'static str],
}

/// Function over already-evaluated arguments
pub trait FunctionPlugin: Send + Sync {
    fn meta(&self) -> FunctionMeta;
    fn call(&self, args: &[Value], ctx: &mut EvalContext<'_>) -> Value;
}

/// Function that controls when, and whether, its arguments are evaluated
pub trait LazyPlugin: Send + Sync {
    fn meta(&self) -> FunctionMeta;
    fn call(&self, args: &[&Expr], ctx: &mut EvalContext<'_>) -> Value;
}

/// A registered handler together with its evaluation policy
#[derive(Clone)]
pub enum Callable {
    Eager(Arc<dyn FunctionPlugin>),
    Lazy(Arc<dyn LazyPlugin>),
}

impl Callable {
    pub fn eager<F: FunctionPlugin + 'static>(f: F) -> Self {
        Callable::Eager(Arc::new(f))
    }

    pub fn lazy<L: LazyPlugin + 'static>(l: L) -> Self {
        Callable::Lazy(Arc::new(l))
    }

    pub fn meta(&self) -> FunctionMeta {
        match self {
            Callable::Eager(f) => f.meta(),
            Callable::Lazy(l) => l.meta(),
        }
    }

    pub fn policy(&self) -> EvalPolicy {
        match self {
            Callable::Eager(_) => EvalPolicy::Eager,
            Callable::Lazy(_) => EvalPolicy::Lazy,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.meta().name)
            .field("policy", &self.policy())
            .finish()
    }
}
