//! Evaluation Context
//!
//! The evaluator itself: reduces an expression tree to a `Value`, resolving
//! operators and functions by name through the Scope Stack.

use crate::{Binding, Callable, PluginRegistry, Scope, Scopes};
use disorg_core::{Coord, DisorgError, Expr, Literal, Value, DEFAULT_PRECISION};
use std::slice;

/// Handler name used for bare identifiers
pub const IDENT: &str = "ident";
/// Handler name used for cell references
pub const CELL: &str = "cell";

/// Source of cell values for `cell` lookups.
///
/// Implemented by a recalculation pass; evaluating a coordinate may
/// recursively evaluate other formula cells.
pub trait CellSource {
    fn value_at(&mut self, coord: Coord) -> Value;
}

/// Evaluation context passed to plugins
pub struct EvalContext<'a> {
    pub registry: &'a PluginRegistry,
    pub scopes: Scopes,
    pub precision: u32,
    cells: Option<&'a mut dyn CellSource>,
}

impl<'a> EvalContext<'a> {
    pub fn new(registry: &'a PluginRegistry) -> Self {
        Self {
            registry,
            scopes: Scopes::new(),
            precision: DEFAULT_PRECISION,
            cells: None,
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scopes.push(scope);
        self
    }

    pub fn with_cells(mut self, cells: &'a mut dyn CellSource) -> Self {
        self.cells = Some(cells);
        self
    }

    /// Coordinate relative references resolve against
    pub fn origin(&self) -> Option<Coord> {
        self.scopes.origin()
    }

    /// Value of a cell in the bound table
    pub fn cell_value(&mut self, coord: Coord) -> Value {
        match self.cells.as_deref_mut() {
            Some(cells) => cells.value_at(coord),
            None => Value::Error(DisorgError::ref_error("no table is bound")),
        }
    }

    /// Resolve a name: dynamic frames innermost first, then the builtin frame
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        self.scopes
            .lookup(name)
            .cloned()
            .or_else(|| self.registry.binding(name))
    }

    pub fn eval(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Literal(Literal::Number(n)) => Value::Number(n.clone()),
            Expr::Literal(Literal::Text(s)) => Value::Text(s.clone()),
            Expr::EmptyCell => Value::Empty,
            Expr::ParseError(text) => Value::Error(DisorgError::parse_error(text.clone())),
            Expr::BinaryOp(op, lhs, rhs) => self.call(op.symbol(), &[lhs.as_ref(), rhs.as_ref()]),
            Expr::FunctionCall(name, args) => {
                let args: Vec<&Expr> = args.iter().collect();
                self.call(name, &args)
            }
            Expr::Identifier(_) => self.call(IDENT, slice::from_ref(&expr)),
            Expr::CellRef(..) => self.call(CELL, slice::from_ref(&expr)),
        }
    }

    /// Evaluate every node, preserving order
    pub fn eval_list(&mut self, exprs: &[&Expr]) -> Vec<Value> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    /// Invoke the handler bound to `name` with unevaluated arguments.
    ///
    /// Eager handlers get their arguments reduced here; lazy handlers get the
    /// subtrees as-is.
    pub fn call(&mut self, name: &str, args: &[&Expr]) -> Value {
        let callable = match self.lookup(name) {
            Some(Binding::Function(f)) => f,
            Some(Binding::Value(v)) => {
                return Value::Error(DisorgError::eval_error(format!(
                    "'{}' is a {}, not a function",
                    name,
                    v.type_name()
                )))
            }
            None if name == CELL => {
                return Value::Error(DisorgError::ref_error("cell references need a table"))
            }
            None => return Value::Error(self.registry.unknown_function(name)),
        };

        let meta = callable.meta();
        if !meta.arity.accepts(args.len()) {
            return Value::Error(DisorgError::arg_count(
                meta.name,
                &meta.arity.to_string(),
                args.len(),
            ));
        }

        tracing::trace!(function = name, policy = ?callable.policy(), argc = args.len(), "call");
        match callable {
            Callable::Eager(f) => {
                let values = self.eval_list(args);
                f.call(&values, self)
            }
            Callable::Lazy(l) => l.call(args, self),
        }
    }
}
