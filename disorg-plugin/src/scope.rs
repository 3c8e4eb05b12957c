//! Scope Stack
//!
//! Frames are searched innermost first. The builtin frame (the registry) sits
//! below every frame on the stack and is never written to.

use crate::Callable;
use disorg_core::{Coord, Value};
use std::collections::HashMap;

/// What a name is bound to
#[derive(Debug, Clone)]
pub enum Binding {
    Value(Value),
    Function(Callable),
}

/// One frame of name bindings, optionally carrying the evaluation origin
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<String, Binding>,
    origin: Option<Coord>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame whose relative references resolve against `origin`
    pub fn at(origin: Coord) -> Self {
        Self { bindings: HashMap::new(), origin: Some(origin) }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, Binding::Value(value));
        self
    }

    pub fn with_function(mut self, name: impl Into<String>, f: Callable) -> Self {
        self.set(name, Binding::Function(f));
        self
    }

    pub fn set(&mut self, name: impl Into<String>, binding: Binding) {
        self.bindings.insert(name.into(), binding);
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn origin(&self) -> Option<Coord> {
        self.origin
    }
}

/// Dynamic frames pushed on top of the builtin frame
#[derive(Debug, Clone, Default)]
pub struct Scopes {
    frames: Vec<Scope>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope: Scope) {
        self.frames.push(scope);
    }

    pub fn pop(&mut self) -> Option<Scope> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// First binding for `name`, innermost frame first
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Bind in the innermost frame only, pushing one if the stack is empty
    pub fn set(&mut self, name: impl Into<String>, binding: Binding) {
        if self.frames.is_empty() {
            self.frames.push(Scope::new());
        }
        if let Some(top) = self.frames.last_mut() {
            top.set(name, binding);
        }
    }

    /// Innermost evaluation origin
    pub fn origin(&self) -> Option<Coord> {
        self.frames.iter().rev().find_map(Scope::origin)
    }
}
