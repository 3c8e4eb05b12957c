//! Plugin Registry
//!
//! The registry is the outermost, immutable scope frame. It is built once and
//! shared (behind an `Arc`) by every recalculation pass.

use crate::{Binding, Callable, FunctionMeta, FunctionPlugin, LazyPlugin};
use disorg_core::{DisorgError, Value};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Definition of a built-in constant
#[derive(Debug, Clone, Serialize)]
pub struct ConstantDef {
    pub name: String,
    pub value: Value,
    pub description: String,
    pub category: String,
}

/// Central plugin registry
#[derive(Debug, Default)]
pub struct PluginRegistry {
    functions: HashMap<String, Callable>,
    constants: HashMap<String, ConstantDef>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function whose arguments are evaluated before the call
    pub fn with_function<F: FunctionPlugin + 'static>(self, f: F) -> Self {
        self.with_callable(Callable::eager(f))
    }

    /// Register a function that receives unevaluated argument subtrees
    pub fn with_lazy<L: LazyPlugin + 'static>(self, l: L) -> Self {
        self.with_callable(Callable::lazy(l))
    }

    pub fn with_callable(mut self, f: Callable) -> Self {
        let name = f.meta().name.to_lowercase();
        self.functions.insert(name, f);
        self
    }

    pub fn with_constant(mut self, def: ConstantDef) -> Self {
        let name = def.name.to_lowercase();
        self.constants.insert(name, def);
        self
    }

    pub fn get_function(&self, name: &str) -> Option<&Callable> {
        self.functions.get(&name.to_lowercase())
    }

    pub fn get_constant(&self, name: &str) -> Option<&ConstantDef> {
        self.constants.get(&name.to_lowercase())
    }

    /// Resolve a name in the builtin frame
    pub fn binding(&self, name: &str) -> Option<Binding> {
        if let Some(f) = self.get_function(name) {
            return Some(Binding::Function(f.clone()));
        }
        self.get_constant(name).map(|c| Binding::Value(c.value.clone()))
    }

    /// `UNDEFINED_FUNC` error, with close matches as the suggestion
    pub fn unknown_function(&self, name: &str) -> DisorgError {
        let similar = self.find_similar_functions(name);
        let err = DisorgError::undefined_func(name);
        if similar.is_empty() {
            return err;
        }
        let suggestions: Vec<&str> = similar.iter().take(5).map(|s| s.as_str()).collect();
        err.with_suggestion(format!("Similar: {}", suggestions.join(", ")))
    }

    /// Function names similar to the given name, best first
    fn find_similar_functions(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self
            .functions
            .keys()
            .filter(|func_name| func_name.chars().any(char::is_alphabetic))
            .filter_map(|func_name| {
                let score = Self::similarity_score(&name_lower, func_name);
                (score > 0).then(|| (func_name.clone(), score))
            })
            .collect();

        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();
        if common == 0 {
            return score;
        }
        score += common * 2;

        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 {
            score += 5 - len_diff;
        }

        score
    }

    /// Help for one name, or an overview when `name` is `None`
    pub fn help(&self, name: Option<&str>) -> Result<serde_json::Value, DisorgError> {
        match name {
            Some(n) => self.help_for(n),
            None => Ok(self.general_help()),
        }
    }

    fn help_for(&self, name: &str) -> Result<serde_json::Value, DisorgError> {
        if let Some(f) = self.get_function(name) {
            let meta = f.meta();
            return Ok(json!({
                "type": "function",
                "policy": f.policy(),
                "name": meta.name,
                "description": meta.description,
                "usage": meta.usage,
                "arity": meta.arity,
                "args": meta.args,
                "returns": meta.returns,
                "examples": meta.examples,
                "category": meta.category,
                "related": meta.related,
            }));
        }
        if let Some(c) = self.get_constant(name) {
            return Ok(json!({
                "type": "constant",
                "name": c.name,
                "value": c.value.to_string(),
                "description": c.description,
                "category": c.category,
            }));
        }
        Err(self.unknown_function(name))
    }

    fn general_help(&self) -> serde_json::Value {
        let mut by_category: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for f in self.functions.values() {
            let meta = f.meta();
            by_category.entry(meta.category).or_default().push(meta.name);
        }
        for names in by_category.values_mut() {
            names.sort_unstable();
        }

        let mut constants: Vec<&str> = self.constants.values().map(|c| c.name.as_str()).collect();
        constants.sort_unstable();

        json!({
            "functions": by_category,
            "constants": constants,
            "usage": "Call help with a function name for details.",
        })
    }

    /// Metadata of every function, sorted by name
    pub fn list_functions(&self, category: Option<&str>) -> Vec<FunctionMeta> {
        let mut funcs: Vec<FunctionMeta> = self
            .functions
            .values()
            .map(Callable::meta)
            .filter(|meta| category.map_or(true, |c| meta.category == c))
            .collect();
        funcs.sort_by(|a, b| a.name.cmp(b.name));
        funcs
    }
}
