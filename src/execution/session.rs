//! The shared target scope scripts execute into.

use std::{any::Any, collections::HashMap};

use rhai::{Dynamic, Scope, AST};

/// Variables and script-defined functions accumulated across runs. Owned by
/// the caller and passed to every `run` by `&mut`.
#[derive(Debug, Default)]
pub struct Session {
    scope: Scope<'static>,
    lib: AST,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scope.is_empty() && !self.has_functions()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scope.contains(name)
    }

    pub fn get<T: Clone + Any>(&self, name: &str) -> Option<T> {
        self.scope.get_value::<T>(name)
    }

    pub fn set<T: Clone + Any>(&mut self, name: &str, value: T) {
        self.scope.set_or_push(name.to_string(), value);
    }

    /// Seed a variable from text: integer, float, bool, else string.
    pub fn set_parsed(&mut self, name: &str, raw: &str) {
        self.scope.set_or_push(name.to_string(), parse_value(raw));
    }

    pub fn names(&self) -> Vec<String> {
        self.scope.iter().map(|(name, _, _)| name.to_string()).collect()
    }

    /// `(name, rendered value)` pairs in definition order.
    pub fn variables(&self) -> Vec<(String, String)> {
        self.scope
            .iter()
            .map(|(name, _, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.lib.iter_functions().any(|f| f.name == name)
    }

    pub fn functions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lib.iter_functions().map(|f| f.name.to_string()).collect();
        names.sort();
        names.dedup();
        names
    }

    fn has_functions(&self) -> bool {
        self.lib.iter_functions().next().is_some()
    }

    pub(crate) fn scope_mut(&mut self) -> &mut Scope<'static> {
        &mut self.scope
    }

    pub(crate) fn lib(&self) -> &AST {
        &self.lib
    }

    /// Keep the functions a script defined; later definitions win.
    pub(crate) fn absorb_functions(&mut self, ast: &AST) {
        self.lib.combine(ast.clone_functions_only());
    }

    /// Collapse shadowed `let` bindings so each name holds its latest value
    /// once. Re-running a script must not grow the scope.
    pub(crate) fn collapse_shadowed(&mut self) {
        let mut order: Vec<String> = Vec::new();
        let mut latest: HashMap<String, (bool, Dynamic)> = HashMap::new();
        for (name, constant, value) in self.scope.iter() {
            if !latest.contains_key(name) {
                order.push(name.to_string());
            }
            latest.insert(name.to_string(), (constant, value));
        }
        if order.len() == self.scope.len() {
            return;
        }

        let mut scope = Scope::new();
        for name in order {
            if let Some((constant, value)) = latest.remove(&name) {
                if constant {
                    scope.push_constant_dynamic(name, value);
                } else {
                    scope.push_dynamic(name, value);
                }
            }
        }
        self.scope = scope;
    }
}

pub fn parse_value(raw: &str) -> Dynamic {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<rhai::INT>() {
        return Dynamic::from(i);
    }
    if let Ok(f) = trimmed.parse::<rhai::FLOAT>() {
        return Dynamic::from(f);
    }
    match trimmed {
        "true" => Dynamic::from(true),
        "false" => Dynamic::from(false),
        _ => Dynamic::from(raw.to_string()),
    }
}
