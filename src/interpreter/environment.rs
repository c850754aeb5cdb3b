// File: src/interpreter/environment.rs
//
// Lexically nested scopes for the CopyClean interpreter. A scope owns a
// name-to-value map and an optional handle to its parent; children keep
// their parent alive through the shared handle.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::value::Value;

pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    variables: HashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Environment {
    /// Create a root scope with no parent.
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// Create a child scope of `parent`.
    pub fn with_parent(parent: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment { variables: HashMap::new(), parent: Some(parent) }))
    }

    /// Look up a name, walking outward through parent scopes.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.variables.get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().get(name))
    }

    /// Bind a name in this scope, shadowing any outer binding.
    pub fn declare(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    /// Update the innermost scope that already binds `name`; if none does,
    /// bind in this scope.
    pub fn assign(&mut self, name: &str, value: Value) {
        if self.variables.contains_key(name) {
            self.variables.insert(name.to_string(), value);
            return;
        }
        if let Some(parent) = &self.parent {
            if parent.borrow().get(name).is_some() {
                parent.borrow_mut().assign(name, value);
                return;
            }
        }
        self.variables.insert(name.to_string(), value);
    }
}
