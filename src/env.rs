// ABOUTME: Lexical environments: chained frames mapping names to values

use crate::error::RuntimeError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One frame of the scope chain. Frames are reference-counted because a
/// closure may keep its defining chain alive after the block exits.
#[derive(Debug, Default)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a root environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment::default())
    }

    /// Creates a child frame of `parent`.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Installs a binding in THIS frame, shadowing any outer binding.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Reads the nearest enclosing binding of `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    /// Mutates the nearest enclosing binding of `name`; never declares.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(RuntimeError::name_error(name, None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let env = Environment::new();
        env.define("x", Value::Int(42));
        assert_eq!(env.get("x"), Some(Value::Int(42)));
    }

    #[test]
    fn test_undefined_name() {
        let env = Environment::new();
        assert_eq!(env.get("missing"), None);
    }

    #[test]
    fn test_shadowing_reads_nearest_frame() {
        let parent = Environment::new();
        parent.define("x", Value::Int(1));
        let child = Environment::with_parent(parent.clone());
        child.define("x", Value::Int(2));

        assert_eq!(child.get("x"), Some(Value::Int(2)));
        assert_eq!(parent.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_lookup_walks_the_chain() {
        let grandparent = Environment::new();
        grandparent.define("a", Value::Int(1));
        let parent = Environment::with_parent(grandparent);
        parent.define("b", Value::Int(2));
        let child = Environment::with_parent(parent);

        assert_eq!(child.get("a"), Some(Value::Int(1)));
        assert_eq!(child.get("b"), Some(Value::Int(2)));
    }

    #[test]
    fn test_assign_mutates_nearest_binding_frame() {
        let parent = Environment::new();
        parent.define("x", Value::Int(1));
        let child = Environment::with_parent(parent.clone());

        child.assign("x", Value::Int(9)).expect("assign failed");
        assert_eq!(parent.get("x"), Some(Value::Int(9)));
    }

    #[test]
    fn test_assign_never_declares() {
        let env = Environment::new();
        let err = env.assign("ghost", Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "Undefined variable 'ghost'");
    }
}
