// ABOUTME: Environment module for managing variable bindings and lexical scopes

use crate::error::{LypsError, LypsResult, RuntimeError};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A chain of frames, each a name-to-value mapping, with an optional parent.
/// One frame in the chain — reached independently of lookup order, via
/// [`Environment::global`] — is the distinguished global frame that `def!!`,
/// `defun!!`, and `defmacro!!` write to and that survives `reboot()`
/// (spec.md section 3.2).
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
    global: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a fresh global environment with no parent.
    pub fn new_global() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
            global: None,
        })
    }

    /// Opens a child scope of `self`. Every function call, `block`, and
    /// macro expansion does this; the frame is simply dropped on return
    /// (success or error) since nothing outlives the `Rc` that holds it.
    pub fn open_scope(self: &Rc<Self>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(self)),
            global: Some(self.global_frame()),
        })
    }

    /// The distinguished global frame reachable from any point in the chain.
    fn global_frame(self: &Rc<Self>) -> Rc<Self> {
        match &self.global {
            Some(g) => Rc::clone(g),
            None => Rc::clone(self),
        }
    }

    /// Local definition: inserts into the innermost frame only.
    pub fn define_local(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Global definition: inserts into the global frame unconditionally,
    /// regardless of how deep the current scope chain is.
    pub fn define_global(self: &Rc<Self>, name: impl Into<String>, value: Value) {
        self.global_frame().define_local(name, value);
    }

    /// Walks the chain from innermost outward; the first hit wins.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// `set!`: rebinds in the innermost frame where `name` is already
    /// defined. If the name exists nowhere in the chain, defines it in the
    /// innermost frame (matching spec.md section 3.2's fallback).
    pub fn set(self: &Rc<Self>, name: &str, value: Value) -> LypsResult<()> {
        if self.set_existing(name, value.clone()) {
            Ok(())
        } else {
            self.define_local(name.to_string(), value);
            Ok(())
        }
    }

    fn set_existing(&self, name: &str, value: Value) -> bool {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return true;
        }
        match &self.parent {
            Some(parent) => parent.set_existing(name, value),
            None => false,
        }
    }

    /// `undef!`: removes the first occurrence of `name` found walking
    /// outward from the innermost frame.
    pub fn undef(&self, name: &str) -> LypsResult<()> {
        if self.bindings.borrow_mut().remove(name).is_some() {
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.undef(name),
            None => Err(LypsError::Runtime(RuntimeError::new(format!(
                "undef!: no binding named '{}'",
                name
            )))),
        }
    }

    /// The sorted names bound directly in this frame (not the whole chain) —
    /// backs the `symtab!` diagnostic primitive.
    pub fn local_symbols(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let env = Environment::new_global();
        env.define_local("x", Value::int(42));
        assert_eq!(env.get("x"), Some(Value::int(42)));
    }

    #[test]
    fn test_undefined_symbol() {
        let env = Environment::new_global();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn test_shadowing() {
        let parent = Environment::new_global();
        parent.define_local("x", Value::int(42));

        let child = parent.open_scope();
        child.define_local("x", Value::int(100));

        assert_eq!(child.get("x"), Some(Value::int(100)));
        assert_eq!(parent.get("x"), Some(Value::int(42)));
    }

    #[test]
    fn test_parent_lookup() {
        let parent = Environment::new_global();
        parent.define_local("x", Value::int(42));
        let child = parent.open_scope();
        assert_eq!(child.get("x"), Some(Value::int(42)));
    }

    #[test]
    fn test_define_global_from_nested_scope() {
        let global = Environment::new_global();
        let child = global.open_scope();
        let grandchild = child.open_scope();

        grandchild.define_global("g", Value::int(7));

        assert_eq!(global.get("g"), Some(Value::int(7)));
        assert_eq!(grandchild.get("g"), Some(Value::int(7)));
    }

    #[test]
    fn test_set_rebinds_existing_outer_binding() {
        let global = Environment::new_global();
        global.define_local("x", Value::int(1));
        let child = global.open_scope();

        child.set("x", Value::int(2)).unwrap();

        assert_eq!(global.get("x"), Some(Value::int(2)));
        assert!(child.bindings.borrow().is_empty());
    }

    #[test]
    fn test_set_defines_locally_when_absent_everywhere() {
        let global = Environment::new_global();
        let child = global.open_scope();

        child.set("y", Value::int(9)).unwrap();

        assert_eq!(child.get("y"), Some(Value::int(9)));
        assert!(global.get("y").is_none());
    }

    #[test]
    fn test_undef_removes_first_occurrence() {
        let global = Environment::new_global();
        global.define_local("x", Value::int(1));
        let child = global.open_scope();
        child.define_local("x", Value::int(2));

        child.undef("x").unwrap();

        assert_eq!(child.get("x"), Some(Value::int(1)));
    }

    #[test]
    fn test_undef_missing_is_error() {
        let env = Environment::new_global();
        assert!(env.undef("nope").is_err());
    }

    #[test]
    fn test_scope_discarded_on_drop() {
        let global = Environment::new_global();
        {
            let child = global.open_scope();
            child.define_local("temp", Value::int(1));
            assert_eq!(child.get("temp"), Some(Value::int(1)));
        }
        assert!(global.get("temp").is_none());
    }

    #[test]
    fn test_local_symbols_sorted_and_scope_local_only() {
        let global = Environment::new_global();
        global.define_local("z", Value::int(1));
        let child = global.open_scope();
        child.define_local("b", Value::int(2));
        child.define_local("a", Value::int(3));

        assert_eq!(child.local_symbols(), vec!["a".to_string(), "b".to_string()]);
    }
}
