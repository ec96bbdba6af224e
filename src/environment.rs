use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::{diagnostics::Diagnostic, value::Value};

/// Shared handle to a scope frame. Closures keep their defining frame alive
/// through this handle.
pub type EnvironmentRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    parent: Option<EnvironmentRef>,
    bindings: IndexMap<String, Value>,
}

impl Environment {
    pub fn new() -> EnvironmentRef {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn with_parent(parent: EnvironmentRef) -> EnvironmentRef {
        Rc::new(RefCell::new(Self {
            parent: Some(parent),
            bindings: IndexMap::new(),
        }))
    }

    /// Binds `name` in this frame, replacing any previous binding here.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Overwrites the nearest existing binding of `name`.
    pub fn assign(
        env: &EnvironmentRef,
        name: &str,
        value: Value,
        line: usize,
    ) -> Result<(), Diagnostic> {
        let parent = {
            let mut frame = env.borrow_mut();
            if let Some(slot) = frame.bindings.get_mut(name) {
                *slot = value;
                return Ok(());
            }
            frame.parent.clone()
        };
        match parent {
            Some(parent) => Environment::assign(&parent, name, value, line),
            None => Err(undefined(name, line)),
        }
    }

    /// Looks `name` up in this frame, then outward through the parents.
    pub fn get(env: &EnvironmentRef, name: &str, line: usize) -> Result<Value, Diagnostic> {
        let parent = {
            let frame = env.borrow();
            if let Some(value) = frame.bindings.get(name) {
                return Ok(value.clone());
            }
            frame.parent.clone()
        };
        match parent {
            Some(parent) => Environment::get(&parent, name, line),
            None => Err(undefined(name, line)),
        }
    }
}

fn undefined(name: &str, line: usize) -> Diagnostic {
    Diagnostic::runtime(line, format!("Undefined variable '{name}'."))
}
