use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;

/// One lexical scope frame: a name→value map plus an optional link to the
/// enclosing frame.  Frames are shared by reference; closures keep whole
/// chains alive, and cycles through captured closures are expected.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            })
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.values.contains_key(&name.lexeme) {
            self.values.insert(name.lexeme.clone(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            })
        }
    }

    /// Read `name` from the frame exactly `distance` hops up the chain.
    ///
    /// No fallback search: the resolver guarantees the binding lives there,
    /// so a `None` means the side table and the environment chain disagree.
    pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &str) -> Option<Value> {
        debug!("get_at: distance={}, name={}", distance, name);
        Self::ancestor(env, distance).and_then(|frame| frame.borrow().values.get(name).cloned())
    }

    /// Write `name` in the frame exactly `distance` hops up the chain.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        debug!("assign_at: distance={}, name={}", distance, name.lexeme);
        match Self::ancestor(env, distance) {
            Some(frame) if frame.borrow().values.contains_key(&name.lexeme) => {
                frame.borrow_mut().values.insert(name.lexeme.clone(), value);
                Ok(())
            }
            _ => Err(RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            }),
        }
    }

    fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment>>> {
        let mut frame = Rc::clone(env);

        for _ in 0..distance {
            let enclosing = frame.borrow().enclosing.clone();
            frame = enclosing?;
        }

        Some(frame)
    }
}
