use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use log::debug;

use crate::class::LoxInstance;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::interpreter::{Interpreter, Unwind};
use crate::stmt::FunctionDecl;
use crate::value::Value;

/// A user-defined function: its declaration, the environment captured at the
/// declaration site, and whether it is a class initializer.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Produce a method bound to `instance`: a fresh function whose closure
    /// extends the original with `this`.  Every bind allocates a new closure,
    /// so two binds of the same method are distinct values.
    pub fn bind(&self, instance: Rc<LoxInstance>) -> LoxFunction {
        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        environment.define("this", Value::Instance(instance));

        LoxFunction::new(
            Rc::clone(&self.declaration),
            Rc::new(RefCell::new(environment)),
            self.is_initializer,
        )
    }

    /// Each *call* gets its own frame over the closure; without that,
    /// recursion would share parameter slots.
    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: &[Value],
    ) -> Result<Value, RuntimeError> {
        debug!("Calling <fn {}>", self.name());

        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument.clone());
        }

        let frame = Rc::new(RefCell::new(environment));

        match interpreter.execute_block(&self.declaration.body, frame) {
            Ok(()) => {
                if self.is_initializer {
                    self.bound_this()
                } else {
                    Ok(Value::Nil)
                }
            }

            // An initializer returns its receiver no matter what a bare
            // `return;` inside it produced.
            Err(Unwind::Return(value)) => {
                if self.is_initializer {
                    self.bound_this()
                } else {
                    Ok(value)
                }
            }

            Err(Unwind::Break) => {
                unreachable!("resolver rejects 'break' crossing a function boundary")
            }

            Err(Unwind::Error(e)) => Err(e),
        }
    }

    fn bound_this(&self) -> Result<Value, RuntimeError> {
        Environment::get_at(&self.closure, 0, "this").ok_or_else(|| {
            RuntimeError::UndefinedVariable {
                name: "this".to_string(),
                line: self.declaration.name.line,
            }
        })
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}
