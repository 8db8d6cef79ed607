use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use crate::callable::Callable;
use crate::error::RuntimeError;
use crate::function::LoxFunction;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// A class value: name, optional superclass, and its method table.  The
/// methods stay unbound here; binding happens per lookup.
pub struct LoxClass {
    name: String,
    superclass: Option<Rc<LoxClass>>,
    methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        LoxClass {
            name,
            superclass,
            methods,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn method(&self, name: &str) -> Option<&Rc<LoxFunction>> {
        self.methods.get(name).or_else(|| {
            self.superclass
                .as_ref()
                .and_then(|superclass| superclass.method(name))
        })
    }

    /// Look `name` up through the superclass chain and bind the hit to
    /// `instance`.
    pub fn find_method(&self, instance: &Rc<LoxInstance>, name: &str) -> Option<LoxFunction> {
        self.method(name)
            .map(|method| method.bind(Rc::clone(instance)))
    }

    /// Constructor arity follows `init` through the chain; a class without
    /// one takes no arguments.
    pub fn arity(&self) -> usize {
        self.method("init").map_or(0, |init| init.arity())
    }

    /// Calling a class allocates an empty instance, then runs a bound `init`
    /// if the chain has one.  The instance is the call's value either way.
    pub fn construct<W: Write>(
        class: &Rc<LoxClass>,
        interpreter: &mut Interpreter<W>,
        arguments: &[Value],
    ) -> Result<Value, RuntimeError> {
        let instance = Rc::new(LoxInstance::new(Rc::clone(class)));

        if let Some(initializer) = class.find_method(&instance, "init") {
            initializer.call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

/// An object: a reference to its class and a mutable field map.  Fields
/// shadow methods on lookup.
pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: RefCell<HashMap<String, Value>>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        LoxInstance {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    pub fn get(instance: &Rc<LoxInstance>, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = instance.fields.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        match instance.class.find_method(instance, &name.lexeme) {
            Some(method) => Ok(Value::Callable(Callable::Function(Rc::new(method)))),
            None => Err(RuntimeError::UndefinedProperty {
                name: name.lexeme.clone(),
                line: name.line,
            }),
        }
    }

    pub fn set(&self, name: &Token, value: Value) {
        self.fields.borrow_mut().insert(name.lexeme.clone(), value);
    }
}

// Field values can hold the instance itself; Debug must not follow the cycle.
impl fmt::Debug for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class_name())
    }
}
