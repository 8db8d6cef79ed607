use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::class::LoxClass;
use crate::error::RuntimeError;
use crate::function::LoxFunction;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// The three callable shapes of the language behind one dispatch point:
/// a built-in native, a user function, and a class used as a constructor.
#[derive(Clone)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
}

pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&[Value]) -> Result<Value, RuntimeError>,
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::Function(function) => function.arity(),
            Callable::Class(class) => class.arity(),
        }
    }

    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: &[Value],
    ) -> Result<Value, RuntimeError> {
        match self {
            Callable::Native(native) => (native.func)(arguments),
            Callable::Function(function) => function.call(interpreter, arguments),
            Callable::Class(class) => LoxClass::construct(class, interpreter, arguments),
        }
    }

    /// Identity comparison, used by `==` on callable values.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Class(a), Callable::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(native) => write!(f, "<native fn {}>", native.name),
            Callable::Function(function) => write!(f, "<fn {}>", function.name()),
            Callable::Class(class) => write!(f, "{}", class.name()),
        }
    }
}

// Closures reference environments which reference closures back; Debug must
// not follow that cycle.
impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// The sole built-in: current Unix time in seconds.
pub fn clock() -> NativeFunction {
    NativeFunction {
        name: "clock",
        arity: 0,
        func: clock_native,
    }
}

fn clock_native(_args: &[Value]) -> Result<Value, RuntimeError> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| RuntimeError::Io(io::Error::new(io::ErrorKind::Other, e)))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}
