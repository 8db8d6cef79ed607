use std::rc::Rc;

use crate::callable::Callable;
use crate::class::LoxInstance;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Callable(Callable),
    Instance(Rc<LoxInstance>),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            // Integer-valued doubles print without the trailing ".0".
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::Str(s) => write!(f, "{}", s),

            Value::Callable(callable) => write!(f, "{}", callable),

            Value::Instance(instance) => write!(f, "{} instance", instance.class_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_print_without_trailing_zero() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-7.0).to_string(), "-7");
        assert_eq!(Value::Number(3.5).to_string(), "3.5");
        assert_eq!(Value::Number(0.0).to_string(), "0");
    }

    #[test]
    fn primitives_print_their_lexical_form() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Str("hi".to_string()).to_string(), "hi");
    }
}
