use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use log::{debug, info};

use crate::callable::{self, Callable};
use crate::class::{LoxClass, LoxInstance};
use crate::environment::Environment;
use crate::error::{LoxError, RuntimeError};
use crate::expr::{Expr, ExprId};
use crate::function::LoxFunction;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Non-local exits from evaluation.
///
/// `return` and `break` are not errors; they unwind to the nearest function
/// call or loop, which catches its own variant and resumes normally.  Real
/// runtime failures ride the `Error` variant out to `interpret`.
#[derive(Debug)]
pub enum Unwind {
    Error(RuntimeError),
    Return(Value),
    Break,
}

impl From<RuntimeError> for Unwind {
    fn from(e: RuntimeError) -> Self {
        Unwind::Error(e)
    }
}

/// The evaluator: walks resolved statements, dispatching through the
/// environment chain and the side table of binding distances recorded by the
/// resolver.
pub struct Interpreter<W: Write> {
    out: W,
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::Callable(Callable::Native(Rc::new(callable::clock()))),
        );

        Interpreter {
            out,
            globals: Rc::clone(&globals),
            environment: globals,
            locals: HashMap::new(),
        }
    }

    /// Record that `id` refers to a binding `depth` frames up.  Called by the
    /// resolver before `interpret`; expressions with no entry are globals.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        debug!("Recording binding: id={:?}, depth={}", id, depth);
        self.locals.insert(id, depth);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), LoxError> {
        info!("Interpreting {} statement(s)", statements.len());

        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}
                Err(Unwind::Error(e)) => return Err(e.into()),
                Err(Unwind::Return(_)) | Err(Unwind::Break) => {
                    unreachable!("resolver rejects 'return' and 'break' at top level")
                }
            }
        }

        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(())
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;

                writeln!(self.out, "{}", value).map_err(RuntimeError::from)?;

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value = if let Some(expr) = initializer {
                    self.evaluate(expr)?
                } else {
                    Value::Nil
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                let environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &self.environment,
                ))));

                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }

                Ok(())
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    match self.execute(body) {
                        // `break` stops this loop and nothing beyond it.
                        Err(Unwind::Break) => break,
                        result => result?,
                    }
                }

                Ok(())
            }

            Stmt::Break { .. } => Err(Unwind::Break),

            Stmt::Function(declaration) => {
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                self.environment.borrow_mut().define(
                    &declaration.name.lexeme,
                    Value::Callable(Callable::Function(Rc::new(function))),
                );

                Ok(())
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Err(Unwind::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Run `statements` with `environment` as the current frame, restoring
    /// the previous frame on every exit path, including `Return`, `Break`,
    /// and runtime errors.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<(), Unwind> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(());

        for statement in statements {
            result = self.execute(statement);

            if result.is_err() {
                break;
            }
        }

        self.environment = previous;

        result
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<(), Unwind> {
        let superclass: Option<Rc<LoxClass>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Callable(Callable::Class(class)) => Some(class),
                _ => {
                    return Err(RuntimeError::SuperclassNotClass { line: name.line }.into());
                }
            },
            None => None,
        };

        // The name is visible (as nil) while the methods are built, so the
        // body can refer to the class being declared.
        self.environment.borrow_mut().define(&name.lexeme, Value::Nil);

        // Methods of a subclass close over an extra frame holding `super`.
        let method_env = match &superclass {
            Some(class) => {
                let environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &self.environment,
                ))));

                environment
                    .borrow_mut()
                    .define("super", Value::Callable(Callable::Class(Rc::clone(class))));

                environment
            }
            None => Rc::clone(&self.environment),
        };

        let mut table: HashMap<String, Rc<LoxFunction>> = HashMap::new();

        for declaration in methods {
            let is_initializer = declaration.name.lexeme == "init";

            let method = LoxFunction::new(
                Rc::clone(declaration),
                Rc::clone(&method_env),
                is_initializer,
            );

            table.insert(declaration.name.lexeme.clone(), Rc::new(method));
        }

        let class = Rc::new(LoxClass::new(name.lexeme.clone(), superclass, table));

        self.environment
            .borrow_mut()
            .assign(name, Value::Callable(Callable::Class(class)))?;

        Ok(())
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, Unwind> {
        match expr {
            Expr::Literal(token) => self.evaluate_literal(token),

            Expr::Logical(left, op, right) => {
                let left_value = self.evaluate(left)?;

                // Short-circuit: the other side is never evaluated.
                match op.token_type {
                    TokenType::OR if is_truthy(&left_value) => Ok(left_value),
                    TokenType::AND if !is_truthy(&left_value) => Ok(left_value),
                    _ => self.evaluate(right),
                }
            }

            Expr::Grouping(expr) => self.evaluate(expr),

            Expr::Unary(op, expr) => self.evaluate_unary(op, expr),

            Expr::Binary(left, op, right) => self.evaluate_binary(left, op, right),

            Expr::Variable(id, name) | Expr::This(id, name) => {
                Ok(self.look_up_variable(*id, name)?)
            }

            Expr::Assign(id, name, expr) => {
                let value = self.evaluate(expr)?;

                if let Some(distance) = self.locals.get(id) {
                    Environment::assign_at(&self.environment, *distance, name, value.clone())?;
                } else {
                    self.globals.borrow_mut().assign(name, value.clone())?;
                }

                Ok(value)
            }

            Expr::Call(callee, paren, arguments) => {
                let callee_value = self.evaluate(callee)?;

                let mut argument_values = Vec::with_capacity(arguments.len());

                for argument in arguments {
                    argument_values.push(self.evaluate(argument)?);
                }

                match callee_value {
                    Value::Callable(callable) => {
                        if argument_values.len() != callable.arity() {
                            return Err(RuntimeError::ArityMismatch {
                                expected: callable.arity(),
                                got: argument_values.len(),
                                line: paren.line,
                            }
                            .into());
                        }

                        Ok(callable.call(self, &argument_values)?)
                    }

                    _ => Err(RuntimeError::NotCallable { line: paren.line }.into()),
                }
            }

            Expr::Get(object, name) => match self.evaluate(object)? {
                Value::Instance(instance) => Ok(LoxInstance::get(&instance, name)?),
                _ => Err(RuntimeError::FieldAccessOnNonInstance {
                    message: "Only instances have properties.".to_string(),
                    line: name.line,
                }
                .into()),
            },

            Expr::Set(object, name, value) => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value = self.evaluate(value)?;

                    instance.set(name, value.clone());

                    Ok(value)
                }
                _ => Err(RuntimeError::FieldAccessOnNonInstance {
                    message: "Only instances have fields.".to_string(),
                    line: name.line,
                }
                .into()),
            },

            Expr::Super(id, keyword, method) => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_literal(&self, token: &Token) -> Result<Value, Unwind> {
        match &token.token_type {
            TokenType::NUMBER(n) => Ok(Value::Number(*n)),

            TokenType::STRING(s) => Ok(Value::Str(s.clone())),

            TokenType::TRUE => Ok(Value::Bool(true)),

            TokenType::FALSE => Ok(Value::Bool(false)),

            TokenType::NIL => Ok(Value::Nil),

            _ => Err(RuntimeError::TypeMismatch {
                message: "Invalid literal.".to_string(),
                line: token.line,
            }
            .into()),
        }
    }

    fn evaluate_unary(&mut self, op: &Token, expr: &Expr) -> Result<Value, Unwind> {
        let value: Value = self.evaluate(expr)?;

        match op.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(RuntimeError::TypeMismatch {
                    message: "Operand must be a number.".to_string(),
                    line: op.line,
                }
                .into()),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&value))),

            _ => Err(RuntimeError::TypeMismatch {
                message: "Invalid unary operator.".to_string(),
                line: op.line,
            }
            .into()),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Value, Unwind> {
        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;

        match op.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),

                // A number on the right is rendered by the print rule, so
                // "n=" + 3 is "n=3", not "n=3.0".
                (Value::Str(a), Value::Number(b)) => {
                    Ok(Value::Str(a + &Value::Number(b).to_string()))
                }

                _ => Err(self.type_mismatch("Operands must be two numbers or two strings.", op)),
            },

            TokenType::MINUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),

                _ => Err(self.type_mismatch("Operands must be numbers.", op)),
            },

            TokenType::STAR => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),

                _ => Err(self.type_mismatch("Operands must be numbers.", op)),
            },

            TokenType::SLASH => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => {
                    if b == 0.0 {
                        Err(RuntimeError::DivisionByZero { line: op.line }.into())
                    } else {
                        Ok(Value::Number(a / b))
                    }
                }

                _ => Err(self.type_mismatch("Operands must be numbers.", op)),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(is_equal(&left_val, &right_val))),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!is_equal(&left_val, &right_val))),

            TokenType::LESS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),

                _ => Err(self.type_mismatch("Operands must be numbers.", op)),
            },

            TokenType::LESS_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),

                _ => Err(self.type_mismatch("Operands must be numbers.", op)),
            },

            TokenType::GREATER => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),

                _ => Err(self.type_mismatch("Operands must be numbers.", op)),
            },

            TokenType::GREATER_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),

                _ => Err(self.type_mismatch("Operands must be numbers.", op)),
            },

            _ => Err(self.type_mismatch("Invalid binary operator.", op)),
        }
    }

    fn evaluate_super(
        &mut self,
        id: ExprId,
        keyword: &Token,
        method: &Token,
    ) -> Result<Value, Unwind> {
        let distance: usize = *self.locals.get(&id).ok_or_else(|| {
            Unwind::from(RuntimeError::UndefinedVariable {
                name: keyword.lexeme.clone(),
                line: keyword.line,
            })
        })?;

        let superclass = Environment::get_at(&self.environment, distance, "super");

        // `this` always sits one frame nearer than `super`.
        let object = Environment::get_at(&self.environment, distance - 1, "this");

        match (superclass, object) {
            (
                Some(Value::Callable(Callable::Class(superclass))),
                Some(Value::Instance(instance)),
            ) => superclass
                .find_method(&instance, &method.lexeme)
                .map(|bound| Value::Callable(Callable::Function(Rc::new(bound))))
                .ok_or_else(|| {
                    Unwind::from(RuntimeError::UndefinedProperty {
                        name: method.lexeme.clone(),
                        line: method.line,
                    })
                }),

            _ => unreachable!("resolver binds 'super' and 'this' in method scopes only"),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(distance) = self.locals.get(&id) {
            Environment::get_at(&self.environment, *distance, &name.lexeme).ok_or_else(|| {
                RuntimeError::UndefinedVariable {
                    name: name.lexeme.clone(),
                    line: name.line,
                }
            })
        } else {
            self.globals.borrow().get(name)
        }
    }

    fn type_mismatch(&self, message: &str, op: &Token) -> Unwind {
        RuntimeError::TypeMismatch {
            message: message.to_string(),
            line: op.line,
        }
        .into()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,

        Value::Bool(b) => *b,

        _ => true,
    }
}

fn is_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Nil, Value::Nil) => true,

        (Value::Number(a), Value::Number(b)) => a == b,

        (Value::Str(a), Value::Str(b)) => a == b,

        (Value::Bool(a), Value::Bool(b)) => a == b,

        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),

        (Value::Callable(a), Value::Callable(b)) => a.ptr_eq(b),

        _ => false,
    }
}
