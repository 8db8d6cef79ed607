//! Static resolution pass for the Lox interpreter.
//!
//! This module performs a single AST walk to:
//! 1. **Build lexical scopes**: maintains a stack of `HashMap<String, bool>`
//!    tracking declared (false) and fully defined (true) names in each nested
//!    block or function.
//! 2. **Enforce static rules**: reports errors such as redeclaration in the
//!    same scope, reading a variable in its own initializer, invalid `return`
//!    outside functions, `break` outside loops, and illegal use of `this` or
//!    `super` outside of class methods.
//! 3. **Record binding distances**: for every variable occurrence
//!    (`Variable`, `Assign`, `This`, `Super`), calls back into the
//!    interpreter to note whether it is a local (and at what depth) or a
//!    global.  This enables the runtime to climb exactly the right number of
//!    environment frames instead of searching the chain.
//!
//! Resolution halts on the first static error, returning a
//! `LoxError::Resolve`; there is no in-place recovery.

use std::collections::HashMap;
use std::io::Write;

use log::{debug, info};

use crate::error::{LoxError, Result};
use crate::expr::{Expr, ExprId};
use crate::interpreter::Interpreter;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::Token;

/// Are we inside a user function?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Initializer,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ClassType {
    /// Not inside any class
    None,

    /// Inside a class declaration _without_ a superclass
    Class,

    /// Inside a class declaration _with_ a superclass
    Subclass,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances (locals vs. globals) by calling back into the interpreter.
pub struct Resolver<'i, W: Write> {
    interpreter: &'i mut Interpreter<W>,
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    current_function: FunctionType,
    current_class: ClassType,
    loop_depth: usize,
}

impl<'i, W: Write> Resolver<'i, W> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'i mut Interpreter<W>) -> Self {
        info!("Resolver instantiated");
        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            loop_depth: 0,
        }
    }

    /// Walk all top‑level statements.
    pub fn resolve(&mut self, statements: &[Stmt]) -> Result<()> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );
        for stmt in statements {
            self.resolve_stmt(stmt)?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                if let Some(Expr::Variable(_, super_name)) = superclass {
                    if super_name.lexeme == name.lexeme {
                        return Err(LoxError::resolve(
                            super_name.line,
                            "A class can't inherit from itself.",
                        ));
                    }
                }

                self.declare(name)?;
                self.define(name);

                let enclosing_class: ClassType = self.current_class;

                self.current_class = if superclass.is_some() {
                    ClassType::Subclass
                } else {
                    ClassType::Class
                };

                // A subclass's methods see `super` through one extra scope.
                if let Some(super_expr) = superclass {
                    self.resolve_expr(super_expr)?;

                    self.begin_scope();
                    self.scope_insert("super");
                }

                // The implicit `this` scope wraps every method body.
                self.begin_scope();
                self.scope_insert("this");

                for method in methods {
                    let kind = if method.name.lexeme == "init" {
                        FunctionType::Initializer
                    } else {
                        FunctionType::Function
                    };

                    self.resolve_function(kind, method)?;
                }

                self.end_scope();

                if superclass.is_some() {
                    self.end_scope();
                }

                self.current_class = enclosing_class;
            }

            Stmt::Block(statements) => {
                self.begin_scope();

                for s in statements {
                    self.resolve_stmt(s)?;
                }

                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                self.declare(name)?;

                if let Some(expr) = initializer {
                    self.resolve_expr(expr)?;
                }

                self.define(name);
            }

            Stmt::Function(declaration) => {
                // Defined eagerly so the function can recurse into itself.
                self.declare(&declaration.name)?;
                self.define(&declaration.name);

                self.resolve_function(FunctionType::Function, declaration)?;
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr)?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition)?;

                self.resolve_stmt(then_branch)?;

                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb)?;
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition)?;

                self.loop_depth += 1;
                let result = self.resolve_stmt(body);
                self.loop_depth -= 1;

                result?;
            }

            Stmt::Break { keyword } => {
                if self.loop_depth == 0 {
                    return Err(LoxError::resolve(
                        keyword.line,
                        "Can't use 'break' outside of a loop.",
                    ));
                }
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    return Err(LoxError::resolve(
                        keyword.line,
                        "Can't return from top-level code.",
                    ));
                }

                if let Some(expr) = value {
                    // An initializer's receiver is its only return value.
                    if self.current_function == FunctionType::Initializer {
                        return Err(LoxError::resolve(
                            keyword.line,
                            "Can't return a value from an initializer.",
                        ));
                    }

                    self.resolve_expr(expr)?;
                }
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => {
                self.resolve_expr(inner)?;
            }

            Expr::Unary(_, right) => {
                self.resolve_expr(right)?;
            }

            Expr::Binary(left, _, right) | Expr::Logical(left, _, right) => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)?;
            }

            Expr::Variable(id, name) => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        return Err(LoxError::resolve(
                            name.line,
                            "Can't read local variable in its own initializer.",
                        ));
                    }
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign(id, name, value) => {
                self.resolve_expr(value)?;
                self.resolve_local(*id, name);
            }

            Expr::Call(callee, _, arguments) => {
                self.resolve_expr(callee)?;

                for arg in arguments {
                    self.resolve_expr(arg)?;
                }
            }

            Expr::This(id, keyword) => {
                if self.current_class == ClassType::None {
                    return Err(LoxError::resolve(
                        keyword.line,
                        "Can't use 'this' outside of a class.",
                    ));
                }

                self.resolve_local(*id, keyword);
            }

            Expr::Get(object, _) => {
                self.resolve_expr(object)?;
            }

            Expr::Set(object, _, value) => {
                self.resolve_expr(object)?;
                self.resolve_expr(value)?;
            }

            Expr::Super(id, keyword, _) => {
                if self.current_class == ClassType::None {
                    return Err(LoxError::resolve(
                        keyword.line,
                        "Can't use 'super' outside of a class.",
                    ));
                }

                if self.current_class != ClassType::Subclass {
                    return Err(LoxError::resolve(
                        keyword.line,
                        "Can't use 'super' in a class with no superclass.",
                    ));
                }

                self.resolve_local(*id, keyword);
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function's parameters + body.
    ///
    /// `kind` indicates whether this is a normal function or an initializer.
    fn resolve_function(&mut self, kind: FunctionType, declaration: &FunctionDecl) -> Result<()> {
        let enclosing = self.current_function;
        self.current_function = kind;

        // A `break` inside the function body cannot target a loop outside it.
        let enclosing_loop_depth = self.loop_depth;
        self.loop_depth = 0;

        self.begin_scope();

        for param in &declaration.params {
            self.declare(param)?;
            self.define(param);
        }

        let mut result = Ok(());
        for stmt in &declaration.body {
            result = self.resolve_stmt(stmt);
            if result.is_err() {
                break;
            }
        }

        self.end_scope();

        self.loop_depth = enclosing_loop_depth;
        self.current_function = enclosing;

        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn scope_insert(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    fn declare(&mut self, name: &Token) -> Result<()> {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                return Err(LoxError::resolve(
                    name.line,
                    "Already a variable with this name in this scope.",
                ));
            }

            scope.insert(name.lexeme.clone(), false);
        }
        Ok(())
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this variable occurrence as a local at its lexical depth.
    /// Names found in no scope are globals and get no side-table entry.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.interpreter.resolve(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}
