//! Recursive-descent parser, streaming tokens straight off the [`Scanner`].
//!
//! Grammar (declarations first):
//!
//! ```text
//! program     → declaration* EOF
//! declaration → classDecl | funDecl | varDecl | statement
//! statement   → exprStmt | forStmt | ifStmt | printStmt | returnStmt
//!             | whileStmt | breakStmt | block
//! expression  → assignment ; precedence climbs through or, and, equality,
//!               comparison, term, factor, unary, call, primary
//! ```
//!
//! `for` loops are desugared into `Block`/`While` here, so the runtime never
//! sees a dedicated loop-with-clauses node.  Every `Variable`, `Assign`,
//! `This`, and `Super` expression receives a fresh [`ExprId`] at
//! construction; the resolver keys binding distances by those ids.

use std::iter::Peekable;
use std::rc::Rc;

use log::debug;

use crate::error::{LoxError, Result};
use crate::expr::{Expr, ExprId};
use crate::scanner::Scanner;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::{Token, TokenType};

pub struct Parser {
    tokens: Peekable<Scanner>,
    previous: Option<Token>,
    next_id: usize,
}

impl Parser {
    pub fn new(scanner: Scanner) -> Self {
        Self::with_id_offset(scanner, 0)
    }

    /// Start expression ids at `offset`.  A REPL session reuses one
    /// interpreter across many parses; distinct offsets keep the side-table
    /// keys from colliding between lines.
    pub fn with_id_offset(scanner: Scanner, offset: usize) -> Self {
        Parser {
            tokens: scanner.peekable(),
            previous: None,
            next_id: offset,
        }
    }

    /// The first id the *next* parser in this session should use.
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    fn fresh_id(&mut self) -> ExprId {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn parse(&mut self) -> Result<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end()? {
            statements.push(self.declaration()?);
        }

        debug!("Parsed {} top-level statement(s)", statements.len());

        Ok(statements)
    }

    /// Entry point for the `parse` subcommand: a single expression.
    pub fn parse_expression(&mut self) -> Result<Expr> {
        self.expression()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Declarations
    // ─────────────────────────────────────────────────────────────────────

    fn declaration(&mut self) -> Result<Stmt> {
        if self.match_tokens(&[TokenType::CLASS])? {
            return self.class_declaration();
        }

        if self.match_tokens(&[TokenType::FUN])? {
            return Ok(Stmt::Function(self.function("function")?));
        }

        if self.match_tokens(&[TokenType::VAR])? {
            return self.var_declaration();
        }

        self.statement()
    }

    fn class_declaration(&mut self) -> Result<Stmt> {
        let name = self.consume(TokenType::IDENTIFIER, "Expect class name.")?;

        let superclass = if self.match_tokens(&[TokenType::LESS])? {
            let super_name = self.consume(TokenType::IDENTIFIER, "Expect superclass name.")?;
            Some(Expr::Variable(self.fresh_id(), super_name))
        } else {
            None
        };

        self.consume(TokenType::LEFT_BRACE, "Expect '{' before class body.")?;

        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();

        while !self.check(&TokenType::RIGHT_BRACE)? && !self.is_at_end()? {
            methods.push(self.function("method")?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after class body.")?;

        Ok(Stmt::Class {
            name,
            superclass,
            methods,
        })
    }

    fn function(&mut self, kind: &str) -> Result<Rc<FunctionDecl>> {
        let name = self.consume(TokenType::IDENTIFIER, &format!("Expect {} name.", kind))?;

        self.consume(
            TokenType::LEFT_PAREN,
            &format!("Expect '(' after {} name.", kind),
        )?;

        let mut params: Vec<Token> = Vec::new();

        if !self.check(&TokenType::RIGHT_PAREN)? {
            loop {
                params.push(self.consume(TokenType::IDENTIFIER, "Expect parameter name.")?);

                if !self.match_tokens(&[TokenType::COMMA])? {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after parameters.")?;

        self.consume(
            TokenType::LEFT_BRACE,
            &format!("Expect '{{' before {} body.", kind),
        )?;

        let body = self.block()?;

        Ok(Rc::new(FunctionDecl { name, params, body }))
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name = self.consume(TokenType::IDENTIFIER, "Expect variable name.")?;

        let initializer = if self.match_tokens(&[TokenType::EQUAL])? {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expect ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────

    fn statement(&mut self) -> Result<Stmt> {
        if self.match_tokens(&[TokenType::FOR])? {
            return self.for_statement();
        }

        if self.match_tokens(&[TokenType::IF])? {
            return self.if_statement();
        }

        if self.match_tokens(&[TokenType::PRINT])? {
            let expr = self.expression()?;
            self.consume(TokenType::SEMICOLON, "Expect ';' after value.")?;
            return Ok(Stmt::Print(expr));
        }

        if self.match_tokens(&[TokenType::RETURN])? {
            return self.return_statement();
        }

        if self.match_tokens(&[TokenType::WHILE])? {
            return self.while_statement();
        }

        if self.match_tokens(&[TokenType::BREAK])? {
            let keyword = self.previous().clone();
            self.consume(TokenType::SEMICOLON, "Expect ';' after 'break'.")?;
            return Ok(Stmt::Break { keyword });
        }

        if self.match_tokens(&[TokenType::LEFT_BRACE])? {
            return Ok(Stmt::Block(self.block()?));
        }

        let expr = self.expression()?;
        self.consume(TokenType::SEMICOLON, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    // Desugars into the closed statement set:
    //     { initializer; while (condition) { body; increment; } }
    fn for_statement(&mut self) -> Result<Stmt> {
        let for_line = self.previous().line;

        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'for'.")?;

        let initializer: Option<Stmt> = if self.match_tokens(&[TokenType::SEMICOLON])? {
            None
        } else if self.match_tokens(&[TokenType::VAR])? {
            Some(self.var_declaration()?)
        } else {
            let expr = self.expression()?;
            self.consume(TokenType::SEMICOLON, "Expect ';' after loop initializer.")?;
            Some(Stmt::Expression(expr))
        };

        let condition: Option<Expr> = if !self.check(&TokenType::SEMICOLON)? {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::SEMICOLON, "Expect ';' after loop condition.")?;

        let increment: Option<Expr> = if !self.check(&TokenType::RIGHT_PAREN)? {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition = condition.unwrap_or_else(|| {
            Expr::Literal(Token::new(TokenType::TRUE, "true".to_string(), for_line))
        });

        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);

        let else_branch = if self.match_tokens(&[TokenType::ELSE])? {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let keyword = self.previous().clone();

        let value = if !self.check(&TokenType::SEMICOLON)? {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expect ';' after return value.")?;

        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after condition.")?;

        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(&TokenType::RIGHT_BRACE)? && !self.is_at_end()? {
            statements.push(self.declaration()?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after block.")?;

        Ok(statements)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────

    fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr = self.or()?;

        if self.match_tokens(&[TokenType::EQUAL])? {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(_, name) => {
                    Ok(Expr::Assign(self.fresh_id(), name, Box::new(value)))
                }

                Expr::Get(object, name) => Ok(Expr::Set(object, name, Box::new(value))),

                _ => Err(LoxError::parse(equals.line, "Invalid assignment target.")),
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr> {
        let mut expr = self.and()?;

        while self.match_tokens(&[TokenType::OR])? {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(Box::new(expr), operator, Box::new(right));
        }

        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut expr = self.equality()?;

        while self.match_tokens(&[TokenType::AND])? {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(Box::new(expr), operator, Box::new(right));
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr = self.comparison()?;

        while self.match_tokens(&[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL])? {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.term()?;

        while self.match_tokens(&[
            TokenType::GREATER,
            TokenType::GREATER_EQUAL,
            TokenType::LESS,
            TokenType::LESS_EQUAL,
        ])? {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr = self.factor()?;

        while self.match_tokens(&[TokenType::MINUS, TokenType::PLUS])? {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;

        while self.match_tokens(&[TokenType::SLASH, TokenType::STAR])? {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.match_tokens(&[TokenType::BANG, TokenType::MINUS])? {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary(operator, Box::new(right)));
        }

        self.call()
    }

    fn call(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.match_tokens(&[TokenType::LEFT_PAREN])? {
                expr = self.finish_call(expr)?;
            } else if self.match_tokens(&[TokenType::DOT])? {
                let name =
                    self.consume(TokenType::IDENTIFIER, "Expect property name after '.'.")?;
                expr = Expr::Get(Box::new(expr), name);
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();

        if !self.check(&TokenType::RIGHT_PAREN)? {
            loop {
                arguments.push(self.expression()?);

                if !self.match_tokens(&[TokenType::COMMA])? {
                    break;
                }
            }
        }

        let paren = self.consume(TokenType::RIGHT_PAREN, "Expect ')' after arguments.")?;

        Ok(Expr::Call(Box::new(callee), paren, arguments))
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.match_tokens(&[
            TokenType::NUMBER(0.0),
            TokenType::STRING(String::new()),
            TokenType::TRUE,
            TokenType::FALSE,
            TokenType::NIL,
        ])? {
            return Ok(Expr::Literal(self.previous().clone()));
        }

        if self.match_tokens(&[TokenType::THIS])? {
            return Ok(Expr::This(self.fresh_id(), self.previous().clone()));
        }

        if self.match_tokens(&[TokenType::SUPER])? {
            let keyword = self.previous().clone();
            self.consume(TokenType::DOT, "Expect '.' after 'super'.")?;
            let method = self.consume(TokenType::IDENTIFIER, "Expect superclass method name.")?;
            return Ok(Expr::Super(self.fresh_id(), keyword, method));
        }

        if self.match_tokens(&[TokenType::IDENTIFIER])? {
            return Ok(Expr::Variable(self.fresh_id(), self.previous().clone()));
        }

        if self.match_tokens(&[TokenType::LEFT_PAREN])? {
            let expr = self.expression()?;
            self.consume(TokenType::RIGHT_PAREN, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }

        Err(LoxError::parse(self.peek()?.line, "Expect expression."))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Token-stream plumbing
    // ─────────────────────────────────────────────────────────────────────

    fn match_tokens(&mut self, types: &[TokenType]) -> Result<bool> {
        for token_type in types {
            if self.check(token_type)? {
                self.advance()?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn check(&mut self, token_type: &TokenType) -> Result<bool> {
        if self.is_at_end()? {
            return Ok(false);
        }
        Ok(&self.peek()?.token_type == token_type)
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<Token> {
        if self.check(&token_type)? {
            self.advance()?;
            return Ok(self.previous().clone());
        }

        Err(LoxError::parse(self.peek()?.line, message))
    }

    fn advance(&mut self) -> Result<&Token> {
        self.previous = match self.tokens.next() {
            Some(result) => Some(result?),
            None => None,
        };

        self.previous
            .as_ref()
            .ok_or_else(|| LoxError::parse(0, "Unexpected end of input."))
    }

    fn is_at_end(&mut self) -> Result<bool> {
        Ok(self.peek()?.token_type == TokenType::EOF)
    }

    fn peek(&mut self) -> Result<&Token> {
        let last_line = self.previous.as_ref().map_or(1, |token| token.line);

        match self.tokens.peek() {
            Some(Ok(token)) => Ok(token),
            Some(Err(e)) => Err(e.clone().into()),
            None => Err(LoxError::parse(last_line, "Unexpected end of input.")),
        }
    }

    fn previous(&self) -> &Token {
        self.previous.as_ref().expect("No previous token")
    }
}
