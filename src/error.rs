//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) must convert their
//! internal failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow`, while still preserving rich diagnostic detail.
//!
//! The module **does not** print diagnostics itself

use std::io;
use thiserror::Error;

use log::info;

/// Lexical error as emitted by the scanner's token stream.
///
/// The scanner keeps going after reporting one of these, so the type must be
/// cheap to clone out of a peeked iterator item.  Hosts fold it into
/// [`LoxError::Lex`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error: {message}")]
pub struct ScanError {
    /// Human‑readable description.
    pub message: String,

    /// 1‑based line where the error occurred.
    pub line: usize,
}

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },

    /// Static‑analysis or resolution failure (e.g. early‑binding errors).
    #[error("[line {line}] Error: {message}")]
    Resolve { message: String, line: usize },

    /// Runtime evaluation error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        LoxError::Parse { message, line }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", line, message);

        LoxError::Resolve { message, line }
    }
}

impl From<ScanError> for LoxError {
    fn from(err: ScanError) -> Self {
        LoxError::Lex {
            message: err.message,
            line: err.line,
        }
    }
}

/// Evaluation failure, carrying the source line of the offending token.
///
/// `Return` and `break` are *not* errors; they travel through the
/// interpreter's own control-flow channel.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    /// An operand or operator type rule was violated.
    #[error("[line {line}] Error: {message}")]
    TypeMismatch { message: String, line: usize },

    #[error("[line {line}] Error: Cannot divide by 0.")]
    DivisionByZero { line: usize },

    #[error("[line {line}] Error: Undefined variable '{name}'.")]
    UndefinedVariable { name: String, line: usize },

    #[error("[line {line}] Error: Undefined property '{name}'.")]
    UndefinedProperty { name: String, line: usize },

    #[error("[line {line}] Error: Can only call functions and classes.")]
    NotCallable { line: usize },

    #[error("[line {line}] Error: Expected {expected} arguments but got {got}.")]
    ArityMismatch {
        expected: usize,
        got: usize,
        line: usize,
    },

    #[error("[line {line}] Error: Superclass must be a class.")]
    SuperclassNotClass { line: usize },

    /// Property access or field write on something that is not an instance.
    #[error("[line {line}] Error: {message}")]
    FieldAccessOnNonInstance { message: String, line: usize },

    /// Wrapper around `std::io::Error` for output-sink failures.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
