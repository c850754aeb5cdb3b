// File: src/errors.rs
//
// Error handling and reporting for the CopyClean interpreter.
// Errors are values: every fallible stage returns `Result<T, Box<Error>>`
// and the CLI turns the final error into an exit code.

use std::fmt;

use colored::Colorize;

use crate::ast::Span;

/// Categories of errors the pipeline can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Lexer and parser failures.
    Syntax,
    /// A value does not satisfy an operator's or binding's type contract.
    Type,
    /// Wrong number of arguments to a function or method.
    Arity,
    DivideByZero,
    /// Everything else detected at evaluation time.
    Runtime,
    /// Graceful-termination sentinel raised by `exit()`; the CLI maps it to
    /// exit code 0.
    Exit,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "Syntax"),
            ErrorKind::Type => write!(f, "Type"),
            ErrorKind::Arity => write!(f, "Arity"),
            ErrorKind::DivideByZero => write!(f, "DivideByZero"),
            ErrorKind::Runtime => write!(f, "Runtime"),
            ErrorKind::Exit => write!(f, "Exit"),
        }
    }
}

/// A structured error with optional source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Option<Span>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Box<Self> {
        Box::new(Error { kind, message: message.into(), span: None })
    }

    pub fn with_span(kind: ErrorKind, message: impl Into<String>, span: Span) -> Box<Self> {
        Box::new(Error { kind, message: message.into(), span: Some(span) })
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Box<Self> {
        Self::with_span(ErrorKind::Syntax, message, span)
    }

    pub fn type_error(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::Type, message)
    }

    pub fn arity(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::Arity, message)
    }

    pub fn runtime(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::Runtime, message)
    }

    /// Attach a span if the error does not already carry one. Evaluation
    /// helpers raise spanless errors; the evaluator pins them to the
    /// offending expression on the way out.
    pub fn at(mut self: Box<Self>, span: Span) -> Box<Self> {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heading = format!("{} Error", self.kind);
        write!(f, "{}", heading.red().bold())?;
        if let Some(span) = &self.span {
            write!(f, " at line {}, col {}", span.start.line, span.start.column)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Error {}
